use sha2::{Digest, Sha256};

use crate::{EmbeddingProvider, Result};

/// A model-free `EmbeddingProvider`: each text is hashed with SHA-256 and
/// the digest bytes are expanded (by re-hashing with an incrementing
/// counter) into `dimension` floats in `[-1.0, 1.0]`, then L2-normalized.
///
/// This is not a semantic embedding — unrelated texts do not reliably score
/// low similarity — but it is deterministic, fast, and needs no model file
/// or network access, which is what the document layer's tests and any
/// offline deployment actually need from the trait.
pub struct DeterministicEmbeddingProvider {
    dimension: usize,
}

impl DeterministicEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for DeterministicEmbeddingProvider {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingProvider for DeterministicEmbeddingProvider {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        Ok(texts.iter().map(|t| hash_embed(t, self.dimension)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "deterministic-sha256"
    }
}

fn hash_embed(text: &str, dimension: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(dimension);
    let mut counter: u32 = 0;
    while values.len() < dimension {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();
        for chunk in digest.chunks_exact(4) {
            if values.len() == dimension {
                break;
            }
            let bits = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            // Map to [-1.0, 1.0] so downstream cosine/dot behave sensibly.
            values.push((bits as f64 / u32::MAX as f64) * 2.0 - 1.0);
        }
        counter += 1;
    }
    let norm: f64 = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in &mut values {
            *v /= norm;
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_yields_same_vector() {
        let provider = DeterministicEmbeddingProvider::new(16);
        let a = provider.encode(&["hello world".to_string()]).unwrap();
        let b = provider.encode(&["hello world".to_string()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_text_yields_different_vector() {
        let provider = DeterministicEmbeddingProvider::new(16);
        let out = provider
            .encode(&["alpha".to_string(), "beta".to_string()])
            .unwrap();
        assert_ne!(out[0], out[1]);
    }

    #[test]
    fn vectors_have_configured_dimension_and_unit_norm() {
        let provider = DeterministicEmbeddingProvider::new(32);
        let out = provider.encode(&["x".to_string()]).unwrap();
        assert_eq!(out[0].len(), 32);
        let norm: f64 = out[0].iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_returns_empty() {
        let provider = DeterministicEmbeddingProvider::default();
        assert!(provider.encode(&[]).unwrap().is_empty());
    }
}
