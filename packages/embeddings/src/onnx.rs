use std::path::PathBuf;

use hf_hub::api::sync::Api;
use ndarray::{Array2, CowArray};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value as OrtValue;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer};

use crate::{EmbeddingError, EmbeddingProvider, Result};

/// Sentence embeddings via an ONNX BERT-family model, downloaded (and
/// cached) from the Hugging Face Hub through `hf-hub`, tokenized with
/// `tokenizers`, and run through `ort`. Mean-pools the last hidden state
/// over non-padding tokens and L2-normalizes, the standard recipe for
/// sentence-transformers-style models.
pub struct OnnxEmbeddingProvider {
    session: Session,
    tokenizer: Tokenizer,
    model_name: String,
    dimension: usize,
}

impl OnnxEmbeddingProvider {
    /// Fetch `model_id` (e.g. `"sentence-transformers/all-MiniLM-L6-v2"`)
    /// from the Hugging Face Hub, expecting an `onnx/model.onnx` and a
    /// `tokenizer.json` in the repo, and build a ready-to-use provider.
    pub fn from_hub(model_id: &str, dimension: usize) -> Result<Self> {
        let api = Api::new().map_err(|e| EmbeddingError::Failed(e.to_string()))?;
        let repo = api.model(model_id.to_string());

        let model_path = repo
            .get("onnx/model.onnx")
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;

        Self::from_files(model_path, tokenizer_path, model_id, dimension)
    }

    /// Build directly from local model/tokenizer files, bypassing the Hub
    /// (used in deployments that ship the model alongside the binary).
    pub fn from_files(
        model_path: PathBuf,
        tokenizer_path: PathBuf,
        model_name: &str,
        dimension: usize,
    ) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        Ok(Self {
            session,
            tokenizer,
            model_name: model_name.to_string(),
            dimension,
        })
    }

    fn forward(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let encodings = self
            .tokenizer
            .encode_batch(refs, true)
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;

        let batch = encodings.len();
        let seq_len = encodings.first().map(|e| e.len()).unwrap_or(0);

        let mut input_ids = Array2::<i64>::zeros((batch, seq_len));
        let mut attention_mask = Array2::<i64>::zeros((batch, seq_len));
        let mut token_type_ids = Array2::<i64>::zeros((batch, seq_len));

        for (row, encoding) in encodings.iter().enumerate() {
            for (col, (&id, &mask)) in encoding
                .get_ids()
                .iter()
                .zip(encoding.get_attention_mask().iter())
                .enumerate()
            {
                input_ids[[row, col]] = id as i64;
                attention_mask[[row, col]] = mask as i64;
            }
        }

        let input_ids_dyn = CowArray::from(input_ids.into_dyn());
        let attention_mask_dyn = CowArray::from(attention_mask.into_dyn());
        let token_type_ids_dyn = CowArray::from(token_type_ids.into_dyn());

        let outputs = self
            .session
            .run(ort::inputs![
                "input_ids" => OrtValue::from_array(input_ids_dyn)
                    .map_err(|e| EmbeddingError::Failed(e.to_string()))?,
                "attention_mask" => OrtValue::from_array(attention_mask_dyn)
                    .map_err(|e| EmbeddingError::Failed(e.to_string()))?,
                "token_type_ids" => OrtValue::from_array(token_type_ids_dyn)
                    .map_err(|e| EmbeddingError::Failed(e.to_string()))?,
            ]
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?)
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;

        let last_hidden_state = outputs["last_hidden_state"]
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;

        let mut result = Vec::with_capacity(batch);
        for row in 0..batch {
            let mut sums = vec![0.0f64; self.dimension];
            let mut valid_tokens = 0f64;
            for col in 0..seq_len {
                if attention_mask[[row, col]] == 0 {
                    continue;
                }
                valid_tokens += 1.0;
                for d in 0..self.dimension {
                    sums[d] += last_hidden_state[[row, col, d]] as f64;
                }
            }
            if valid_tokens > 0.0 {
                for v in &mut sums {
                    *v /= valid_tokens;
                }
            }
            let norm: f64 = sums.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for v in &mut sums {
                    *v /= norm;
                }
            }
            result.push(sums);
        }

        Ok(result)
    }
}

impl EmbeddingProvider for OnnxEmbeddingProvider {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.forward(texts)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
