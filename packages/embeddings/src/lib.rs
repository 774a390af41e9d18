//! `EmbeddingProvider`: the `encode(list<string>) -> list<vector<float>>`
//! external collaborator spec.md §2 leaves as a contract. Two
//! implementations are provided: [`OnnxEmbeddingProvider`], grounded on the
//! teacher's `embeddings` package (`ort` + `hf-hub` + `tokenizers`), and
//! [`DeterministicEmbeddingProvider`], a model-free stand-in for tests and
//! offline development that still satisfies the contract (same text always
//! yields the same vector, different text usually yields a different one).

mod deterministic;
mod onnx;

pub use deterministic::DeterministicEmbeddingProvider;
pub use onnx::OnnxEmbeddingProvider;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding provider failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// A text-to-vector encoder. Implementations must be deterministic for a
/// given model/config (same text -> same vector) and return vectors of a
/// fixed [`EmbeddingProvider::dimension`] for every call.
pub trait EmbeddingProvider {
    /// Encode a batch of texts into fixed-length vectors, one per input, in
    /// input order.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;

    /// The length every vector this provider returns has.
    fn dimension(&self) -> usize;

    /// Name recorded as `index["vec_model"]` by the document layer.
    fn model_name(&self) -> &str;
}
