//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends (an OpenAI-compatible
/// server, a local model, a test mock) behind a unified async interface.
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends that
/// support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rag::EmbeddingProvider;
///
/// let provider = MyEmbedder::new();
/// let embedding = provider.embed("decorators and closures").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Short identifier for this provider, used in logs and error reports.
    fn name(&self) -> &str;
}

/// Embed one text and verify the vector has the provider's declared
/// dimensionality. A mismatch is an [`RagError::EmbeddingError`], surfaced
/// before the vector reaches storage.
pub(crate) async fn embed_checked(
    provider: &dyn EmbeddingProvider,
    text: &str,
) -> Result<Vec<f32>> {
    let embedding = provider.embed(text).await?;
    check_dimensions(provider, embedding.len())?;
    Ok(embedding)
}

/// Batch counterpart of [`embed_checked`]. Also rejects a response whose
/// vector count differs from the input count.
pub(crate) async fn embed_batch_checked(
    provider: &dyn EmbeddingProvider,
    texts: &[&str],
) -> Result<Vec<Vec<f32>>> {
    let embeddings = provider.embed_batch(texts).await?;
    if embeddings.len() != texts.len() {
        return Err(RagError::EmbeddingError {
            provider: provider.name().to_string(),
            message: format!(
                "expected {} embeddings for the batch, got {}",
                texts.len(),
                embeddings.len()
            ),
        });
    }
    for embedding in &embeddings {
        check_dimensions(provider, embedding.len())?;
    }
    Ok(embeddings)
}

fn check_dimensions(provider: &dyn EmbeddingProvider, got: usize) -> Result<()> {
    let expected = provider.dimensions();
    if got != expected {
        return Err(RagError::EmbeddingError {
            provider: provider.name().to_string(),
            message: format!("expected {expected}-dimensional embedding, got {got}"),
        });
    }
    Ok(())
}
