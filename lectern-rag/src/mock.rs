//! Deterministic mock embedding provider for tests and demos.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// A deterministic embedding provider that needs no API keys.
///
/// Unknown text hashes to a stable, L2-normalized vector, so equal inputs
/// always embed equally. Specific texts can be pinned to exact vectors with
/// [`with_fixture`](MockEmbedder::with_fixture), which lets tests construct
/// precise distance orderings. An optional artificial latency supports
/// deadline tests.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rag::MockEmbedder;
///
/// let embedder = MockEmbedder::new(64)
///     .with_fixture("decorators", vec![1.0; 64]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEmbedder {
    dimensions: usize,
    fixtures: HashMap<String, Vec<f32>>,
    latency: Option<Duration>,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, fixtures: HashMap::new(), latency: None }
    }

    /// Pin an exact embedding for a specific input text.
    ///
    /// # Panics
    ///
    /// Panics if `embedding.len()` differs from the embedder's
    /// dimensionality. Fixtures exist to make tests exact; a silently
    /// truncated vector would defeat that.
    pub fn with_fixture(mut self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        assert_eq!(
            embedding.len(),
            self.dimensions,
            "fixture embedding must have {} dimensions",
            self.dimensions
        );
        self.fixtures.insert(text.into(), embedding);
        self
    }

    /// Add an artificial delay before every embedding call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Deterministic embedding: hash the text bytes, then generate a
    /// normalized vector whose direction depends on the content.
    fn hash_embedding(&self, text: &str) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimensions];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        // L2-normalize so cosine similarity is just the dot product.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(pinned) = self.fixtures.get(text) {
            return Ok(pinned.clone());
        }
        Ok(self.hash_embedding(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "mock"
    }
}
