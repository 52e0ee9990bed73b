//! In-memory vector store using cosine distance.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector
//! store backed by a `HashMap` protected by a `tokio::sync::RwLock`. Reads
//! run concurrently while writes are serialized. It is suitable for
//! development, testing, and small-scale use cases.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RagError, Result};
use crate::vectorstore::{ChunkFilter, ScoredRecord, VectorRecord, VectorStore};

/// An in-memory vector store using cosine distance for search.
///
/// Collections are stored as nested `HashMap`s: collection name → record id
/// → record. All operations are async-safe via `tokio::sync::RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("course_content", 384).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, HashMap<String, VectorRecord>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_collection(collection: &str) -> RagError {
    RagError::VectorStoreError {
        backend: "InMemory".to_string(),
        message: format!("collection '{collection}' does not exist"),
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cosine distance: `1 - cosine similarity`. Identical vectors are at
/// distance 0, opposite vectors at distance 2.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, _dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<VectorRecord>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;
        Ok(store.get(id).cloned())
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;
        Ok(store.keys().cloned().collect())
    }

    async fn delete_where(&self, collection: &str, filter: &ChunkFilter) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| missing_collection(collection))?;
        let before = store.len();
        store.retain(|_, record| !filter.matches_record(record));
        Ok(before - store.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        filter: Option<&ChunkFilter>,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| missing_collection(collection))?;

        // The filter restricts the candidate set before ranking: only
        // matching records compete for the top_k slots.
        let mut scored: Vec<ScoredRecord> = store
            .values()
            .filter(|record| filter.is_none_or(|f| f.matches_record(record)))
            .map(|record| ScoredRecord {
                record: record.clone(),
                distance: cosine_distance(&record.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}
