//! Course content collection: the large chunk index behind filtered search.

use std::sync::Arc;

use tracing::debug;

use crate::course::{ChunkMetadata, CourseChunk, SearchResults};
use crate::embedding::{EmbeddingProvider, embed_batch_checked, embed_checked};
use crate::error::{RagError, Result};
use crate::vectorstore::{ChunkFilter, Payload, VectorRecord, VectorStore};

const COLLECTION: &str = "course_content";

/// The course content collection.
///
/// Stores every indexed [`CourseChunk`] with its metadata and serves
/// filter-before-rank similarity search over them.
pub struct CourseContent {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

/// Deterministic record id for a chunk. Re-ingesting the same course yields
/// the same ids, so a retried write overwrites instead of duplicating.
fn record_id(course_title: &str, chunk_index: usize) -> String {
    format!("{}_{chunk_index}", course_title.replace(' ', "_"))
}

impl CourseContent {
    /// Create a content collection over the given store and embedder.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Create the backing collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<()> {
        self.store.create_collection(COLLECTION, self.embedder.dimensions()).await
    }

    /// Index a batch of chunks.
    ///
    /// The whole batch is embedded before anything is written, so an
    /// embedding failure leaves the collection untouched. An empty slice is
    /// a no-op.
    pub async fn insert_chunks(&self, chunks: &[CourseChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embed_batch_checked(self.embedder.as_ref(), &texts).await?;

        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord {
                id: record_id(&chunk.course_title, chunk.chunk_index),
                text: chunk.content.clone(),
                embedding,
                payload: Payload::Chunk(ChunkMetadata {
                    course_title: chunk.course_title.clone(),
                    lesson_number: chunk.lesson_number,
                    chunk_index: chunk.chunk_index,
                }),
            })
            .collect();

        self.store.upsert(COLLECTION, &records).await?;
        debug!(chunk_count = records.len(), "indexed content chunks");
        Ok(())
    }

    /// Remove every chunk belonging to the given course title.
    ///
    /// Returns the number of chunks removed.
    pub async fn delete_by_course(&self, title: &str) -> Result<usize> {
        let removed = self.store.delete_where(COLLECTION, &ChunkFilter::for_course(title)).await?;
        debug!(course = title, removed, "removed course content");
        Ok(removed)
    }

    /// Search the content index for the chunks nearest to `query`.
    ///
    /// The filter, when present, restricts the candidate set before ranking.
    /// Results come back index-aligned and ordered by ascending distance;
    /// finding nothing is success, not an error.
    pub async fn filtered_search(
        &self,
        query: &str,
        filter: Option<&ChunkFilter>,
        top_k: usize,
    ) -> Result<SearchResults> {
        let embedding = embed_checked(self.embedder.as_ref(), query).await?;
        let hits = self.store.search(COLLECTION, &embedding, filter, top_k).await?;

        let mut results = SearchResults::default();
        for hit in hits {
            let metadata = hit.record.payload.as_chunk().cloned().ok_or_else(|| {
                RagError::VectorStoreError {
                    backend: COLLECTION.to_string(),
                    message: format!("record '{}' carries a non-chunk payload", hit.record.id),
                }
            })?;
            results.documents.push(hit.record.text);
            results.metadata.push(metadata);
            results.distances.push(hit.distance);
        }
        Ok(results)
    }

    /// Number of indexed chunks.
    pub async fn count(&self) -> Result<usize> {
        Ok(self.store.list_ids(COLLECTION).await?.len())
    }

    /// Drop and recreate the content collection.
    pub async fn clear(&self) -> Result<()> {
        self.store.delete_collection(COLLECTION).await?;
        self.ensure_collection().await
    }
}
