//! Vector store trait for storing and searching embedded course records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::course::{ChunkMetadata, Course};
use crate::error::Result;

/// A record stored in a vector collection: the embedded text plus a typed
/// payload describing what the text is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    /// Unique identifier within the collection. Deterministic ids make
    /// upserts overwrite on retry instead of duplicating.
    pub id: String,
    /// The text that was embedded.
    pub text: String,
    /// The vector embedding for `text`.
    pub embedding: Vec<f32>,
    /// Typed payload for the record.
    pub payload: Payload,
}

/// The payload carried by a [`VectorRecord`].
///
/// Collections are homogeneous: the course catalog stores [`Course`] payloads
/// keyed by title, the content collection stores [`ChunkMetadata`] payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Payload {
    /// A catalog entry holding the full course record.
    Course(Course),
    /// A content entry holding the chunk's stored metadata.
    Chunk(ChunkMetadata),
}

impl Payload {
    /// The course record, if this is a catalog payload.
    pub fn as_course(&self) -> Option<&Course> {
        match self {
            Payload::Course(course) => Some(course),
            Payload::Chunk(_) => None,
        }
    }

    /// The chunk metadata, if this is a content payload.
    pub fn as_chunk(&self) -> Option<&ChunkMetadata> {
        match self {
            Payload::Chunk(metadata) => Some(metadata),
            Payload::Course(_) => None,
        }
    }
}

/// A retrieved [`VectorRecord`] paired with its vector distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// The retrieved record.
    pub record: VectorRecord,
    /// Distance to the query embedding (lower is closer).
    pub distance: f32,
}

/// An equality filter over chunk records: a conjunction of up to two clauses.
///
/// Filters restrict the candidate set before ranking, so a search with a
/// filter ranks only matching records rather than discarding non-matches
/// from an already-ranked list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkFilter {
    /// Keep only chunks belonging to this exact course title.
    pub course_title: Option<String>,
    /// Keep only chunks attributed to this exact lesson number.
    pub lesson_number: Option<u32>,
}

impl ChunkFilter {
    /// Build a filter from optional clauses, normalizing the empty case.
    ///
    /// Returns `None` when both clauses are absent, so callers can pass the
    /// result straight to [`VectorStore::search`] and an unfiltered search
    /// stays representable as "no filter" rather than "filter that matches
    /// everything".
    pub fn build(course_title: Option<String>, lesson_number: Option<u32>) -> Option<Self> {
        if course_title.is_none() && lesson_number.is_none() {
            return None;
        }
        Some(Self { course_title, lesson_number })
    }

    /// A filter keeping only the given course's chunks.
    pub fn for_course(title: impl Into<String>) -> Self {
        Self { course_title: Some(title.into()), lesson_number: None }
    }

    /// Returns `true` if the given chunk metadata satisfies every clause.
    ///
    /// A lesson clause never matches a chunk without a lesson number.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        if let Some(title) = &self.course_title {
            if metadata.course_title != *title {
                return false;
            }
        }
        if let Some(number) = self.lesson_number {
            if metadata.lesson_number != Some(number) {
                return false;
            }
        }
        true
    }

    /// Returns `true` if the record satisfies this filter. Only chunk
    /// payloads can match; catalog records are never selected by a filter.
    pub fn matches_record(&self, record: &VectorRecord) -> bool {
        match record.payload.as_chunk() {
            Some(metadata) => self.matches(metadata),
            None => false,
        }
    }
}

/// A storage backend for embedded course records with similarity search.
///
/// Implementations manage named collections of [`VectorRecord`]s and support
/// upserting, deleting, and filtered search by vector distance.
///
/// # Example
///
/// ```rust,ignore
/// use lectern_rag::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("course_content", 384).await?;
/// store.upsert("course_content", &records).await?;
/// let hits = store.search("course_content", &query, Some(&filter), 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a named collection. No-op if it already exists.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Delete a named collection and all its data.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Upsert records into a collection. Records must have embeddings set.
    /// An existing record with the same id is replaced.
    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()>;

    /// Fetch a single record by id.
    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<VectorRecord>>;

    /// List the ids of every record in a collection, in no particular order.
    async fn list_ids(&self, collection: &str) -> Result<Vec<String>>;

    /// Delete every chunk record matching the filter. Returns the number of
    /// records removed.
    async fn delete_where(&self, collection: &str, filter: &ChunkFilter) -> Result<usize>;

    /// Search for the `top_k` records nearest to the given embedding.
    ///
    /// When a filter is present it is applied before ranking: only matching
    /// records compete for the `top_k` slots. Results are ordered by
    /// ascending distance.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        filter: Option<&ChunkFilter>,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>>;
}
