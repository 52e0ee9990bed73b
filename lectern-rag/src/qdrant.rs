//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//! Chunk filters are pushed down as Qdrant payload filters, so filtering
//! happens engine-side before ranking.
//!
//! # Example
//!
//! ```rust,ignore
//! use lectern_rag::qdrant::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::new("http://localhost:6334")?;
//! store.create_collection("course_content", 384).await?;
//! store.upsert("course_content", &records).await?;
//! let hits = store.search("course_content", &query, Some(&filter), 5).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter,
    GetPointsBuilder, PointId, PointStruct, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::course::{ChunkMetadata, Course};
use crate::error::{RagError, Result};
use crate::vectorstore::{ChunkFilter, Payload, ScoredRecord, VectorRecord, VectorStore};

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
///
/// Qdrant point ids must be UUIDs or integers, so each record's natural id
/// is mapped to a deterministic v5 UUID and kept in the payload alongside
/// the text and typed fields. Collections use cosine distance; the
/// similarity score Qdrant reports is converted back to a distance so
/// results rank the same way as the in-memory backend.
pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store connecting to the given URL.
    pub fn new(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Ok(Self { client })
    }

    /// Create a new Qdrant vector store with default URL (`http://localhost:6334`).
    pub fn default_url() -> Result<Self> {
        Self::new("http://localhost:6334")
    }

    /// Create a new Qdrant vector store from an existing client.
    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStoreError { backend: "qdrant".to_string(), message: e.to_string() }
    }

    /// Deterministic point id: the same natural id always maps to the same
    /// UUID, so a retried upsert overwrites its earlier write.
    fn point_id(natural_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, natural_id.as_bytes()).to_string()
    }

    /// Extract a string from a Qdrant payload value.
    fn extract_string(value: &QdrantValue) -> Option<String> {
        match &value.kind {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Extract an integer from a Qdrant payload value.
    fn extract_integer(value: &QdrantValue) -> Option<i64> {
        match &value.kind {
            Some(Kind::IntegerValue(n)) => Some(*n),
            _ => None,
        }
    }

    /// Flatten a record into a Qdrant payload. Filterable chunk fields
    /// (`kind`, `course_title`, `lesson_number`) sit at the top level so
    /// payload filters can target them.
    fn to_payload(record: &VectorRecord) -> qdrant_client::Payload {
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), serde_json::Value::String(record.id.clone()));
        map.insert("text".to_string(), serde_json::Value::String(record.text.clone()));

        match &record.payload {
            Payload::Course(course) => {
                map.insert("kind".to_string(), serde_json::Value::String("course".to_string()));
                let encoded = serde_json::to_string(course).unwrap_or_default();
                map.insert("course".to_string(), serde_json::Value::String(encoded));
            }
            Payload::Chunk(metadata) => {
                map.insert("kind".to_string(), serde_json::Value::String("chunk".to_string()));
                map.insert(
                    "course_title".to_string(),
                    serde_json::Value::String(metadata.course_title.clone()),
                );
                if let Some(lesson) = metadata.lesson_number {
                    map.insert("lesson_number".to_string(), serde_json::Value::from(lesson));
                }
                map.insert("chunk_index".to_string(), serde_json::Value::from(metadata.chunk_index));
            }
        }

        qdrant_client::Payload::try_from(serde_json::Value::Object(map)).unwrap_or_default()
    }

    /// Rebuild a record from a Qdrant payload. Returns `None` when the
    /// payload does not carry the expected fields.
    fn from_payload(
        payload: &HashMap<String, QdrantValue>,
        embedding: Vec<f32>,
    ) -> Option<VectorRecord> {
        let id = payload.get("id").and_then(Self::extract_string)?;
        let text = payload.get("text").and_then(Self::extract_string)?;
        let kind = payload.get("kind").and_then(Self::extract_string)?;

        let typed = match kind.as_str() {
            "course" => {
                let encoded = payload.get("course").and_then(Self::extract_string)?;
                let course: Course = serde_json::from_str(&encoded).ok()?;
                Payload::Course(course)
            }
            "chunk" => Payload::Chunk(ChunkMetadata {
                course_title: payload.get("course_title").and_then(Self::extract_string)?,
                lesson_number: payload
                    .get("lesson_number")
                    .and_then(Self::extract_integer)
                    .map(|n| n as u32),
                chunk_index: payload.get("chunk_index").and_then(Self::extract_integer)? as usize,
            }),
            _ => return None,
        };

        Some(VectorRecord { id, text, embedding, payload: typed })
    }

    /// Translate a [`ChunkFilter`] into a Qdrant `must` filter.
    fn to_qdrant_filter(filter: &ChunkFilter) -> Filter {
        let mut must: Vec<Condition> = vec![Condition::matches("kind", "chunk".to_string())];
        if let Some(title) = &filter.course_title {
            must.push(Condition::matches("course_title", title.clone()));
        }
        if let Some(number) = filter.lesson_number {
            must.push(Condition::matches("lesson_number", i64::from(number)));
        }
        Filter::must(must)
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(Self::map_err)?;
        let exists = collections.collections.iter().any(|c| c.name == name);
        if exists {
            debug!(collection = name, "qdrant collection already exists, skipping creation");
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(dimensions as u64, Distance::Cosine)),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = name, dimensions, "created qdrant collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.client.delete_collection(name).await.map_err(Self::map_err)?;
        debug!(collection = name, "deleted qdrant collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .iter()
            .map(|record| {
                PointStruct::new(
                    Self::point_id(&record.id),
                    record.embedding.clone(),
                    Self::to_payload(record),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, count = records.len(), "upserted records to qdrant");
        Ok(())
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<VectorRecord>> {
        let point_id: PointId = Self::point_id(id).into();
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(collection, vec![point_id])
                    .with_payload(true)
                    .with_vectors(true),
            )
            .await
            .map_err(Self::map_err)?;

        let Some(point) = response.result.into_iter().next() else {
            return Ok(None);
        };

        let embedding = point
            .vectors
            .and_then(|v| v.vectors_options)
            .map(|options| match options {
                VectorsOptions::Vector(vector) => vector.data,
                VectorsOptions::Vectors(_) => Vec::new(),
            })
            .unwrap_or_default();

        Ok(Self::from_payload(&point.payload, embedding))
    }

    async fn list_ids(&self, collection: &str) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut request = ScrollPointsBuilder::new(collection)
                .limit(256)
                .with_payload(true)
                .with_vectors(false);
            if let Some(from) = offset.take() {
                request = request.offset(from);
            }

            let response = self.client.scroll(request).await.map_err(Self::map_err)?;
            for point in response.result {
                if let Some(id) = point.payload.get("id").and_then(Self::extract_string) {
                    ids.push(id);
                }
            }

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(ids)
    }

    async fn delete_where(&self, collection: &str, filter: &ChunkFilter) -> Result<usize> {
        let qdrant_filter = Self::to_qdrant_filter(filter);

        let counted = self
            .client
            .count(CountPointsBuilder::new(collection).filter(qdrant_filter.clone()).exact(true))
            .await
            .map_err(Self::map_err)?;
        let removed = counted.result.map(|r| r.count as usize).unwrap_or(0);

        self.client
            .delete_points(DeletePointsBuilder::new(collection).points(qdrant_filter).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(collection, removed, "deleted filtered points from qdrant");
        Ok(removed)
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        filter: Option<&ChunkFilter>,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>> {
        let mut request = SearchPointsBuilder::new(collection, embedding.to_vec(), top_k as u64)
            .with_payload(true);
        if let Some(f) = filter {
            request = request.filter(Self::to_qdrant_filter(f));
        }

        let response = self.client.search_points(request).await.map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .filter_map(|scored| {
                let record = Self::from_payload(&scored.payload, Vec::new());
                if record.is_none() {
                    warn!(collection, "skipping qdrant point with malformed payload");
                }
                // Qdrant reports cosine similarity; convert to distance so
                // lower is closer, matching the rest of the crate.
                record.map(|record| ScoredRecord { record, distance: 1.0 - scored.score })
            })
            .collect();

        Ok(results)
    }
}
