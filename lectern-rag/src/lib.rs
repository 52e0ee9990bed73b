//! Course-aware retrieval for course-material RAG assistants.
//!
//! This crate provides:
//! - Sentence-aware chunking of lesson text into overlapping pieces
//! - A course catalog collection for fuzzy course reference resolution
//! - A content collection with filter-before-rank semantic search
//! - A pipeline tying both together behind ingest and search operations
//! - An LLM-facing search tool with source attribution
//!
//! Storage and embedding backends are injected through the [`VectorStore`]
//! and [`EmbeddingProvider`] traits. An in-memory store ships by default;
//! the `qdrant` and `openai` features add a Qdrant backend and an
//! OpenAI-compatible embedding provider.

pub mod catalog;
pub mod chunking;
pub mod config;
pub mod content;
pub mod course;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod mock;
pub mod pipeline;
pub mod resolver;
pub mod tool;
pub mod vectorstore;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use catalog::CourseCatalog;
pub use chunking::{Chunker, SentenceChunker, chunk_course};
pub use config::{RagConfig, RagConfigBuilder};
pub use content::CourseContent;
pub use course::{
    ChunkMetadata, Course, CourseAnalytics, CourseChunk, CourseMatch, Lesson, SearchResults,
};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use inmemory::InMemoryVectorStore;
pub use mock::MockEmbedder;
pub use pipeline::{IngestMode, IngestOutcome, RagPipeline, RagPipelineBuilder};
pub use resolver::CourseResolver;
pub use tool::{CourseSearchTool, SourceRef, Tool, ToolRegistry, ToolResponse};
pub use vectorstore::{ChunkFilter, Payload, ScoredRecord, VectorRecord, VectorStore};

#[cfg(feature = "openai")]
pub use openai::OpenAiEmbedder;

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
