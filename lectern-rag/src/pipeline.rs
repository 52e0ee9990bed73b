//! Retrieval pipeline orchestrator.
//!
//! The [`RagPipeline`] composes the [`CourseCatalog`], [`CourseContent`]
//! collection, and [`CourseResolver`] behind the two operations hosts call:
//! course ingestion and two-stage search (resolve the course reference,
//! then run a filtered content search).
//!
//! # Example
//!
//! ```rust,ignore
//! use lectern_rag::{RagPipeline, RagConfig, InMemoryVectorStore};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! pipeline.initialize().await?;
//! pipeline.ingest_course(&course, &chunks, IngestMode::SkipExisting).await?;
//! let results = pipeline.search("decorators", Some("python"), Some(3)).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::catalog::CourseCatalog;
use crate::config::RagConfig;
use crate::content::CourseContent;
use crate::course::{Course, CourseAnalytics, CourseChunk, SearchResults};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::resolver::CourseResolver;
use crate::vectorstore::{ChunkFilter, VectorStore};

/// How [`ingest_course`](RagPipeline::ingest_course) treats a course title
/// that is already cataloged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Leave the existing course untouched and report
    /// [`IngestOutcome::Skipped`].
    SkipExisting,
    /// Remove the existing chunk set, then write the new course and chunks.
    Replace,
}

/// What an [`ingest_course`](RagPipeline::ingest_course) call actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The title was new; its chunks were indexed.
    Ingested {
        /// Number of chunks written.
        chunks: usize,
    },
    /// The title existed; the old chunk set was removed and replaced.
    Replaced {
        /// Number of chunks written.
        chunks: usize,
        /// Number of stale chunks removed first.
        removed: usize,
    },
    /// The title existed and [`IngestMode::SkipExisting`] left it untouched.
    Skipped,
}

/// The retrieval pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`], then call
/// [`initialize`](RagPipeline::initialize) once to create the backing
/// collections.
pub struct RagPipeline {
    config: RagConfig,
    catalog: Arc<CourseCatalog>,
    content: CourseContent,
    resolver: CourseResolver,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the course catalog.
    pub fn catalog(&self) -> &Arc<CourseCatalog> {
        &self.catalog
    }

    /// Return a reference to the content collection.
    pub fn content(&self) -> &CourseContent {
        &self.content
    }

    /// Create the catalog and content collections if they do not exist.
    ///
    /// Call once after building; every later call is a no-op.
    pub async fn initialize(&self) -> Result<()> {
        self.catalog.ensure_collection().await?;
        self.content.ensure_collection().await?;
        info!("course collections ready");
        Ok(())
    }

    /// Search course content, optionally scoped to a course and lesson.
    ///
    /// A present `course_hint` is resolved against the catalog first; the
    /// resolved canonical title and the `lesson_number` become exact-match
    /// filter clauses for the content search. A hint that resolves to
    /// nothing fails the whole search with
    /// [`RagError::CourseNotFound`]; there is no fallback to an unfiltered
    /// search. A search that matches nothing returns an empty
    /// [`SearchResults`], which is success.
    ///
    /// Each outbound phase runs under the configured `request_timeout`; an
    /// elapsed deadline surfaces as [`RagError::Timeout`] with no partial
    /// results.
    pub async fn search(
        &self,
        query: &str,
        course_hint: Option<&str>,
        lesson_number: Option<u32>,
    ) -> Result<SearchResults> {
        let resolved = match course_hint {
            Some(hint) => {
                Some(self.with_deadline("course resolution", self.resolver.resolve(hint)).await?)
            }
            None => None,
        };

        let filter = ChunkFilter::build(resolved, lesson_number);
        let results = self
            .with_deadline(
                "content search",
                self.content.filtered_search(query, filter.as_ref(), self.config.max_results),
            )
            .await?;

        info!(
            query,
            course = filter.as_ref().and_then(|f| f.course_title.as_deref()),
            lesson = lesson_number,
            result_count = results.len(),
            "search completed"
        );
        Ok(results)
    }

    /// Ingest a course and its pre-chunked content.
    ///
    /// Validates referential integrity before writing: every chunk must
    /// carry the course's title, every referenced lesson number must exist
    /// in the course, and chunk indexes must be strictly increasing. The
    /// catalog entry is written before the chunks, so indexed content never
    /// references a missing catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestError`] on an integrity violation, leaving
    /// storage untouched.
    pub async fn ingest_course(
        &self,
        course: &Course,
        chunks: &[CourseChunk],
        mode: IngestMode,
    ) -> Result<IngestOutcome> {
        validate_course(course, chunks)?;

        let existing = self.catalog.list_titles().await?;
        let already_known = existing.iter().any(|title| *title == course.title);

        if already_known && mode == IngestMode::SkipExisting {
            info!(course = %course.title, "course already cataloged, skipping");
            return Ok(IngestOutcome::Skipped);
        }

        // Replace invalidates the whole prior chunk set before any new
        // chunk is written.
        let removed =
            if already_known { self.content.delete_by_course(&course.title).await? } else { 0 };

        self.catalog.upsert(course).await?;
        self.content.insert_chunks(chunks).await?;

        info!(
            course = %course.title,
            chunk_count = chunks.len(),
            replaced = already_known,
            "ingested course"
        );

        if already_known {
            Ok(IngestOutcome::Replaced { chunks: chunks.len(), removed })
        } else {
            Ok(IngestOutcome::Ingested { chunks: chunks.len() })
        }
    }

    /// List the canonical titles of all cataloged courses, sorted.
    pub async fn list_courses(&self) -> Result<Vec<String>> {
        let mut titles = self.catalog.list_titles().await?;
        titles.sort();
        Ok(titles)
    }

    /// Summary statistics over the catalog.
    pub async fn analytics(&self) -> Result<CourseAnalytics> {
        let course_titles = self.list_courses().await?;
        Ok(CourseAnalytics { total_courses: course_titles.len(), course_titles })
    }

    /// Wipe both collections and recreate them empty.
    pub async fn clear_all(&self) -> Result<()> {
        self.catalog.clear().await?;
        self.content.clear().await?;
        info!("cleared all course data");
        Ok(())
    }

    /// Run a pipeline phase under the configured deadline.
    async fn with_deadline<T>(
        &self,
        operation: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let limit = self.config.request_timeout;
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!(operation, ?limit, "operation timed out");
                Err(RagError::Timeout { operation: operation.to_string(), limit })
            }
        }
    }
}

/// Check the referential integrity of a course and its chunk stream.
fn validate_course(course: &Course, chunks: &[CourseChunk]) -> Result<()> {
    if course.title.trim().is_empty() {
        return Err(RagError::IngestError("course title must not be empty".to_string()));
    }

    let mut numbers: Vec<u32> = course.lessons.iter().map(|lesson| lesson.number).collect();
    numbers.sort_unstable();
    if numbers.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(RagError::IngestError(format!(
            "duplicate lesson number in course '{}'",
            course.title
        )));
    }

    let mut last_index: Option<usize> = None;
    for chunk in chunks {
        if chunk.course_title != course.title {
            return Err(RagError::IngestError(format!(
                "chunk {} references course '{}' instead of '{}'",
                chunk.chunk_index, chunk.course_title, course.title
            )));
        }
        if let Some(number) = chunk.lesson_number {
            if course.lesson(number).is_none() {
                return Err(RagError::IngestError(format!(
                    "chunk {} references lesson {number}, which '{}' does not have",
                    chunk.chunk_index, course.title
                )));
            }
        }
        if let Some(last) = last_index {
            if chunk.chunk_index <= last {
                return Err(RagError::IngestError(format!(
                    "chunk indexes must be strictly increasing (saw {} after {last})",
                    chunk.chunk_index
                )));
            }
        }
        last_index = Some(chunk.chunk_index);
    }

    Ok(())
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        let catalog =
            Arc::new(CourseCatalog::new(vector_store.clone(), embedding_provider.clone()));
        let content = CourseContent::new(vector_store, embedding_provider);
        let resolver = match config.resolve_max_distance {
            Some(distance) => CourseResolver::new(catalog.clone()).with_max_distance(distance),
            None => CourseResolver::new(catalog.clone()),
        };

        Ok(RagPipeline { config, catalog, content, resolver })
    }
}
