//! Course catalog: small metadata collection mapping titles to courses.
//!
//! The catalog holds one embedded record per course, keyed by canonical
//! title and embedded by that title, so fuzzy course references can be
//! resolved with a semantic lookup. Course links and lesson links live in
//! the catalog payload.

use std::sync::Arc;

use tracing::debug;

use crate::course::{Course, CourseMatch};
use crate::embedding::{EmbeddingProvider, embed_checked};
use crate::error::Result;
use crate::vectorstore::{Payload, VectorRecord, VectorStore};

const COLLECTION: &str = "course_catalog";

/// The course metadata collection.
///
/// Backed by an injected [`VectorStore`] and [`EmbeddingProvider`]; the
/// catalog owns no storage of its own.
pub struct CourseCatalog {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl CourseCatalog {
    /// Create a catalog over the given store and embedder.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Create the backing collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<()> {
        self.store.create_collection(COLLECTION, self.embedder.dimensions()).await
    }

    /// Insert or replace a course record.
    ///
    /// The course title is both the record id and the embedded text, so a
    /// repeated upsert of the same title replaces the previous entry.
    pub async fn upsert(&self, course: &Course) -> Result<()> {
        let embedding = embed_checked(self.embedder.as_ref(), &course.title).await?;
        let record = VectorRecord {
            id: course.title.clone(),
            text: course.title.clone(),
            embedding,
            payload: Payload::Course(course.clone()),
        };
        self.store.upsert(COLLECTION, &[record]).await?;
        debug!(course = %course.title, lessons = course.lessons.len(), "cataloged course");
        Ok(())
    }

    /// Find the cataloged courses nearest to a free-form query.
    ///
    /// Returns up to `top_k` matches ordered by ascending distance. An
    /// empty catalog yields an empty vec, not an error.
    pub async fn semantic_lookup(&self, query: &str, top_k: usize) -> Result<Vec<CourseMatch>> {
        let embedding = embed_checked(self.embedder.as_ref(), query).await?;
        let hits = self.store.search(COLLECTION, &embedding, None, top_k).await?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                hit.record
                    .payload
                    .as_course()
                    .map(|course| CourseMatch { title: course.title.clone(), distance: hit.distance })
            })
            .collect())
    }

    /// Fetch a course by exact canonical title.
    pub async fn get(&self, title: &str) -> Result<Option<Course>> {
        let record = self.store.fetch(COLLECTION, title).await?;
        Ok(record.and_then(|r| r.payload.as_course().cloned()))
    }

    /// List the canonical titles of all cataloged courses.
    pub async fn list_titles(&self) -> Result<Vec<String>> {
        self.store.list_ids(COLLECTION).await
    }

    /// Number of cataloged courses.
    pub async fn count(&self) -> Result<usize> {
        Ok(self.list_titles().await?.len())
    }

    /// The landing-page link of a course, if stored.
    pub async fn course_link(&self, title: &str) -> Result<Option<String>> {
        Ok(self.get(title).await?.and_then(|course| course.course_link))
    }

    /// The link of a specific lesson, if the course and lesson exist and a
    /// link was stored.
    pub async fn lesson_link(&self, title: &str, lesson_number: u32) -> Result<Option<String>> {
        Ok(self
            .get(title)
            .await?
            .and_then(|course| course.lesson_link(lesson_number).map(str::to_string)))
    }

    /// Drop and recreate the catalog collection.
    pub async fn clear(&self) -> Result<()> {
        self.store.delete_collection(COLLECTION).await?;
        self.ensure_collection().await
    }
}
