//! Data types for courses, lessons, content chunks, and search results.

use serde::{Deserialize, Serialize};

/// A course known to the system.
///
/// The title is the sole identity key: ingesting a course with an existing
/// title replaces that course's catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    /// Canonical course title, unique across the system.
    pub title: String,
    /// Optional URL of the course landing page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_link: Option<String>,
    /// Optional instructor name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    /// Lessons belonging to this course, in catalog order.
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Look up a lesson by its number.
    pub fn lesson(&self, number: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.number == number)
    }

    /// Return the link for a lesson, if the lesson exists and has one.
    pub fn lesson_link(&self, number: u32) -> Option<&str> {
        self.lesson(number).and_then(|l| l.link.as_deref())
    }
}

/// A lesson within a [`Course`].
///
/// Lesson numbers are unique within their course but not necessarily
/// contiguous.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    /// Lesson number within the course.
    pub number: u32,
    /// Lesson title.
    pub title: String,
    /// Optional URL of the lesson page or video.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A contiguous span of course text prepared for indexing.
///
/// Chunks are immutable once written: re-ingesting a course replaces its
/// entire chunk set rather than editing chunks in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseChunk {
    /// The chunk text.
    pub content: String,
    /// Title of the course this chunk belongs to.
    pub course_title: String,
    /// Lesson the chunk came from. `None` for course preamble text that
    /// precedes the first lesson.
    pub lesson_number: Option<u32>,
    /// Position of this chunk in the course-wide chunk stream.
    pub chunk_index: usize,
}

/// The stored metadata record for an indexed chunk, returned alongside each
/// search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Title of the course the chunk belongs to.
    pub course_title: String,
    /// Lesson the chunk came from, if any.
    pub lesson_number: Option<u32>,
    /// Position of the chunk in the course-wide chunk stream.
    pub chunk_index: usize,
}

/// Index-aligned results of a content search.
///
/// `documents[i]`, `metadata[i]`, and `distances[i]` describe the same hit.
/// Hits are ordered by non-decreasing distance (nearest first). An empty
/// `SearchResults` is a successful search that found nothing, which is a
/// different outcome from a failed course resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    /// The matched chunk texts.
    pub documents: Vec<String>,
    /// The stored metadata for each matched chunk.
    pub metadata: Vec<ChunkMetadata>,
    /// Vector distance of each match to the query (lower is closer).
    pub distances: Vec<f32>,
}

impl SearchResults {
    /// Number of hits.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the search found nothing.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate over aligned `(document, metadata, distance)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChunkMetadata, f32)> + '_ {
        self.documents
            .iter()
            .zip(self.metadata.iter())
            .zip(self.distances.iter())
            .map(|((doc, meta), dist)| (doc.as_str(), meta, *dist))
    }
}

/// A course catalog hit: a stored title paired with its vector distance to
/// the lookup query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseMatch {
    /// The stored canonical course title.
    pub title: String,
    /// Distance of the stored title's embedding to the query (lower is closer).
    pub distance: f32,
}

/// Summary statistics over the course catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseAnalytics {
    /// Number of courses in the catalog.
    pub total_courses: usize,
    /// Canonical titles of all cataloged courses.
    pub course_titles: Vec<String>,
}
