//! Fuzzy course reference resolution.
//!
//! Users rarely type canonical course titles. The resolver turns a partial
//! or approximate reference ("python", "MCP") into the stored canonical
//! title by semantic lookup against the catalog, so the content filter can
//! use exact equality.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::CourseCatalog;
use crate::error::{RagError, Result};

/// Resolves fuzzy course references against the [`CourseCatalog`].
pub struct CourseResolver {
    catalog: Arc<CourseCatalog>,
    max_distance: Option<f32>,
}

impl CourseResolver {
    /// Create a resolver with no distance cap: the nearest cataloged course
    /// always wins.
    pub fn new(catalog: Arc<CourseCatalog>) -> Self {
        Self { catalog, max_distance: None }
    }

    /// Reject resolutions whose best match is farther than `distance`.
    pub fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = Some(distance);
        self
    }

    /// Resolve a course reference to its stored canonical title.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CourseNotFound`] when the catalog is empty or,
    /// with a distance cap configured, when the nearest course is too far
    /// from the reference.
    pub async fn resolve(&self, hint: &str) -> Result<String> {
        let matches = self.catalog.semantic_lookup(hint, 1).await?;
        let Some(best) = matches.into_iter().next() else {
            warn!(hint, "course resolution found no candidates");
            return Err(RagError::CourseNotFound { hint: hint.to_string() });
        };

        if let Some(limit) = self.max_distance {
            if best.distance > limit {
                warn!(
                    hint,
                    title = %best.title,
                    distance = best.distance,
                    limit,
                    "nearest course rejected by distance cap"
                );
                return Err(RagError::CourseNotFound { hint: hint.to_string() });
            }
        }

        debug!(hint, title = %best.title, distance = best.distance, "resolved course reference");
        Ok(best.title)
    }
}
