//! Configuration for the retrieval pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the retrieval pipeline.
///
/// Defaults mirror the reference deployment: 800-character chunks with 100
/// characters of overlap, 5 search results, no resolution distance cap, and
/// a 30-second deadline per outbound operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Maximum number of results returned by a content search.
    pub max_results: usize,
    /// Optional upper bound on the catalog distance a course resolution may
    /// have. `None` accepts the nearest course unconditionally.
    pub resolve_max_distance: Option<f32>,
    /// Deadline applied to each outbound phase of a search.
    pub request_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            resolve_max_distance: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the maximum number of results returned by a content search.
    pub fn max_results(mut self, n: usize) -> Self {
        self.config.max_results = n;
        self
    }

    /// Set the maximum catalog distance accepted when resolving a course
    /// reference. Resolutions farther than this fail with
    /// [`RagError::CourseNotFound`](crate::RagError::CourseNotFound).
    pub fn resolve_max_distance(mut self, distance: f32) -> Self {
        self.config.resolve_max_distance = Some(distance);
        self
    }

    /// Set the deadline applied to each outbound phase of a search.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `max_results == 0`
    /// - `request_timeout` is zero
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.max_results == 0 {
            return Err(RagError::ConfigError("max_results must be greater than zero".to_string()));
        }
        if self.config.request_timeout.is_zero() {
            return Err(RagError::ConfigError("request_timeout must be non-zero".to_string()));
        }
        Ok(self.config)
    }
}
