//! LLM-facing search tool layer.
//!
//! The [`CourseSearchTool`] wraps a [`RagPipeline`](crate::RagPipeline) as a
//! named [`Tool`] so an LLM host can perform course-aware retrieval as a
//! tool call. A [`ToolRegistry`] dispatches calls by tool name and exposes
//! the definitions for the host's tool list.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lectern_rag::{CourseSearchTool, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(Arc::new(CourseSearchTool::new(pipeline)));
//!
//! // The host calls the tool with:
//! // { "query": "decorators", "course_name": "python", "lesson_number": 3 }
//! let response = registry.execute("search_course_content", args).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::course::SearchResults;
use crate::error::{RagError, Result};
use crate::pipeline::RagPipeline;

/// A capability an LLM host can expose to its model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool name referenced in tool-call requests.
    fn name(&self) -> &str;

    /// A one-line description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given JSON arguments.
    async fn execute(&self, args: Value) -> Result<ToolResponse>;
}

/// The result of a tool execution: text for the model plus the sources that
/// produced it, for UI attribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResponse {
    /// Formatted text returned to the model.
    pub text: String,
    /// One entry per search hit that contributed to `text`.
    pub sources: Vec<SourceRef>,
}

impl ToolResponse {
    /// A response carrying only text, with no sources.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into(), sources: Vec::new() }
    }
}

/// Attribution for one search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// Human-readable label, e.g. `Advanced Python Programming - Lesson 3`.
    pub display: String,
    /// Link to the lesson, when the catalog has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The course content search tool.
///
/// Accepts a required `query` plus optional `course_name` (fuzzy, resolved
/// against the catalog) and `lesson_number` parameters. Failed course
/// resolution comes back as tool text so the model can rephrase, while
/// infrastructure failures surface as errors to the host.
pub struct CourseSearchTool {
    pipeline: Arc<RagPipeline>,
}

impl CourseSearchTool {
    /// Create the search tool over the given pipeline.
    pub fn new(pipeline: Arc<RagPipeline>) -> Self {
        Self { pipeline }
    }

    /// Format search hits into `[Course - Lesson N]` blocks and collect one
    /// source per hit.
    async fn format_results(&self, results: &SearchResults) -> Result<ToolResponse> {
        let mut blocks = Vec::with_capacity(results.len());
        let mut sources = Vec::with_capacity(results.len());

        for (document, metadata, _) in results.iter() {
            let (header, display) = match metadata.lesson_number {
                Some(lesson) => (
                    format!("[{} - Lesson {lesson}]", metadata.course_title),
                    format!("{} - Lesson {lesson}", metadata.course_title),
                ),
                None => (format!("[{}]", metadata.course_title), metadata.course_title.clone()),
            };
            blocks.push(format!("{header}\n{document}"));

            let link = match metadata.lesson_number {
                Some(lesson) => {
                    self.pipeline.catalog().lesson_link(&metadata.course_title, lesson).await?
                }
                None => None,
            };
            sources.push(SourceRef { display, link });
        }

        Ok(ToolResponse { text: blocks.join("\n\n"), sources })
    }
}

/// The message for a search that matched nothing, qualified by the filters
/// that were in effect.
fn empty_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut message = String::from("No relevant content found");
    if let Some(course) = course_name {
        message.push_str(&format!(" in course '{course}'"));
    }
    if let Some(lesson) = lesson_number {
        message.push_str(&format!(" in lesson {lesson}"));
    }
    message.push('.');
    message
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &str {
        "search_course_content"
    }

    fn description(&self) -> &str {
        "Search course materials with smart course name matching and lesson filtering"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for in the course content"
                },
                "course_name": {
                    "type": "string",
                    "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                },
                "lesson_number": {
                    "type": "integer",
                    "description": "Specific lesson number to search within (e.g. 1, 3)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResponse> {
        let query = args.get("query").and_then(Value::as_str).ok_or_else(|| {
            RagError::ToolError("missing required 'query' parameter".to_string())
        })?;
        let course_name = args.get("course_name").and_then(Value::as_str);
        let lesson_number = args.get("lesson_number").and_then(Value::as_u64).map(|n| n as u32);

        info!(query, course_name, lesson_number, "search_course_content tool called");

        let results = match self.pipeline.search(query, course_name, lesson_number).await {
            Ok(results) => results,
            // The model can recover from a bad course reference; report it
            // as tool text rather than failing the call.
            Err(err @ RagError::CourseNotFound { .. }) => {
                return Ok(ToolResponse::from_text(err.to_string()));
            }
            Err(err) => {
                error!(error = %err, "course content search failed");
                return Err(err);
            }
        };

        if results.is_empty() {
            return Ok(ToolResponse::from_text(empty_message(course_name, lesson_number)));
        }

        self.format_results(&results).await
    }
}

/// A name-keyed set of [`Tool`]s for an LLM host.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name, replacing any previous tool with
    /// that name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Definitions of all registered tools in host wire format:
    /// `{name, description, input_schema}`.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "input_schema": tool.parameters_schema(),
                })
            })
            .collect()
    }

    /// Execute a registered tool by name.
    ///
    /// An unknown name is reported as tool text, mirroring how tool results
    /// flow back to the model.
    pub async fn execute(&self, name: &str, args: Value) -> Result<ToolResponse> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(args).await,
            None => Ok(ToolResponse::from_text(format!("Tool '{name}' not found"))),
        }
    }
}
