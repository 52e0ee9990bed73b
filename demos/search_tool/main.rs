//! # Search Tool Example
//!
//! Exposes the course search pipeline as an LLM tool: print the tool
//! definition an agent host would advertise, then dispatch tool calls
//! through a registry the way a model's tool-use loop would.
//!
//! Run: `cargo run --example search_tool`

use std::sync::Arc;

use lectern_rag::{
    Course, CourseChunk, CourseSearchTool, IngestMode, InMemoryVectorStore, Lesson, MockEmbedder,
    RagConfig, RagPipeline, ToolRegistry,
};
use serde_json::json;

const COURSE_TITLE: &str = "MCP: Build Rich-Context AI Apps";

fn pinned(i: usize, dimensions: usize) -> Vec<f32> {
    let mut v = vec![0.0; dimensions];
    v[i] = 1.0;
    v
}

fn sample_course() -> Course {
    Course {
        title: COURSE_TITLE.to_string(),
        course_link: Some("https://courses.example.com/mcp".to_string()),
        instructor: Some("Elicia Chen".to_string()),
        lessons: vec![
            Lesson {
                number: 1,
                title: "Why Context Protocols".to_string(),
                link: Some("https://courses.example.com/mcp/lesson/1".to_string()),
            },
            Lesson {
                number: 2,
                title: "Servers and Clients".to_string(),
                link: Some("https://courses.example.com/mcp/lesson/2".to_string()),
            },
        ],
    }
}

fn sample_chunks() -> Vec<CourseChunk> {
    let chunk = |lesson: Option<u32>, index: usize, content: &str| CourseChunk {
        content: content.to_string(),
        course_title: COURSE_TITLE.to_string(),
        lesson_number: lesson,
        chunk_index: index,
    };
    vec![
        chunk(
            None,
            0,
            "This course teaches the Model Context Protocol from first principles.",
        ),
        chunk(
            Some(1),
            1,
            "Context protocols standardize how applications feed models with tools, \
             resources, and prompts.",
        ),
        chunk(
            Some(2),
            2,
            "An MCP server exposes capabilities; a client connects, lists them, and \
             invokes tools over the wire.",
        ),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // -- 1. Build and populate the pipeline -------------------------------
    // Hints farther than 0.5 from every catalog entry fail resolution, so
    // the third call below comes back as "no course found" tool text.
    let config = RagConfig::builder().resolve_max_distance(0.5).build()?;
    let dimensions = 64;
    let embedder = MockEmbedder::new(dimensions)
        .with_fixture(COURSE_TITLE, pinned(0, dimensions))
        .with_fixture("MCP", pinned(0, dimensions))
        .with_fixture("nonexistent course", pinned(3, dimensions));

    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(embedder))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .build()?,
    );
    pipeline.initialize().await?;
    pipeline.ingest_course(&sample_course(), &sample_chunks(), IngestMode::SkipExisting).await?;

    // -- 2. Register the tool ---------------------------------------------
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(CourseSearchTool::new(pipeline)));

    println!("Tool definitions advertised to the model:");
    println!("{}", serde_json::to_string_pretty(&registry.definitions())?);

    // -- 3. Dispatch tool calls like a model would ------------------------
    let calls = vec![
        json!({ "query": "how do servers expose capabilities", "course_name": "MCP" }),
        json!({ "query": "standardizing model context", "course_name": "MCP", "lesson_number": 1 }),
        json!({ "query": "anything", "course_name": "nonexistent course" }),
    ];

    for args in calls {
        println!("\nTool call: {args}");
        let response = registry.execute("search_course_content", args).await?;
        println!("{}", response.text);
        for source in &response.sources {
            match &source.link {
                Some(link) => println!("  source: {} <{link}>", source.display),
                None => println!("  source: {}", source.display),
            }
        }
    }

    // -- 4. Unknown tool names come back as tool text ---------------------
    let response = registry.execute("get_weather", json!({})).await?;
    println!("\nUnknown tool: {}", response.text);

    println!("\nDone.");
    Ok(())
}
