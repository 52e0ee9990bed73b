//! # Course Search Example
//!
//! Demonstrates the full retrieval flow: chunk lesson text, ingest two
//! courses, then run unfiltered, course-scoped, and lesson-scoped searches.
//!
//! Uses `InMemoryVectorStore` and the deterministic `MockEmbedder` so it
//! runs with **zero API keys**.
//!
//! Run: `cargo run --example course_search`

use std::sync::Arc;

use lectern_rag::{
    Course, IngestMode, InMemoryVectorStore, Lesson, MockEmbedder, RagConfig, RagPipeline,
    SentenceChunker, chunk_course,
};

const PYTHON_TITLE: &str = "Advanced Python Programming";
const RUST_TITLE: &str = "Rust for Systems Programmers";

/// Unit vector along one axis, used to pin catalog fixtures.
fn pinned(i: usize, dimensions: usize) -> Vec<f32> {
    let mut v = vec![0.0; dimensions];
    v[i] = 1.0;
    v
}

fn python_course() -> Course {
    Course {
        title: PYTHON_TITLE.to_string(),
        course_link: Some("https://courses.example.com/python".to_string()),
        instructor: Some("Ada Lovelace".to_string()),
        lessons: vec![
            Lesson {
                number: 1,
                title: "Comprehensions".to_string(),
                link: Some("https://courses.example.com/python/lesson/1".to_string()),
            },
            Lesson {
                number: 2,
                title: "Decorators and Closures".to_string(),
                link: Some("https://courses.example.com/python/lesson/2".to_string()),
            },
        ],
    }
}

fn rust_course() -> Course {
    Course {
        title: RUST_TITLE.to_string(),
        course_link: Some("https://courses.example.com/rust".to_string()),
        instructor: Some("Grace Hopper".to_string()),
        lessons: vec![Lesson { number: 1, title: "Ownership".to_string(), link: None }],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -- 1. Configure the pipeline ----------------------------------------
    // chunk_size=200 keeps chunks small for this demo; overlap=40 shares
    // context between adjacent chunks; max_results=3 caps each search;
    // hints farther than 0.5 from every catalog entry are rejected.
    let config = RagConfig::builder()
        .chunk_size(200)
        .chunk_overlap(40)
        .max_results(3)
        .resolve_max_distance(0.5)
        .build()?;

    // -- 2. Build the pipeline with in-memory components ------------------
    // MockEmbedder hashes text into 64-dimensional vectors; the two course
    // titles and their short aliases are pinned so fuzzy resolution is
    // reproducible.
    let dimensions = 64;
    let embedder = MockEmbedder::new(dimensions)
        .with_fixture(PYTHON_TITLE, pinned(0, dimensions))
        .with_fixture("python", pinned(0, dimensions))
        .with_fixture(RUST_TITLE, pinned(1, dimensions))
        .with_fixture("rust", pinned(1, dimensions))
        .with_fixture("underwater basket weaving", pinned(2, dimensions));

    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(embedder))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .build()?,
    );
    pipeline.initialize().await?;

    // -- 3. Chunk lesson text ---------------------------------------------
    let chunker = SentenceChunker::from_config(pipeline.config());

    let python_sections: Vec<(Option<u32>, &str)> = vec![
        (
            None,
            "This course covers intermediate and advanced Python. You should already \
             be comfortable with functions, modules, and the standard library.",
        ),
        (
            Some(1),
            "List comprehensions build new lists from iterables in a single expression. \
             Generator expressions do the same lazily, producing items on demand. \
             Dict and set comprehensions follow the same shape with braces.",
        ),
        (
            Some(2),
            "A decorator is a callable that takes a function and returns a replacement. \
             Closures capture variables from the enclosing scope, which is how decorators \
             remember configuration. functools.wraps preserves the wrapped function's \
             name and docstring.",
        ),
    ];
    let python_chunks = chunk_course(&chunker, PYTHON_TITLE, &python_sections);

    let rust_sections: Vec<(Option<u32>, &str)> = vec![(
        Some(1),
        "Ownership moves values between bindings. Borrowing lends access without \
         moving, and the borrow checker enforces aliasing rules at compile time.",
    )];
    let rust_chunks = chunk_course(&chunker, RUST_TITLE, &rust_sections);

    // -- 4. Ingest both courses -------------------------------------------
    println!("Ingesting courses...");
    for (course, chunks) in
        [(python_course(), &python_chunks), (rust_course(), &rust_chunks)]
    {
        let outcome = pipeline.ingest_course(&course, chunks, IngestMode::SkipExisting).await?;
        println!("  {} → {} chunk(s), {:?}", course.title, chunks.len(), outcome);
    }

    // -- 5. Search --------------------------------------------------------
    // A course hint is resolved against the catalog first, so the partial
    // name "python" scopes the search to the full course title.
    let searches: Vec<(&str, Option<&str>, Option<u32>)> = vec![
        ("how do decorators remember configuration", None, None),
        ("building lists from iterables", Some("python"), None),
        ("closures and scope", Some("python"), Some(2)),
        ("borrow checker rules", Some("rust"), None),
    ];

    for (query, course_hint, lesson) in searches {
        println!("\nQuery: \"{query}\" (course: {course_hint:?}, lesson: {lesson:?})");
        let results = pipeline.search(query, course_hint, lesson).await?;
        if results.is_empty() {
            println!("  (no results)");
        } else {
            for (i, (document, metadata, distance)) in results.iter().enumerate() {
                let lesson_label = metadata
                    .lesson_number
                    .map(|n| format!("lesson {n}"))
                    .unwrap_or_else(|| "preamble".to_string());
                println!(
                    "  {}. [dist={:.4}] {} / {} | {}",
                    i + 1,
                    distance,
                    metadata.course_title,
                    lesson_label,
                    &document[..document.len().min(70)],
                );
            }
        }
    }

    // -- 6. An unknown course is an error, not an empty result ------------
    match pipeline.search("anything", Some("underwater basket weaving"), None).await {
        Ok(_) => println!("\nUnexpected: the hint resolved"),
        Err(err) => println!("\nUnknown course hint: {err}"),
    }

    // -- 7. Catalog analytics ---------------------------------------------
    let analytics = pipeline.analytics().await?;
    println!("\nCatalog: {} course(s)", analytics.total_courses);
    for title in &analytics.course_titles {
        println!("  - {title}");
    }

    println!("\nDone.");
    Ok(())
}
