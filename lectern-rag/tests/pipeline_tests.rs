//! Integration tests for the retrieval pipeline: ingestion, two-stage
//! search, deadlines, and catalog analytics over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use lectern_rag::course::{Course, CourseChunk, Lesson};
use lectern_rag::error::RagError;
use lectern_rag::inmemory::InMemoryVectorStore;
use lectern_rag::mock::MockEmbedder;
use lectern_rag::pipeline::{IngestMode, IngestOutcome, RagPipeline};
use lectern_rag::RagConfig;

const DIM: usize = 8;

const PYTHON_TITLE: &str = "Advanced Python Programming";
const DATA_TITLE: &str = "Data Engineering Basics";

const QUERY: &str = "how do decorators work";
const PREAMBLE: &str = "Course syllabus and prerequisites overview.";
const LESSON_2_CHUNK: &str = "Lists, dicts, and sets in practice.";
const CHUNK_8: &str = "Decorators wrap callables to extend behavior.";
const CHUNK_15: &str = "Closures capture the enclosing scope for later calls.";
const CHUNK_23: &str = "functools.wraps preserves metadata on wrapped functions.";
const DATA_CHUNK: &str = "Batch pipelines move data on a schedule.";
const REWRITE_CHUNK: &str = "Rewritten decorator overview for the second edition.";

/// Unit vector along one axis.
fn axis(i: usize) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[i] = 1.0;
    v
}

/// Unit vector at a chosen cosine similarity to `axis(0)`, so its cosine
/// distance from `axis(0)` is exactly `1.0 - similarity`.
fn tilted(similarity: f32) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    v[0] = similarity;
    v[1] = (1.0 - similarity * similarity).sqrt();
    v
}

/// Embedder with every text this suite touches pinned to an exact vector.
///
/// The query sits on `axis(0)`; the three lesson-3 chunks sit at cosine
/// distances 0.28, 0.32, and 0.35 from it. Unrelated chunks and the other
/// course title sit on orthogonal axes.
fn scenario_embedder() -> MockEmbedder {
    MockEmbedder::new(DIM)
        .with_fixture(PYTHON_TITLE, axis(0))
        .with_fixture(DATA_TITLE, axis(1))
        .with_fixture("python", tilted(0.9))
        .with_fixture("underwater basket weaving", axis(4))
        .with_fixture(QUERY, axis(0))
        .with_fixture(CHUNK_8, tilted(0.72))
        .with_fixture(CHUNK_15, tilted(0.68))
        .with_fixture(CHUNK_23, tilted(0.65))
        .with_fixture(PREAMBLE, axis(2))
        .with_fixture(LESSON_2_CHUNK, axis(2))
        .with_fixture(DATA_CHUNK, axis(3))
        .with_fixture(REWRITE_CHUNK, tilted(0.5))
}

fn lesson(number: u32, title: &str, link: Option<&str>) -> Lesson {
    Lesson { number, title: title.to_string(), link: link.map(str::to_string) }
}

fn python_course() -> Course {
    Course {
        title: PYTHON_TITLE.to_string(),
        course_link: Some("https://courses.example.com/python".to_string()),
        instructor: Some("Ada Lovelace".to_string()),
        lessons: vec![
            lesson(1, "Getting Started", Some("https://courses.example.com/python/lesson/1")),
            lesson(2, "Data Structures", Some("https://courses.example.com/python/lesson/2")),
            lesson(3, "Decorators and Closures", Some("https://courses.example.com/python/lesson/3")),
        ],
    }
}

fn python_chunks() -> Vec<CourseChunk> {
    vec![
        chunk(PYTHON_TITLE, None, 0, PREAMBLE),
        chunk(PYTHON_TITLE, Some(2), 5, LESSON_2_CHUNK),
        chunk(PYTHON_TITLE, Some(3), 8, CHUNK_8),
        chunk(PYTHON_TITLE, Some(3), 15, CHUNK_15),
        chunk(PYTHON_TITLE, Some(3), 23, CHUNK_23),
    ]
}

fn data_course() -> Course {
    Course {
        title: DATA_TITLE.to_string(),
        course_link: None,
        instructor: None,
        lessons: vec![lesson(1, "Batch and Streaming", None)],
    }
}

fn data_chunks() -> Vec<CourseChunk> {
    vec![chunk(DATA_TITLE, Some(1), 0, DATA_CHUNK)]
}

fn chunk(title: &str, lesson: Option<u32>, index: usize, content: &str) -> CourseChunk {
    CourseChunk {
        content: content.to_string(),
        course_title: title.to_string(),
        lesson_number: lesson,
        chunk_index: index,
    }
}

async fn build_pipeline(embedder: MockEmbedder, config: RagConfig) -> RagPipeline {
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap();
    pipeline.initialize().await.unwrap();
    pipeline
}

/// Pipeline with both sample courses ingested.
async fn scenario_pipeline() -> RagPipeline {
    let pipeline = build_pipeline(scenario_embedder(), RagConfig::default()).await;
    pipeline
        .ingest_course(&python_course(), &python_chunks(), IngestMode::SkipExisting)
        .await
        .unwrap();
    pipeline.ingest_course(&data_course(), &data_chunks(), IngestMode::SkipExisting).await.unwrap();
    pipeline
}

#[tokio::test]
async fn filtered_search_returns_lesson_chunks_in_distance_order() {
    let pipeline = scenario_pipeline().await;

    let results = pipeline.search(QUERY, Some("python"), Some(3)).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.documents, vec![CHUNK_8, CHUNK_15, CHUNK_23]);

    let indexes: Vec<usize> = results.metadata.iter().map(|m| m.chunk_index).collect();
    assert_eq!(indexes, vec![8, 15, 23]);
    for metadata in &results.metadata {
        assert_eq!(metadata.course_title, PYTHON_TITLE);
        assert_eq!(metadata.lesson_number, Some(3));
    }

    let expected = [0.28f32, 0.32, 0.35];
    assert_eq!(results.distances.len(), expected.len());
    for (distance, want) in results.distances.iter().zip(expected) {
        assert!((distance - want).abs() < 1e-4, "distance {distance} differs from {want}");
    }
}

#[tokio::test]
async fn search_results_stay_aligned() {
    let pipeline = scenario_pipeline().await;

    let results = pipeline.search(QUERY, Some("python"), None).await.unwrap();

    assert_eq!(results.documents.len(), results.metadata.len());
    assert_eq!(results.metadata.len(), results.distances.len());
    for (document, metadata, distance) in results.iter() {
        assert!(!document.is_empty());
        assert_eq!(metadata.course_title, PYTHON_TITLE);
        assert!((0.0..=2.0).contains(&distance));
    }
}

#[tokio::test]
async fn exact_title_resolves_to_that_course() {
    let pipeline = scenario_pipeline().await;

    let results = pipeline.search(QUERY, Some(PYTHON_TITLE), None).await.unwrap();

    assert_eq!(results.len(), 5);
    assert!(results.metadata.iter().all(|m| m.course_title == PYTHON_TITLE));
    assert!(!results.documents.iter().any(|d| d == DATA_CHUNK));
}

#[tokio::test]
async fn partial_hint_resolves_to_nearest_course() {
    let pipeline = scenario_pipeline().await;

    // "python" is nowhere a stored title; resolution maps it to the
    // canonical one before filtering.
    let results = pipeline.search(QUERY, Some("python"), None).await.unwrap();

    assert!(!results.is_empty());
    assert!(results.metadata.iter().all(|m| m.course_title == PYTHON_TITLE));
}

#[tokio::test]
async fn unknown_course_is_an_error_not_an_empty_result() {
    let pipeline = build_pipeline(scenario_embedder(), RagConfig::default()).await;

    // Catalog is empty; any hint must fail loudly.
    let err = pipeline.search(QUERY, Some("underwater basket weaving"), None).await.unwrap_err();
    assert!(matches!(err, RagError::CourseNotFound { .. }));
    assert_eq!(err.to_string(), "No course found matching 'underwater basket weaving'");
}

#[tokio::test]
async fn resolution_cap_rejects_distant_courses() {
    let strict = RagConfig::builder().resolve_max_distance(0.05).build().unwrap();
    let pipeline = build_pipeline(scenario_embedder(), strict).await;
    pipeline
        .ingest_course(&python_course(), &python_chunks(), IngestMode::SkipExisting)
        .await
        .unwrap();

    // "python" sits at distance 0.1 from the title, past the 0.05 cap.
    let err = pipeline.search(QUERY, Some("python"), None).await.unwrap_err();
    assert!(matches!(err, RagError::CourseNotFound { .. }));

    let lenient = RagConfig::builder().resolve_max_distance(0.2).build().unwrap();
    let pipeline = build_pipeline(scenario_embedder(), lenient).await;
    pipeline
        .ingest_course(&python_course(), &python_chunks(), IngestMode::SkipExisting)
        .await
        .unwrap();
    assert!(pipeline.search(QUERY, Some("python"), None).await.is_ok());
}

#[tokio::test]
async fn matching_nothing_is_success_not_an_error() {
    let pipeline = scenario_pipeline().await;

    let results = pipeline.search(QUERY, Some("python"), Some(99)).await.unwrap();

    assert!(results.is_empty());
    assert_eq!(results.len(), 0);
}

#[tokio::test]
async fn first_ingest_reports_chunk_count() {
    let pipeline = build_pipeline(scenario_embedder(), RagConfig::default()).await;

    let outcome = pipeline
        .ingest_course(&python_course(), &python_chunks(), IngestMode::SkipExisting)
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::Ingested { chunks: 5 });
    assert_eq!(pipeline.content().count().await.unwrap(), 5);
}

#[tokio::test]
async fn skip_existing_leaves_prior_content() {
    let pipeline = scenario_pipeline().await;

    let outcome = pipeline
        .ingest_course(&python_course(), &[chunk(PYTHON_TITLE, None, 0, REWRITE_CHUNK)], IngestMode::SkipExisting)
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::Skipped);
    let results = pipeline.search(QUERY, Some("python"), Some(3)).await.unwrap();
    assert_eq!(results.documents, vec![CHUNK_8, CHUNK_15, CHUNK_23]);
}

#[tokio::test]
async fn replace_mode_invalidates_prior_chunks() {
    let pipeline = scenario_pipeline().await;

    let outcome = pipeline
        .ingest_course(
            &python_course(),
            &[chunk(PYTHON_TITLE, Some(3), 0, REWRITE_CHUNK)],
            IngestMode::Replace,
        )
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::Replaced { chunks: 1, removed: 5 });

    let results = pipeline.search(QUERY, Some("python"), None).await.unwrap();
    assert_eq!(results.documents, vec![REWRITE_CHUNK]);

    // The other course's chunks are untouched.
    assert_eq!(pipeline.content().count().await.unwrap(), 2);
}

#[tokio::test]
async fn rejects_inconsistent_chunk_streams() {
    let pipeline = build_pipeline(scenario_embedder(), RagConfig::default()).await;

    // Chunk pointing at a different course.
    let stray = vec![chunk("Some Other Course", None, 0, PREAMBLE)];
    let err = pipeline.ingest_course(&python_course(), &stray, IngestMode::SkipExisting).await;
    assert!(matches!(err, Err(RagError::IngestError(_))));

    // Chunk referencing a lesson the course does not have.
    let phantom = vec![chunk(PYTHON_TITLE, Some(7), 0, PREAMBLE)];
    let err = pipeline.ingest_course(&python_course(), &phantom, IngestMode::SkipExisting).await;
    assert!(matches!(err, Err(RagError::IngestError(_))));

    // Non-increasing chunk indexes.
    let stalled =
        vec![chunk(PYTHON_TITLE, Some(3), 3, CHUNK_8), chunk(PYTHON_TITLE, Some(3), 3, CHUNK_15)];
    let err = pipeline.ingest_course(&python_course(), &stalled, IngestMode::SkipExisting).await;
    assert!(matches!(err, Err(RagError::IngestError(_))));

    // Duplicate lesson numbers in the course itself.
    let mut doubled = python_course();
    doubled.lessons.push(lesson(3, "Decorators Again", None));
    let err = pipeline.ingest_course(&doubled, &python_chunks(), IngestMode::SkipExisting).await;
    assert!(matches!(err, Err(RagError::IngestError(_))));

    // Every rejection left storage untouched.
    assert_eq!(pipeline.analytics().await.unwrap().total_courses, 0);
    assert_eq!(pipeline.content().count().await.unwrap(), 0);
}

#[tokio::test]
async fn analytics_lists_titles_sorted() {
    let pipeline = scenario_pipeline().await;

    let analytics = pipeline.analytics().await.unwrap();
    assert_eq!(analytics.total_courses, 2);
    assert_eq!(analytics.course_titles, vec![PYTHON_TITLE, DATA_TITLE]);

    assert_eq!(pipeline.list_courses().await.unwrap(), vec![PYTHON_TITLE, DATA_TITLE]);
}

#[tokio::test]
async fn clear_all_empties_both_collections() {
    let pipeline = scenario_pipeline().await;

    pipeline.clear_all().await.unwrap();

    assert_eq!(pipeline.analytics().await.unwrap().total_courses, 0);
    let results = pipeline.search(QUERY, None, None).await.unwrap();
    assert!(results.is_empty());
    let err = pipeline.search(QUERY, Some("python"), None).await.unwrap_err();
    assert!(matches!(err, RagError::CourseNotFound { .. }));
}

#[tokio::test]
async fn unfiltered_search_spans_all_courses() {
    let pipeline = scenario_pipeline().await;

    let results = pipeline.search(QUERY, None, None).await.unwrap();

    // Six chunks stored, capped at the configured five.
    assert_eq!(results.len(), 5);
    assert_eq!(&results.documents[..3], &[CHUNK_8, CHUNK_15, CHUNK_23]);
    for pair in results.distances.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
}

#[tokio::test]
async fn lesson_filter_without_hint_spans_courses() {
    let pipeline = scenario_pipeline().await;

    let results = pipeline.search(QUERY, None, Some(3)).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(results.metadata.iter().all(|m| m.lesson_number == Some(3)));
}

#[tokio::test(start_paused = true)]
async fn slow_content_search_surfaces_as_timeout() {
    let embedder = scenario_embedder().with_latency(Duration::from_secs(120));
    let config = RagConfig::builder().request_timeout(Duration::from_secs(1)).build().unwrap();
    let pipeline = build_pipeline(embedder, config).await;

    let err = pipeline.search(QUERY, None, None).await.unwrap_err();
    match err {
        RagError::Timeout { operation, limit } => {
            assert_eq!(operation, "content search");
            assert_eq!(limit, Duration::from_secs(1));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn slow_resolution_surfaces_as_timeout() {
    let embedder = scenario_embedder().with_latency(Duration::from_secs(120));
    let config = RagConfig::builder().request_timeout(Duration::from_secs(1)).build().unwrap();
    let pipeline = build_pipeline(embedder, config).await;

    let err = pipeline.search(QUERY, Some("python"), None).await.unwrap_err();
    match err {
        RagError::Timeout { operation, .. } => assert_eq!(operation, "course resolution"),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

mod construction {
    use super::*;

    #[test]
    fn pipeline_builder_requires_all_fields() {
        let err = RagPipeline::builder().build();
        assert!(matches!(err, Err(RagError::ConfigError(_))));

        let err = RagPipeline::builder()
            .config(RagConfig::default())
            .embedding_provider(Arc::new(MockEmbedder::new(DIM)))
            .build();
        assert!(matches!(err, Err(RagError::ConfigError(_))));
    }

    #[test]
    fn config_builder_validates_parameters() {
        assert!(RagConfig::builder().chunk_size(0).build().is_err());
        assert!(RagConfig::builder().chunk_size(100).chunk_overlap(100).build().is_err());
        assert!(RagConfig::builder().max_results(0).build().is_err());
        assert!(RagConfig::builder().request_timeout(Duration::ZERO).build().is_err());

        let config = RagConfig::builder().chunk_size(400).chunk_overlap(50).build().unwrap();
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.resolve_max_distance, None);
    }

    #[test]
    fn default_config_matches_reference_deployment() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
