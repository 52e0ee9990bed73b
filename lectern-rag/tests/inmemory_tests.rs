//! Property tests for in-memory vector store filtering and search ordering.

use lectern_rag::course::ChunkMetadata;
use lectern_rag::inmemory::InMemoryVectorStore;
use lectern_rag::vectorstore::{ChunkFilter, Payload, VectorRecord, VectorStore};
use proptest::prelude::*;

const TITLES: [&str; 3] = ["Rust Basics", "Advanced Python Programming", "Data Engineering"];

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate the payload ingredients of a chunk record: a course title index,
/// an optional lesson number, and a normalized embedding.
fn arb_chunk_parts(dim: usize) -> impl Strategy<Value = (usize, Option<u32>, Vec<f32>)> {
    (0usize..TITLES.len(), proptest::option::of(1u32..4), arb_normalized_embedding(dim))
}

/// Build chunk records with unique ids from generated parts.
fn chunk_records(parts: &[(usize, Option<u32>, Vec<f32>)]) -> Vec<VectorRecord> {
    parts
        .iter()
        .enumerate()
        .map(|(i, (title_idx, lesson, embedding))| VectorRecord {
            id: format!("rec_{i}"),
            text: format!("chunk text {i}"),
            embedding: embedding.clone(),
            payload: Payload::Chunk(ChunkMetadata {
                course_title: TITLES[*title_idx].to_string(),
                lesson_number: *lesson,
                chunk_index: i,
            }),
        })
        .collect()
}

/// **Property: filter restricts the candidate set before ranking.**
/// *For any* stored chunk set, filter, and query, every returned record
/// SHALL satisfy the filter, and the result count SHALL equal
/// `min(top_k, matching records)`. A rank-then-filter implementation would
/// return fewer hits whenever near-but-non-matching records crowd the top.
mod prop_filter_before_rank {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn filtered_results_satisfy_filter_and_fill_top_k(
            parts in proptest::collection::vec(arb_chunk_parts(DIM), 1..24),
            query in arb_normalized_embedding(DIM),
            title_idx in 0usize..TITLES.len(),
            lesson in proptest::option::of(1u32..4),
            top_k in 1usize..8,
        ) {
            let records = chunk_records(&parts);
            let filter = ChunkFilter::build(Some(TITLES[title_idx].to_string()), lesson).unwrap();
            let matching = records.iter().filter(|r| filter.matches_record(r)).count();

            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();
                store.upsert("test", &records).await.unwrap();
                store.search("test", &query, Some(&filter), top_k).await.unwrap()
            });

            prop_assert_eq!(results.len(), matching.min(top_k));
            for hit in &results {
                let metadata = hit.record.payload.as_chunk().expect("chunk payload");
                prop_assert!(filter.matches(metadata), "hit violates filter: {:?}", metadata);
            }
        }
    }
}

/// **Property: search ordering.**
/// *For any* stored chunk set and query, results SHALL be ordered by
/// non-decreasing distance and bounded by `top_k`.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_ascending_and_bounded_by_top_k(
            parts in proptest::collection::vec(arb_chunk_parts(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let records = chunk_records(&parts);
            let stored = records.len();

            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test", DIM).await.unwrap();
                store.upsert("test", &records).await.unwrap();
                store.search("test", &query, None, top_k).await.unwrap()
            });

            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= stored);

            for window in results.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
        }
    }
}

/// Plain behavior checks for the store operations the pipeline leans on.
mod store_behavior {
    use super::*;

    const DIM: usize = 4;

    fn record(id: &str, title: &str, lesson: Option<u32>, index: usize) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            text: format!("text for {id}"),
            embedding: vec![1.0, 0.0, 0.0, 0.0],
            payload: Payload::Chunk(ChunkMetadata {
                course_title: title.to_string(),
                lesson_number: lesson,
                chunk_index: index,
            }),
        }
    }

    #[tokio::test]
    async fn operations_on_missing_collections_fail() {
        let store = InMemoryVectorStore::new();
        assert!(store.upsert("nope", &[]).await.is_err());
        assert!(store.search("nope", &[1.0], None, 1).await.is_err());
        assert!(store.list_ids("nope").await.is_err());
        assert!(store.fetch("nope", "x").await.is_err());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let store = InMemoryVectorStore::new();
        store.create_collection("c", DIM).await.unwrap();

        store.upsert("c", &[record("a", "Rust Basics", Some(1), 0)]).await.unwrap();
        store.upsert("c", &[record("a", "Rust Basics", Some(2), 0)]).await.unwrap();

        assert_eq!(store.list_ids("c").await.unwrap(), vec!["a".to_string()]);
        let fetched = store.fetch("c", "a").await.unwrap().unwrap();
        assert_eq!(fetched.payload.as_chunk().unwrap().lesson_number, Some(2));
    }

    #[tokio::test]
    async fn delete_where_removes_only_matching_chunks() {
        let store = InMemoryVectorStore::new();
        store.create_collection("c", DIM).await.unwrap();
        store
            .upsert(
                "c",
                &[
                    record("a", "Rust Basics", Some(1), 0),
                    record("b", "Rust Basics", Some(2), 1),
                    record("c", "Data Engineering", Some(1), 0),
                ],
            )
            .await
            .unwrap();

        let removed = store.delete_where("c", &ChunkFilter::for_course("Rust Basics")).await.unwrap();
        assert_eq!(removed, 2);

        let mut remaining = store.list_ids("c").await.unwrap();
        remaining.sort();
        assert_eq!(remaining, vec!["c".to_string()]);
    }
}
