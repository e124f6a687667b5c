//! Tests for the SQLite document store
//!
//! Runs against a migrated database in a temporary directory, both directly
//! and through the search service.

use std::sync::Arc;

use tempfile::TempDir;

use super::{DocumentStore, RankWeights, SqliteDocumentStore, StoreError};
use crate::core::config::SearchConfig;
use crate::core::types::NewDocument;
use crate::db::{open_database, DatabaseConfig};
use crate::search::{IndexBuilder, MatchExpression, SearchService, Segmenter, WeightedTokenVector};

async fn setup_store() -> (Arc<SqliteDocumentStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig::with_path(temp_dir.path().join("blog.db"));
    let pool = open_database(&config).await.unwrap();
    let store = Arc::new(SqliteDocumentStore::new(pool, RankWeights::default()));
    (store, temp_dir)
}

fn setup_service(store: &Arc<SqliteDocumentStore>) -> SearchService<SqliteDocumentStore> {
    SearchService::new(
        Arc::new(Segmenter::with_default_dictionary()),
        Arc::clone(store),
        SearchConfig::default(),
    )
}

fn vector(title: &str, body: &str) -> WeightedTokenVector {
    WeightedTokenVector {
        title: title.to_string(),
        body: body.to_string(),
    }
}

// ============================================================================
// Store operations
// ============================================================================

#[tokio::test]
async fn test_insert_and_get() {
    let (store, _temp_dir) = setup_store().await;

    let doc = store
        .insert_document(&NewDocument::new("春天的花", "春天来了，花开满山。").with_img_url("/img/1.png"))
        .await
        .unwrap();
    assert_eq!(doc.id, 1);

    let fetched = store.get_document(doc.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "春天的花");
    assert_eq!(fetched.body, "春天来了，花开满山。");
    assert_eq!(fetched.img_url, "/img/1.png");
    assert!(!fetched.is_deleted());

    assert!(store.get_document(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_document() {
    let (store, _temp_dir) = setup_store().await;
    let doc = store.insert_document(&NewDocument::new("旧标题", "旧正文")).await.unwrap();

    let updated = store
        .update_document(doc.id, &NewDocument::new("新标题", "新正文"))
        .await
        .unwrap();
    assert_eq!(updated.title, "新标题");
    assert_eq!(updated.body, "新正文");

    let missing = store.update_document(99, &NewDocument::new("a", "b")).await;
    assert!(matches!(missing, Err(StoreError::NotFound { id: 99 })));
}

#[tokio::test]
async fn test_index_field_overwrites() {
    let (store, _temp_dir) = setup_store().await;
    let doc = store.insert_document(&NewDocument::new("标题", "正文")).await.unwrap();

    store.update_index_field(doc.id, &vector("rust", "tokio")).await.unwrap();
    store.update_index_field(doc.id, &vector("rust", "tokio")).await.unwrap();
    assert_eq!(store.index_value(doc.id).await.unwrap(), Some(vector("rust", "tokio")));

    store.update_index_field(doc.id, &vector("sqlite", "")).await.unwrap();
    assert_eq!(store.index_value(doc.id).await.unwrap(), Some(vector("sqlite", "")));

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM article_tokens")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_index_field_missing_document() {
    let (store, _temp_dir) = setup_store().await;
    let result = store.update_index_field(7, &vector("rust", "")).await;
    assert!(matches!(result, Err(StoreError::NotFound { id: 7 })));
}

#[tokio::test]
async fn test_soft_delete_hides_document() {
    let (store, _temp_dir) = setup_store().await;
    let doc = store.insert_document(&NewDocument::new("标题", "正文")).await.unwrap();
    store.update_index_field(doc.id, &vector("rust", "")).await.unwrap();

    store.soft_delete_document(doc.id).await.unwrap();

    assert!(store.get_document(doc.id).await.unwrap().is_none());
    assert!(store.index_value(doc.id).await.unwrap().is_none());
    assert!(store.list_documents(0, 10).await.unwrap().is_empty());
    assert!(matches!(
        store.soft_delete_document(doc.id).await,
        Err(StoreError::NotFound { .. })
    ));
    assert!(matches!(
        store.update_index_field(doc.id, &vector("rust", "")).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_documents_after_id() {
    let (store, _temp_dir) = setup_store().await;
    for i in 0..5 {
        store
            .insert_document(&NewDocument::new(format!("标题{}", i), "正文"))
            .await
            .unwrap();
    }

    let ids: Vec<u64> = store
        .list_documents(2, 2)
        .await
        .unwrap()
        .iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![3, 4]);

    assert!(store.list_documents(5, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_expression_rejected() {
    let (store, _temp_dir) = setup_store().await;
    let empty = MatchExpression::default();
    assert!(matches!(
        store.count_matching(&empty).await,
        Err(StoreError::EmptyExpression)
    ));
    assert!(matches!(
        store.query_ranked(&empty, 10, 0).await,
        Err(StoreError::EmptyExpression)
    ));
}

#[tokio::test]
async fn test_title_match_outranks_body_match() {
    let (store, _temp_dir) = setup_store().await;
    let body_only = store.insert_document(&NewDocument::new("其他", "正文")).await.unwrap();
    let in_title = store.insert_document(&NewDocument::new("标题", "正文")).await.unwrap();

    store
        .update_index_field(body_only.id, &vector("其他", "rust 并发 模型"))
        .await
        .unwrap();
    store
        .update_index_field(in_title.id, &vector("rust 并发 模型", "其他"))
        .await
        .unwrap();

    let expression = MatchExpression::all_of(["rust"]);
    assert_eq!(store.count_matching(&expression).await.unwrap(), 2);

    let hits = store.query_ranked(&expression, 10, 0).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0.id, in_title.id);
    assert!(hits[0].1 > hits[1].1);
    assert!(hits[1].1 > 0.0);
}

#[tokio::test]
async fn test_conjunction_requires_every_term() {
    let (store, _temp_dir) = setup_store().await;
    let both = store.insert_document(&NewDocument::new("a", "b")).await.unwrap();
    let one = store.insert_document(&NewDocument::new("c", "d")).await.unwrap();
    store.update_index_field(both.id, &vector("rust", "sqlite")).await.unwrap();
    store.update_index_field(one.id, &vector("rust", "postgres")).await.unwrap();

    let expression = MatchExpression::all_of(["rust", "sqlite"]);
    let hits = store.query_ranked(&expression, 10, 0).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.id, both.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_index_writes_to_different_documents() {
    let (store, _temp_dir) = setup_store().await;
    let mut ids = Vec::new();
    for i in 0..40 {
        let doc = store
            .insert_document(&NewDocument::new(format!("标题{}", i), "正文"))
            .await
            .unwrap();
        ids.push(doc.id);
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .update_index_field(id, &vector(&format!("title{}", id), "body"))
                    .await
            })
        })
        .collect();

    let mut failures = Vec::new();
    for handle in handles {
        if let Err(e) = handle.await.unwrap() {
            failures.push(e.to_string());
        }
    }
    assert!(failures.is_empty(), "index writes failed: {:?}", failures);

    for id in ids {
        assert_eq!(
            store.index_value(id).await.unwrap(),
            Some(vector(&format!("title{}", id), "body"))
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_index_writes_to_same_document() {
    let (store, _temp_dir) = setup_store().await;
    let doc = store.insert_document(&NewDocument::new("标题", "正文")).await.unwrap();

    let written: Vec<WeightedTokenVector> = (0..20)
        .map(|i| vector(&format!("title{}", i), &format!("body{}", i)))
        .collect();

    let handles: Vec<_> = written
        .iter()
        .cloned()
        .map(|v| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.update_index_field(doc.id, &v).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = store.index_value(doc.id).await.unwrap().unwrap();
    assert!(written.contains(&stored));

    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM article_tokens WHERE rowid = ?")
        .bind(doc.id as i64)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_hostile_tokens_are_literal() {
    let (store, _temp_dir) = setup_store().await;
    let doc = store.insert_document(&NewDocument::new("a", "b")).await.unwrap();
    store.update_index_field(doc.id, &vector("rust", "")).await.unwrap();

    for hostile in [r#"rust" OR "x"#, "title_tokens:rust", "NEAR(rust", "rust*", "OR"] {
        let expression = MatchExpression::all_of([hostile]);
        assert!(store.count_matching(&expression).await.is_ok(), "{}", hostile);
    }
}

// ============================================================================
// End to end through the search service
// ============================================================================

#[tokio::test]
async fn test_spring_flower_scenario() {
    let (store, _temp_dir) = setup_store().await;
    let service = setup_service(&store);

    let doc = store
        .insert_document(&NewDocument::new("春天的花", "春天来了，花开满山。"))
        .await
        .unwrap();
    assert!(service.after_document_write(doc.id).await);

    let page = service.search("春天的花", 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list.len(), 1);
    let item = &page.list[0];
    assert_eq!(item.id, 1);
    assert_eq!(item.title, "春天的花");
    assert!(item.score > 0.0);
    assert!(item.excerpt.contains('花'));

    // A lone single-character query filters to zero tokens
    let single = service.search("花", 1, 10).await.unwrap();
    assert_eq!(single.total, 0);
    assert!(single.list.is_empty());
}

#[tokio::test]
async fn test_punctuation_query_is_empty_page() {
    let (store, _temp_dir) = setup_store().await;
    let service = setup_service(&store);
    let doc = store.insert_document(&NewDocument::new("春天的花", "春天来了")).await.unwrap();
    service.index_document(doc.id).await.unwrap();

    let page = service.search("，", 1, 10).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(page.list.is_empty());
    assert_eq!(
        serde_json::to_value(&page).unwrap(),
        serde_json::json!({"total": 0, "list": []})
    );
}

#[tokio::test]
async fn test_pagination_matches_full_ranking() {
    let (store, _temp_dir) = setup_store().await;
    let service = setup_service(&store);

    for i in 0..25 {
        let body = "数据库 ".repeat(i % 5 + 1);
        let doc = store
            .insert_document(&NewDocument::new(format!("数据库笔记{}", i), body))
            .await
            .unwrap();
        service.index_document(doc.id).await.unwrap();
    }

    let all = service.search("数据库", 1, 25).await.unwrap();
    assert_eq!(all.total, 25);
    assert_eq!(all.list.len(), 25);
    for pair in all.list.windows(2) {
        assert!(pair[0].score >= pair[1].score);
        if pair[0].score == pair[1].score {
            assert!(pair[0].id < pair[1].id);
        }
    }

    let second = service.search("数据库", 2, 10).await.unwrap();
    assert_eq!(second.total, 25);
    let expected: Vec<u64> = all.list[10..20].iter().map(|item| item.id).collect();
    let actual: Vec<u64> = second.list.iter().map(|item| item.id).collect();
    assert_eq!(actual, expected);

    let beyond = service.search("数据库", 4, 10).await.unwrap();
    assert_eq!(beyond.total, 25);
    assert!(beyond.list.is_empty());
}

#[tokio::test]
async fn test_soft_deleted_document_leaves_results() {
    let (store, _temp_dir) = setup_store().await;
    let service = setup_service(&store);

    let kept = store.insert_document(&NewDocument::new("春天", "春天来了")).await.unwrap();
    let removed = store.insert_document(&NewDocument::new("春天", "春天又来了")).await.unwrap();
    service.reindex_all().await.unwrap();
    assert_eq!(service.search("春天", 1, 10).await.unwrap().total, 2);

    store.soft_delete_document(removed.id).await.unwrap();
    let page = service.search("春天", 1, 10).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].id, kept.id);
}

#[tokio::test]
async fn test_update_then_reindex_replaces_tokens() {
    let (store, _temp_dir) = setup_store().await;
    let service = setup_service(&store);

    let doc = store.insert_document(&NewDocument::new("春天", "春天来了")).await.unwrap();
    assert!(service.after_document_write(doc.id).await);

    store
        .update_document(doc.id, &NewDocument::new("秋天", "秋天来了"))
        .await
        .unwrap();
    assert!(service.after_document_write(doc.id).await);

    assert_eq!(service.search("春天", 1, 10).await.unwrap().total, 0);
    assert_eq!(service.search("秋天", 1, 10).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_reindex_all_backfills() {
    let (store, _temp_dir) = setup_store().await;
    for i in 0..12 {
        store
            .insert_document(&NewDocument::new(format!("春天{}", i), "花开满山"))
            .await
            .unwrap();
    }
    let builder = IndexBuilder::new(Arc::new(Segmenter::with_default_dictionary()), Arc::clone(&store));

    let first = builder.reindex(0, 5).await.unwrap();
    assert_eq!(first.indexed, 12);
    assert!(first.failed.is_empty());
    assert_eq!(first.watermark, 12);

    let resumed = builder.reindex(first.watermark, 5).await.unwrap();
    assert_eq!(resumed.indexed, 0);
    assert_eq!(resumed.watermark, 12);

    for id in 1..=12 {
        assert!(store.index_value(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_missing_document_index_is_not_fatal() {
    let (store, _temp_dir) = setup_store().await;
    let service = setup_service(&store);
    assert!(!service.after_document_write(404).await);
}
