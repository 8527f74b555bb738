use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, Response, StatusCode, header},
};
use riserva::application::engine::{EngineCatalog, QueryEngine};
use riserva::application::selection::SelectionService;
use riserva::application::stats::StatsService;
use riserva::application::stores::OptionsStore;
use riserva::cache::{CacheConfig, MemoryTransientStore, TransientStore};
use riserva::domain::query::{KindSpec, QueryDescriptor};
use riserva::domain::selection::SelectionSets;
use riserva::infra::engine::MemoryQueryEngine;
use riserva::infra::http::{AdminState, build_admin_router};
use riserva::infra::options::MemoryOptionsStore;
use serde_json::json;
use time::OffsetDateTime;
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "test-admin-token";
const TTL: Duration = Duration::from_secs(3600);

struct Harness {
    router: axum::Router,
    state: AdminState,
    selections: Arc<SelectionService>,
    stats: Arc<StatsService>,
    store: Arc<dyn TransientStore>,
}

async fn harness() -> Harness {
    let options: Arc<dyn OptionsStore> = Arc::new(MemoryOptionsStore::new());
    let store: Arc<dyn TransientStore> = Arc::new(MemoryTransientStore::new());
    let engine: Arc<dyn QueryEngine> = Arc::new(MemoryQueryEngine::new(EngineCatalog {
        kinds: vec!["products".to_string(), "events".to_string()],
        taxonomies: vec!["region".to_string()],
        listings: vec!["featured".to_string()],
    }));
    let selections = Arc::new(SelectionService::new(Arc::clone(&options)));
    let stats = Arc::new(StatsService::new(Arc::clone(&options), 50));

    let state = AdminState::new(
        CacheConfig::default(),
        Arc::clone(&store),
        Arc::clone(&selections),
        Arc::clone(&stats),
        engine,
        ADMIN_TOKEN,
    );

    Harness {
        router: build_admin_router(state.clone()),
        state,
        selections,
        stats,
        store,
    }
}

async fn send(
    router: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    form_body: Option<String>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match form_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body)),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn descriptor(kind: &str) -> QueryDescriptor {
    QueryDescriptor {
        kind: Some(KindSpec::One(kind.to_string())),
        taxonomies: vec![],
        listing: None,
        params: Default::default(),
        admin_context: false,
    }
}

#[tokio::test]
async fn requests_without_the_token_are_denied() {
    let h = harness().await;
    let response = send(&h.router, Method::GET, "/", None, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&h.router, Method::GET, "/", Some("wrong-token"), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cookie_token_grants_access() {
    let h = harness().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .header(header::COOKIE, format!("riserva_admin={ADMIN_TOKEN}"))
        .body(Body::empty())
        .expect("request should build");
    let response = h
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn overview_renders_catalog_and_statistics() {
    let h = harness().await;
    h.selections
        .save(
            SelectionSets {
                kinds: vec!["products".to_string()],
                taxonomies: vec![],
                listings: vec![],
            },
            &h.state.engine.catalog().await.expect("catalog"),
        )
        .await
        .expect("save selections");
    h.stats.record_query().await.expect("record");
    h.stats.record_query().await.expect("record");
    h.stats.record_hit().await.expect("record");
    h.store
        .set("riserva:q:kind=products:0000000000000001", vec![json!(1)], TTL)
        .await
        .expect("set");

    let response = send(&h.router, Method::GET, "/", Some(ADMIN_TOKEN), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains("products"));
    assert!(html.contains("events"));
    assert!(html.contains("region"));
    assert!(html.contains("featured"));
    assert!(html.contains("50.0%"));
    assert!(html.contains(h.state.forgery_token.as_ref()));
}

#[tokio::test]
async fn settings_update_requires_the_forgery_token() {
    let h = harness().await;
    let response = send(
        &h.router,
        Method::POST,
        "/settings",
        Some(ADMIN_TOKEN),
        Some("forgery_token=wrong&kinds=products".to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(h.selections.load().await.expect("load").is_empty());
}

#[tokio::test]
async fn settings_update_persists_sanitized_selections() {
    let h = harness().await;
    let body = format!(
        "forgery_token={}&kinds=products&kinds=bogus&taxonomies=region",
        h.state.forgery_token
    );
    let response = send(
        &h.router,
        Method::POST,
        "/settings",
        Some(ADMIN_TOKEN),
        Some(body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/?settings_saved=1")
    );

    let sets = h.selections.load().await.expect("load");
    assert_eq!(sets.kinds, vec!["products".to_string()]);
    assert_eq!(sets.taxonomies, vec!["region".to_string()]);
    assert!(sets.listings.is_empty());
}

#[tokio::test]
async fn clear_cache_requires_the_forgery_token() {
    let h = harness().await;
    h.stats.record_query().await.expect("record");
    h.store
        .set("riserva:q:kind=products:0000000000000001", vec![json!(1)], TTL)
        .await
        .expect("set");

    let response = send(
        &h.router,
        Method::POST,
        "/cache/clear",
        Some(ADMIN_TOKEN),
        Some("forgery_token=wrong".to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Denied requests leave counters and entries untouched.
    assert_eq!(h.stats.summary().await.expect("summary").total_queries, 1);
    assert_eq!(
        h.store
            .count_prefix("riserva:q:kind=products:")
            .await
            .expect("count"),
        1
    );
}

#[tokio::test]
async fn clear_cache_removes_selected_entries_and_resets_statistics() {
    let h = harness().await;
    h.selections
        .save(
            SelectionSets {
                kinds: vec!["products".to_string()],
                taxonomies: vec![],
                listings: vec![],
            },
            &h.state.engine.catalog().await.expect("catalog"),
        )
        .await
        .expect("save selections");

    h.stats.record_query().await.expect("record");
    h.stats.record_hit().await.expect("record");
    h.stats.log_uncached(&descriptor("products")).await.expect("log");
    h.store
        .set("riserva:q:kind=products:0000000000000001", vec![json!(1)], TTL)
        .await
        .expect("set");
    h.store
        .set("riserva:q:kind=any:0000000000000002", vec![json!(2)], TTL)
        .await
        .expect("set");

    let before = OffsetDateTime::now_utc();
    let body = format!("forgery_token={}", h.state.forgery_token);
    let response = send(
        &h.router,
        Method::POST,
        "/cache/clear",
        Some(ADMIN_TOKEN),
        Some(body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/?cache_cleared=1")
    );

    assert_eq!(
        h.store
            .count_prefix("riserva:q:")
            .await
            .expect("count"),
        0
    );

    let summary = h.stats.summary().await.expect("summary");
    assert_eq!(summary.total_queries, 0);
    assert_eq!(summary.cache_hits, 0);
    assert!(summary.last_cleared.expect("cleared stamp") >= before - Duration::from_secs(1));
    assert!(h.stats.uncached_log().await.expect("log").is_empty());
}

#[tokio::test]
async fn overview_shows_success_notices() {
    let h = harness().await;

    let response = send(
        &h.router,
        Method::GET,
        "/?settings_saved=1",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert!(body_text(response).await.contains("Settings saved."));

    let response = send(
        &h.router,
        Method::GET,
        "/?cache_cleared=1",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert!(body_text(response).await.contains("Cache cleared."));
}
