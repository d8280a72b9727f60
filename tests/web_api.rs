// Router tests for the JSON API (feature `web`).
//
// Requests go straight through the axum Router via tower's oneshot; no
// socket is bound.

#![cfg(feature = "web")]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use plotline::clustering::model::ClusterSettings;
use plotline::dataset::Document;
use plotline::web::{build_router, AppState};

fn corpus() -> Vec<Document> {
    vec![
        Document::new("Star Drift", "An astronaut repairs a rocket in orbit around a distant planet"),
        Document::new("Red Giant", "A rocket crew explores the galaxy searching for a habitable planet"),
        Document::new("Deep Orbit", "A stranded astronaut signals from orbit as the galaxy burns"),
        Document::new("Pasta Wars", "A chef battles rivals in a kitchen over garlic pasta"),
        Document::new("Sauce Boss", "A chef perfects a secret garlic sauce recipe"),
        Document::new("Kitchen Nights", "The kitchen staff cook pasta sauce for a famous chef"),
        Document::new("Vault", "A crew of thieves plans a bank heist to crack the vault"),
        Document::new("Inside Job", "Thieves recruit a hacker for a casino heist"),
    ]
}

fn state() -> AppState {
    let settings = ClusterSettings {
        n_init: 3,
        ..ClusterSettings::default()
    };
    AppState::new(corpus(), settings, 5)
}

async fn json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn classify_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/classify")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = build_router(state());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stats_reports_documents_and_categories() {
    let app = build_router(state());
    let response = app
        .oneshot(Request::builder().uri("/api/stats?k=5").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["documents"], 8);
    assert_eq!(body["categories"], 5);
}

#[tokio::test]
async fn categories_lists_cards() {
    let app = build_router(state());
    let response = app
        .oneshot(Request::builder().uri("/api/categories").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    let cards = body["categories"].as_array().unwrap();
    assert_eq!(cards.len(), 5);
    assert!(cards.iter().all(|c| c["examples"].as_array().unwrap().len() <= 3));
}

#[tokio::test]
async fn map_has_a_point_per_document() {
    let app = build_router(state());
    let response = app
        .oneshot(Request::builder().uri("/api/map?k=5").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    let points = body["points"].as_array().unwrap();
    assert_eq!(points.len(), 8);
    assert!(points[0]["x"].is_number() && points[0]["cluster_id"].is_number());
}

#[tokio::test]
async fn k_out_of_range_is_bad_request() {
    let app = build_router(state());
    let response = app
        .oneshot(Request::builder().uri("/api/stats?k=30").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn classify_empty_text_is_bad_request() {
    let app = build_router(state());
    let response = app
        .oneshot(classify_request(serde_json::json!({ "text": "   ", "k": 5 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn classify_returns_cluster_keywords_and_examples() {
    let app = build_router(state());
    let response = app
        .oneshot(classify_request(
            serde_json::json!({ "text": "A chef cooks garlic pasta", "k": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert!(body["cluster_id"].as_u64().unwrap() < 5);
    assert_eq!(body["keywords"].as_array().unwrap().len(), 10);
    assert!(body["examples"].as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn models_are_cached_per_k() {
    let state = state();
    let app = build_router(state.clone());
    let response = app
        .oneshot(Request::builder().uri("/api/stats?k=6").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(state.cache.read().await.contains(6));
}
