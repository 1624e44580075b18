use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use serde_json::{Value, json};
use sqlx::any::AnyPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use btc_tracker::api::{ApiServer, ApiState};
use btc_tracker::db::schema;
use btc_tracker::price::{
    PriceRepository, SqlxPriceRepository, SqlxSummaryRepository, SummaryRepository,
};

struct Harness {
    router: Router,
    prices: Arc<SqlxPriceRepository>,
    summaries: Arc<SqlxSummaryRepository>,
}

async fn harness() -> Harness {
    sqlx::any::install_default_drivers();

    let conn_str = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
    let pool = AnyPoolOptions::new()
        .max_connections(5)
        .connect(&conn_str)
        .await
        .unwrap();
    schema::migrate(&pool).await.unwrap();

    let prices = Arc::new(SqlxPriceRepository::new(pool.clone()));
    let summaries = Arc::new(SqlxSummaryRepository::new(pool));

    let state = ApiState {
        prices: prices.clone(),
        summaries: summaries.clone(),
    };
    let router = ApiServer::new(state, vec!["http://localhost:5173".into()]).router();

    Harness {
        router,
        prices,
        summaries,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let res = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn latest_price_is_404_before_first_sample() {
    let h = harness().await;

    let (status, body) = get(&h.router, "/prices/latest").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "No prices found" }));
}

#[tokio::test]
async fn latest_price_renders_timestamp_to_the_second() {
    let h = harness().await;
    let ts = day(2025, 4, 6).and_hms_milli_opt(14, 3, 9, 750).unwrap().and_utc();
    let sample = h.prices.insert(83_512.25, ts).await.unwrap();

    let (status, body) = get(&h.router, "/prices/latest").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "id": sample.id,
            "price": 83_512.25,
            "timestamp": "2025-04-06 14:03:09",
        })
    );
}

#[tokio::test]
async fn summary_for_stored_day() {
    let h = harness().await;
    h.summaries.upsert_widen(80_000.0, day(2025, 4, 6)).await.unwrap();
    h.summaries.upsert_widen(84_000.0, day(2025, 4, 6)).await.unwrap();

    let (status, body) = get(&h.router, "/prices/summary/2025-04-06").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2025-04-06");
    assert_eq!(body["min_price"], 80_000.0);
    assert_eq!(body["max_price"], 84_000.0);
    assert_ne!(body["id"], 0);
}

#[tokio::test]
async fn summary_for_unknown_day_is_a_zero_placeholder() {
    let h = harness().await;

    let (status, body) = get(&h.router, "/prices/summary/2024-02-29").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": 0, "max_price": 0.0, "min_price": 0.0, "date": "2024-02-29" })
    );
}

#[tokio::test]
async fn summary_with_malformed_date_is_400() {
    let h = harness().await;

    for bad in ["06-04-2025", "2025-13-01", "yesterday"] {
        let (status, body) = get(&h.router, &format!("/prices/summary/{bad}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert!(body["detail"].as_str().unwrap().contains(bad));
    }
}

#[tokio::test]
async fn summaries_listing_is_404_when_empty() {
    let h = harness().await;

    let (status, body) = get(&h.router, "/prices/summaries").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "No summaries found!" }));
}

#[tokio::test]
async fn summaries_listing_is_ordered_by_day() {
    let h = harness().await;
    h.summaries.upsert_widen(2.0, day(2025, 4, 7)).await.unwrap();
    h.summaries.upsert_widen(1.0, day(2025, 4, 6)).await.unwrap();

    let (status, body) = get(&h.router, "/prices/summaries").await;

    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2025-04-06", "2025-04-07"]);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let h = harness().await;

    let res = h
        .router
        .clone()
        .oneshot(Request::builder().uri("/prices").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
