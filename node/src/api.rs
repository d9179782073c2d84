//! # REST API
//!
//! Builds the axum router that exposes the receipt ledger over HTTP. All
//! endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                                         | Description                  |
//! |--------|----------------------------------------------|------------------------------|
//! | GET    | `/health`                                    | Liveness probe               |
//! | GET    | `/status`                                    | Version and receipt count    |
//! | POST   | `/receipts`                                  | Record a purchase            |
//! | GET    | `/receipts?limit=&customerId=&purchaseDate=` | One page of receipts         |
//! | GET    | `/receipts/:customer_id/:purchase_date`      | Receipt by primary key       |
//! | GET    | `/sales?from=&to=`                           | Sales total over a date range|
//!
//! Listing follows the ledger's contract: one store request per call. The
//! response's `lastEvaluatedKey` goes back in as `customerId` and
//! `purchaseDate` to fetch the next page.

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use scoop_ledger::codec::timestamp;
use scoop_ledger::config::MAX_PAGE_LIMIT;
use scoop_ledger::{
    PurchasedItem, ReceiptCursor, ReceiptError, ReceiptResult, ReceiptStore, SledTable,
};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: the store wraps reference-counted sled handles.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// Receipt persistence and queries.
    pub store: ReceiptStore<SledTable>,
    /// Page size for `GET /receipts` requests that name none.
    pub default_page_size: usize,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
///
/// The returned router is ready to be served on the configured RPC port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/receipts", get(list_receipts_handler).post(create_receipt_handler))
        .route("/receipts/:customer_id/:purchase_date", get(receipt_handler))
        .route("/sales", get(sales_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request & Response Types
// ---------------------------------------------------------------------------

/// Body of `POST /receipts`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptRequest {
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<PurchasedItem>,
}

/// Query string of `GET /receipts`. The two cursor fields travel together.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub customer_id: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
}

/// Query string of `GET /sales`.
#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Response payload for `GET /sales`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SalesResponse {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Exact decimal sum, serialized as a string.
    pub total: Decimal,
}

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Receipts currently stored.
    pub receipt_count: usize,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a ledger error to a response. Caller mistakes are 400; anything that
/// went wrong inside the store or its records is 500 and counted.
fn ledger_error(state: &AppState, err: ReceiptError) -> Response {
    if err.is_caller_error() {
        return error_response(StatusCode::BAD_REQUEST, err.to_string());
    }
    state.metrics.store_errors_total.inc();
    tracing::error!(error = %err, "receipt store failure");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("store error: {}", err),
    )
}

/// Run a store operation on the blocking pool.
///
/// sled calls block the calling thread, and a range sum walks the whole
/// table, so no handler touches the store from a runtime worker.
async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(ReceiptStore<SledTable>) -> ReceiptResult<T> + Send + 'static,
{
    let store = state.store.clone();
    match tokio::task::spawn_blocking(move || op(store)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ledger_error(state, e)),
        Err(e) => {
            state.metrics.store_errors_total.inc();
            tracing::error!("store task failed: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store task aborted",
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the node is alive.
///
/// Does not touch the store; that belongs in `/status`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` — version and receipt count.
///
/// Counting walks the sled tree, so it goes through the blocking pool too.
async fn status_handler(State(state): State<AppState>) -> Response {
    let receipt_count = match with_store(&state, |store| Ok(store.receipt_count())).await {
        Ok(count) => count,
        Err(response) => return response,
    };

    Json(StatusResponse {
        version: state.version.clone(),
        receipt_count,
        timestamp: Utc::now().to_rfc3339(),
    })
    .into_response()
}

/// `POST /receipts` — record a purchase, stamped with the node's clock.
async fn create_receipt_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateReceiptRequest>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();

    let created = with_store(&state, move |store| {
        store.create_receipt(&req.customer_id, req.items)
    })
    .await;

    match created {
        Ok(receipt) => {
            state.metrics.receipts_created_total.inc();
            (StatusCode::CREATED, Json(receipt)).into_response()
        }
        Err(response) => response,
    }
}

/// `GET /receipts` — one page of receipts.
///
/// `limit` defaults to the node's page size and may not exceed
/// [`MAX_PAGE_LIMIT`]. A page may come back shorter than `limit` while
/// `lastEvaluatedKey` is still set; only its absence means the end.
async fn list_receipts_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();

    let limit = query.limit.unwrap_or(state.default_page_size);
    if limit > MAX_PAGE_LIMIT {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("limit {} exceeds maximum of {}", limit, MAX_PAGE_LIMIT),
        );
    }

    let cursor = match (query.customer_id, query.purchase_date) {
        (Some(customer_id), Some(purchase_date)) => {
            Some(ReceiptCursor::new(customer_id, purchase_date))
        }
        (None, None) => None,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "customerId and purchaseDate must be given together",
            )
        }
    };

    let page = with_store(&state, move |store| {
        store.get_receipts_paginated(limit, cursor.as_ref())
    })
    .await;

    match page {
        Ok(page) => {
            state.metrics.receipt_pages_served_total.inc();
            Json(page).into_response()
        }
        Err(response) => response,
    }
}

/// `GET /receipts/:customer_id/:purchase_date` — receipt by primary key.
async fn receipt_handler(
    Path((customer_id, purchase_date)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();

    let purchase_date = match timestamp::from_text(&purchase_date) {
        Ok(date) => date,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let cursor = ReceiptCursor::new(customer_id, purchase_date);
    let lookup = cursor.clone();
    match with_store(&state, move |store| store.get_receipt(&lookup)).await {
        Ok(Some(receipt)) => Json(receipt).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!(
                "receipt not found: {} at {}",
                cursor.customer_id, cursor.purchase_date
            ),
        ),
        Err(response) => response,
    }
}

/// `GET /sales?from=&to=` — total sales in `[from, to]`.
///
/// Bounds outside the years 0000-9999 are clamped by the store, so a far
/// future `to` works as an open upper end.
async fn sales_handler(State(state): State<AppState>, Query(query): Query<SalesQuery>) -> Response {
    let _timer = state.metrics.request_latency_seconds.start_timer();

    let (from, to) = (query.from, query.to);
    match with_store(&state, move |store| store.get_sales_between_dates(from, to)).await {
        Ok(total) => {
            state.metrics.sales_queries_total.inc();
            Json(SalesResponse { from, to, total }).into_response()
        }
        Err(response) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, TimeZone};
    use http_body_util::BodyExt;
    use scoop_ledger::{receipt_key_schema, LedgerConfig, ManualClock, Receipt, ReceiptPage};
    use std::str::FromStr;
    use std::sync::Arc;
    use tower::ServiceExt;

    // -- Helpers --------------------------------------------------------------

    fn opening() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    /// Creates a test AppState backed by a temporary database and a clock
    /// the test controls.
    fn test_app_state() -> (AppState, Arc<ManualClock>) {
        let table = SledTable::open_temporary(receipt_key_schema(), &LedgerConfig::default())
            .expect("temp table");
        let clock = Arc::new(ManualClock::new(opening()));
        let metrics = Arc::new(crate::metrics::NodeMetrics::new().expect("metrics"));
        let state = AppState {
            version: "0.1.0-test".into(),
            store: ReceiptStore::with_clock(table, clock.clone()),
            default_page_size: 2,
            metrics,
        };
        (state, clock)
    }

    /// Sends a GET request and returns the (status, body_bytes).
    async fn get(router: &Router, path: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, body)
    }

    /// Sends a POST request with JSON body and returns (status, body_bytes).
    async fn post_json(
        router: &Router,
        path: &str,
        body: serde_json::Value,
    ) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, body)
    }

    fn seed(state: &AppState, clock: &ManualClock, count: i64) {
        for i in 0..count {
            clock.set(opening() + Duration::minutes(i));
            state
                .store
                .create_receipt(
                    "alice",
                    vec![PurchasedItem::new("Cone", Decimal::from_str("2.50").unwrap())],
                )
                .unwrap();
        }
    }

    // -- Health & status ------------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let (state, _) = test_app_state();
        let router = create_router(state);

        let (status, body) = get(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn status_reports_receipt_count() {
        let (state, clock) = test_app_state();
        seed(&state, &clock, 3);
        let router = create_router(state);

        let (status, body) = get(&router, "/status").await;
        assert_eq!(status, StatusCode::OK);
        let resp: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.receipt_count, 3);
        assert_eq!(resp.version, "0.1.0-test");
    }

    // -- Create ---------------------------------------------------------------

    #[tokio::test]
    async fn create_receipt_returns_exact_total() {
        let (state, _) = test_app_state();
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let (status, body) = post_json(
            &router,
            "/receipts",
            serde_json::json!({
                "customerId": "alice",
                "items": [
                    { "name": "Cone", "price": "2.50", "flavors": ["mint"] },
                    { "name": "Sundae", "price": "3.75", "toppings": ["fudge"] }
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let receipt: Receipt = serde_json::from_slice(&body).unwrap();
        assert_eq!(receipt.sales_total.to_string(), "6.25");
        assert_eq!(receipt.purchase_date, opening());
        assert_eq!(receipt.items[0].flavors, vec!["mint".to_string()]);
        assert_eq!(metrics.receipts_created_total.get(), 1);
    }

    #[tokio::test]
    async fn create_receipt_without_items_totals_zero() {
        let (state, _) = test_app_state();
        let router = create_router(state);

        let (status, body) =
            post_json(&router, "/receipts", serde_json::json!({ "customerId": "bob" })).await;
        assert_eq!(status, StatusCode::CREATED);
        let receipt: Receipt = serde_json::from_slice(&body).unwrap();
        assert!(receipt.sales_total.is_zero());
        assert!(receipt.items.is_empty());
    }

    #[tokio::test]
    async fn create_receipt_rejects_bad_input() {
        let (state, _) = test_app_state();
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let (status, body) =
            post_json(&router, "/receipts", serde_json::json!({ "customerId": " " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(err.error.contains("customer id"));

        let (status, _) = post_json(
            &router,
            "/receipts",
            serde_json::json!({
                "customerId": "alice",
                "items": [{ "name": "Refund", "price": "-1.00" }]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(metrics.store_errors_total.get(), 0);
        assert_eq!(metrics.receipts_created_total.get(), 0);
    }

    // -- Listing --------------------------------------------------------------

    #[tokio::test]
    async fn listing_pages_through_with_cursor() {
        let (state, clock) = test_app_state();
        seed(&state, &clock, 3);
        let router = create_router(state);

        // Default page size is 2 in tests.
        let (status, body) = get(&router, "/receipts").await;
        assert_eq!(status, StatusCode::OK);
        let first: ReceiptPage = serde_json::from_slice(&body).unwrap();
        assert_eq!(first.len(), 2);
        let cursor = first.last_evaluated_key.clone().expect("more pages");

        let path = format!(
            "/receipts?limit=2&customerId={}&purchaseDate={}",
            cursor.customer_id,
            timestamp::to_text(&cursor.purchase_date).unwrap()
        );
        let (status, body) = get(&router, &path).await;
        assert_eq!(status, StatusCode::OK);
        let second: ReceiptPage = serde_json::from_slice(&body).unwrap();
        assert_eq!(second.len(), 1);
        assert!(second.last_evaluated_key.is_none());
        assert!(second.receipts[0].purchase_date > cursor.purchase_date);
    }

    #[tokio::test]
    async fn listing_rejects_bad_limits_and_half_cursors() {
        let (state, _) = test_app_state();
        let router = create_router(state);

        let (status, _) = get(&router, "/receipts?limit=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&router, &format!("/receipts?limit={}", MAX_PAGE_LIMIT + 1)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(&router, "/receipts?customerId=alice").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(err.error.contains("together"));
    }

    // -- Point lookup ---------------------------------------------------------

    #[tokio::test]
    async fn receipt_lookup_by_key() {
        let (state, clock) = test_app_state();
        seed(&state, &clock, 1);
        let router = create_router(state);

        let date = timestamp::to_text(&opening()).unwrap();
        let (status, body) = get(&router, &format!("/receipts/alice/{}", date)).await;
        assert_eq!(status, StatusCode::OK);
        let receipt: Receipt = serde_json::from_slice(&body).unwrap();
        assert_eq!(receipt.customer_id, "alice");

        let (status, _) = get(&router, &format!("/receipts/bob/{}", date)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(&router, "/receipts/alice/yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // -- Sales ----------------------------------------------------------------

    #[tokio::test]
    async fn sales_sums_inclusive_range() {
        let (state, clock) = test_app_state();
        seed(&state, &clock, 4);
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let from = timestamp::to_text(&(opening() + Duration::minutes(1))).unwrap();
        let to = timestamp::to_text(&(opening() + Duration::minutes(2))).unwrap();
        let (status, body) = get(&router, &format!("/sales?from={}&to={}", from, to)).await;
        assert_eq!(status, StatusCode::OK);

        let resp: SalesResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.total, Decimal::from_str("5.00").unwrap());
        assert_eq!(metrics.sales_queries_total.get(), 1);
    }

    // -- Store-side failures --------------------------------------------------

    fn put_raw(state: &AppState, customer: &str, date: &str, total: Decimal) {
        use scoop_ledger::config::{
            ATTR_CUSTOMER_ID, ATTR_ITEMS, ATTR_PURCHASE_DATE, ATTR_SALES_TOTAL,
        };
        use scoop_ledger::table::{AttributeValue, Item};
        use scoop_ledger::Table;

        let mut item = Item::new();
        item.insert(ATTR_CUSTOMER_ID.to_string(), AttributeValue::string(customer));
        item.insert(ATTR_PURCHASE_DATE.to_string(), AttributeValue::string(date));
        item.insert(ATTR_SALES_TOTAL.to_string(), AttributeValue::number(total));
        item.insert(ATTR_ITEMS.to_string(), AttributeValue::string("[]"));
        state.store.table().put(item).unwrap();
    }

    #[tokio::test]
    async fn corrupt_stored_date_is_a_server_error() {
        let (state, _) = test_app_state();
        put_raw(&state, "alice", "not a date", Decimal::ONE);
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let (status, _) = get(&router, "/receipts").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(metrics.store_errors_total.get(), 1);
    }

    #[tokio::test]
    async fn overflowing_stored_totals_are_a_server_error() {
        let (state, _) = test_app_state();
        for (customer, minute) in [("alice", 0), ("bob", 1)] {
            let date = timestamp::to_text(&(opening() + Duration::minutes(minute))).unwrap();
            put_raw(&state, customer, &date, Decimal::MAX);
        }
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let from = timestamp::to_text(&opening()).unwrap();
        let to = timestamp::to_text(&(opening() + Duration::minutes(1))).unwrap();
        let (status, _) = get(&router, &format!("/sales?from={}&to={}", from, to)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(metrics.store_errors_total.get(), 1);
        assert_eq!(metrics.sales_queries_total.get(), 0);
    }

    #[tokio::test]
    async fn empty_cursor_customer_is_a_bad_request() {
        let (state, clock) = test_app_state();
        seed(&state, &clock, 1);
        let metrics = state.metrics.clone();
        let router = create_router(state);

        let date = timestamp::to_text(&opening()).unwrap();
        let (status, _) = get(&router, &format!("/receipts?customerId=&purchaseDate={}", date)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(metrics.store_errors_total.get(), 0);
    }

    #[tokio::test]
    async fn sales_requires_both_bounds() {
        let (state, _) = test_app_state();
        let router = create_router(state);

        let (status, _) = get(&router, "/sales?from=2026-06-01T00:00:00Z").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
