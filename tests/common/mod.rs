// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: a stub WHOOP server and app construction.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use whoop_trmnl::config::Config;
use whoop_trmnl::db::{KvStore, MemoryKv, TokenStore};
use whoop_trmnl::routes::create_router;
use whoop_trmnl::services::{WhoopClient, WhoopService};
use whoop_trmnl::AppState;

pub const USER_ID: &str = "default-user";

/// Check if emulator is available via environment variable.
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Knobs and recorded traffic of the stub WHOOP API.
#[derive(Default)]
pub struct StubState {
    /// Token endpoint answers 400 invalid_grant.
    pub fail_token: AtomicBool,
    /// Non-zero: every data endpoint answers with this status.
    pub data_status: AtomicU16,
    /// Newest cycle comes without an embedded recovery.
    pub omit_embedded_recovery: AtomicBool,
    /// Sleep collection is empty.
    pub empty_sleep: AtomicBool,
    /// A scored nap precedes the main sleep in the collection.
    pub nap_first: AtomicBool,
    /// Delay before answering data requests.
    pub delay_ms: AtomicU64,

    pub token_calls: AtomicUsize,
    pub recovery_calls: AtomicUsize,
    pub token_forms: Mutex<Vec<HashMap<String, String>>>,
    pub bearer_tokens: Mutex<Vec<String>>,
}

pub struct StubWhoop {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl StubWhoop {
    pub fn token_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    pub fn recovery_calls(&self) -> usize {
        self.state.recovery_calls.load(Ordering::SeqCst)
    }

    pub fn bearer_tokens(&self) -> Vec<String> {
        self.state.bearer_tokens.lock().unwrap().clone()
    }

    pub fn token_forms(&self) -> Vec<HashMap<String, String>> {
        self.state.token_forms.lock().unwrap().clone()
    }
}

/// Start a stub WHOOP API on an ephemeral local port.
pub async fn spawn_stub_whoop() -> StubWhoop {
    let state = Arc::new(StubState::default());

    let app = Router::new()
        .route("/oauth/token", post(stub_token))
        .route("/developer/v2/cycle", get(stub_cycles))
        .route("/developer/v2/cycle/{id}/recovery", get(stub_recovery))
        .route("/developer/v2/activity/sleep", get(stub_sleep))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubWhoop {
        base_url: format!("http://{}", addr),
        state,
    }
}

async fn stub_token(
    State(stub): State<Arc<StubState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = stub.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    stub.token_forms.lock().unwrap().push(form);

    if stub.fail_token.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": format!("access-{}", n),
        "refresh_token": format!("refresh-{}", n),
        "expires_in": 3600,
        "token_type": "bearer",
        "scope": "read:cycles read:recovery read:sleep read:hrv"
    }))
    .into_response()
}

/// Shared behavior of data endpoints; `Some` short-circuits the handler.
async fn data_guard(stub: &StubState, headers: &HeaderMap) -> Option<Response> {
    let delay = stub.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let Some(token) = bearer else {
        return Some(StatusCode::UNAUTHORIZED.into_response());
    };
    stub.bearer_tokens.lock().unwrap().push(token);

    let status = stub.data_status.load(Ordering::SeqCst);
    if status != 0 {
        let status = StatusCode::from_u16(status).unwrap();
        return Some((status, "stub failure").into_response());
    }
    None
}

/// Cycle `i` days back. Cycle 2 is still pending its recovery score.
fn cycle_json(i: i64, with_recovery: bool) -> Value {
    let created = Utc::now() - Duration::days(i);
    let mut cycle = json!({
        "id": 1000 - i,
        "user_id": 10129,
        "created_at": created.to_rfc3339(),
        "updated_at": created.to_rfc3339(),
        "start": (created - Duration::hours(1)).to_rfc3339(),
        "end": null,
        "timezone_offset": "-07:00",
        "score_state": "SCORED",
        "score": { "strain": 5.3, "kilojoule": 8288.3, "average_heart_rate": 68, "max_heart_rate": 141 }
    });

    if with_recovery {
        cycle["recovery"] = if i == 2 {
            json!({
                "cycle_id": 1000 - i,
                "created_at": created.to_rfc3339(),
                "score_state": "PENDING_SCORE"
            })
        } else {
            let score = if i == 0 { 72.0 } else { 50.0 };
            let hrv = 40.0 + 3.0 * i as f64;
            json!({
                "cycle_id": 1000 - i,
                "created_at": created.to_rfc3339(),
                "score_state": "SCORED",
                "score": {
                    "user_calibrating": false,
                    "recovery_score": score,
                    "resting_heart_rate": 52.0,
                    "hrv_rmssd_milli": hrv,
                    "spo2_percentage": 95.6,
                    "skin_temp_celsius": 33.7
                }
            })
        };
    }
    cycle
}

async fn stub_cycles(
    State(stub): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(resp) = data_guard(&stub, &headers).await {
        return resp;
    }

    let limit: i64 = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let omit = stub.omit_embedded_recovery.load(Ordering::SeqCst);
    let records: Vec<Value> = (0..limit)
        .map(|i| cycle_json(i, !(omit && i == 0)))
        .collect();

    Json(json!({ "records": records, "next_token": null })).into_response()
}

async fn stub_recovery(
    State(stub): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Some(resp) = data_guard(&stub, &headers).await {
        return resp;
    }
    stub.recovery_calls.fetch_add(1, Ordering::SeqCst);

    Json(json!({
        "cycle_id": id,
        "sleep_id": "ecfc6a15-4661-442f-a9a4-f160dd7afae8",
        "user_id": 10129,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": Utc::now().to_rfc3339(),
        "score_state": "SCORED",
        "score": {
            "user_calibrating": false,
            "recovery_score": 55.0,
            "resting_heart_rate": 56.0,
            "hrv_rmssd_milli": 47.0
        }
    }))
    .into_response()
}

async fn stub_sleep(
    State(stub): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Some(resp) = data_guard(&stub, &headers).await {
        return resp;
    }

    if stub.empty_sleep.load(Ordering::SeqCst) {
        return Json(json!({ "records": [] })).into_response();
    }

    let end = Utc::now() - Duration::hours(2);
    let mut records = vec![json!({
        "id": "ecfc6a15-4661-442f-a9a4-f160dd7afae8",
        "user_id": 10129,
        "start": (end - Duration::hours(8)).to_rfc3339(),
        "end": end.to_rfc3339(),
        "nap": false,
        "score_state": "SCORED",
        "score": {
            "stage_summary": {
                "total_in_bed_time_milli": 27_000_000,
                "total_awake_time_milli": 1_800_000,
                "total_light_sleep_time_milli": 14_400_000,
                "total_slow_wave_sleep_time_milli": 5_400_000,
                "total_rem_sleep_time_milli": 5_400_000,
                "sleep_cycle_count": 4,
                "disturbance_count": 9
            },
            "sleep_needed": {
                "baseline_milli": 28_800_000,
                "need_from_sleep_debt_milli": 0,
                "need_from_recent_strain_milli": 0,
                "need_from_recent_nap_milli": 0
            },
            "sleep_performance_percentage": 88.0
        }
    })];

    if stub.nap_first.load(Ordering::SeqCst) {
        let nap_end = Utc::now() - Duration::minutes(30);
        records.insert(
            0,
            json!({
                "id": "0b1c2d3e-4f50-6172-8394-a5b6c7d8e9f0",
                "user_id": 10129,
                "start": (nap_end - Duration::minutes(40)).to_rfc3339(),
                "end": nap_end.to_rfc3339(),
                "nap": true,
                "score_state": "SCORED",
                "score": {
                    "stage_summary": {
                        "total_in_bed_time_milli": 2_400_000,
                        "total_awake_time_milli": 600_000,
                        "total_light_sleep_time_milli": 1_800_000,
                        "total_slow_wave_sleep_time_milli": 0,
                        "total_rem_sleep_time_milli": 0
                    },
                    "sleep_needed": {
                        "baseline_milli": 1_800_000,
                        "need_from_sleep_debt_milli": 0,
                        "need_from_recent_strain_milli": 0,
                        "need_from_recent_nap_milli": 0
                    }
                }
            }),
        );
    }

    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    records.truncate(limit);
    Json(json!({ "records": records })).into_response()
}

/// Config pointing every WHOOP endpoint at the stub.
pub fn test_config(stub: &StubWhoop) -> Config {
    Config {
        whoop_api_base_url: format!("{}/developer/v2", stub.base_url),
        whoop_auth_url: format!("{}/oauth/auth", stub.base_url),
        whoop_token_url: format!("{}/oauth/token", stub.base_url),
        upstream_timeout: std::time::Duration::from_secs(5),
        ..Config::default()
    }
}

/// Create a test app over an arbitrary key-value backend.
pub fn create_test_app_with(config: Config, kv: Arc<dyn KvStore>) -> (Router, Arc<AppState>) {
    let client = WhoopClient::new(&config).expect("client");
    let store = TokenStore::new(kv);
    let refresh_locks = Arc::new(dashmap::DashMap::new());
    let whoop = WhoopService::new(client, store, refresh_locks);

    let state = Arc::new(AppState { config, whoop });
    (create_router(state.clone()), state)
}

/// Create a test app backed by an in-memory store.
pub fn create_test_app(stub: &StubWhoop) -> (Router, Arc<AppState>, MemoryKv) {
    let kv = MemoryKv::new();
    let (app, state) = create_test_app_with(test_config(stub), Arc::new(kv.clone()));
    (app, state, kv)
}

/// Issue a GET against the router.
pub async fn get_page(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
