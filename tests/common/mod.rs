// Stand-in ML backend for integration tests
//
// Serves the four backend endpoints on 127.0.0.1 with canned responses and
// counts how often the plan endpoint is called.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behaviour {
    /// Every endpoint answers 200 with a canned body
    Healthy,
    /// Every endpoint answers 500 `{ detail }`
    Broken,
    /// Every endpoint answers 422 with a validation body
    Rejecting,
    /// Every endpoint answers 400 `{ detail }`
    BadInput,
    /// Every endpoint waits before answering
    Slow(Duration),
}

#[derive(Clone)]
pub struct MockBackend {
    behaviour: Behaviour,
    plan_calls: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn plan_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }
}

/// Scenario input: the default planner form.
pub fn scenario_input() -> Value {
    json!({
        "Temperature_C": 23,
        "Rainfall_mm": 850,
        "Soil_pH": 6.5,
        "Soil_Type": "Loamy",
        "Irrigation_Type": "Drip",
        "Season": "Kharif",
        "Farm_Area_acres": 10,
        "Water_Availability_L_per_week": 2750,
        "Fertilizer_Used_kg": 110,
        "land_area": 10,
        "water_available": 15000,
        "fertilizer_available": 500
    })
}

pub fn sample_plan() -> Value {
    json!({
        "predicted_crop": "Rice",
        "candidate_crops": ["Rice", "Maize"],
        "farm_plan": [
            {
                "crop": "Rice",
                "acres": 6.0,
                "expected_profit": 120000.0,
                "expected_yield": 4.0,
                "adjusted_yield": 3.6,
                "risk_level": "Low",
                "advisories": ["✅ Conditions are ideal for Rice"]
            },
            {
                "crop": "Maize",
                "acres": 4.0,
                "expected_profit": 80000.0,
                "expected_yield": 3.0,
                "adjusted_yield": 2.4,
                "risk_level": "Medium",
                "advisories": ["Rainfall above the ideal range"]
            }
        ],
        "total_expected_profit": 200000.0,
        "sustainability_score": 78.5
    })
}

async fn respond(mock: &MockBackend, ok: Value) -> axum::response::Response {
    match mock.behaviour {
        Behaviour::Healthy => Json(ok).into_response(),
        Behaviour::Broken => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "model not loaded" })),
        )
            .into_response(),
        Behaviour::Rejecting => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": [{ "loc": ["body", "Soil_pH"], "msg": "field required" }] })),
        )
            .into_response(),
        Behaviour::BadInput => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Unknown crop(s): ['Cotton']" })),
        )
            .into_response(),
        Behaviour::Slow(delay) => {
            tokio::time::sleep(delay).await;
            Json(ok).into_response()
        }
    }
}

async fn generate_farm_plan(State(mock): State<MockBackend>, Json(_body): Json<Value>) -> impl IntoResponse {
    mock.plan_calls.fetch_add(1, Ordering::SeqCst);
    respond(&mock, sample_plan()).await
}

async fn predict_crop(State(mock): State<MockBackend>, Json(_body): Json<Value>) -> impl IntoResponse {
    respond(&mock, json!({ "recommended_crop": "Rice" })).await
}

async fn predict_yield(State(mock): State<MockBackend>, Json(body): Json<Value>) -> impl IntoResponse {
    let acres = body["acres"].as_f64().unwrap_or(1.0);
    respond(
        &mock,
        json!({
            "crop": body["crop_name"],
            "acres": acres,
            "yield_per_acre": 3.5,
            "total_production_tons": 3.5 * acres,
            "profit": 42000.0 * acres
        }),
    )
    .await
}

async fn optimize_allocation(State(mock): State<MockBackend>, Json(body): Json<Value>) -> impl IntoResponse {
    let crops: Vec<String> = serde_json::from_value(body["crop_names"].clone()).unwrap_or_default();
    let land = body["land_area"].as_f64().unwrap_or(0.0);
    let share = if crops.is_empty() { 0.0 } else { land / crops.len() as f64 };
    let allocation: serde_json::Map<String, Value> = crops.into_iter().map(|c| (c, json!(share))).collect();
    respond(
        &mock,
        json!({
            "allocation": allocation,
            "resource_usage": { "water_used": 9000.0, "fertilizer_used": 300.0 },
            "total_profit": 150000.0
        }),
    )
    .await
}

/// Start a stand-in backend; returns its base URL and a handle for call counts.
pub async fn spawn_backend(behaviour: Behaviour) -> (String, MockBackend) {
    let mock = MockBackend {
        behaviour,
        plan_calls: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/generate-farm-plan", post(generate_farm_plan))
        .route("/predict-crop", post(predict_crop))
        .route("/predict-yield", post(predict_yield))
        .route("/optimize-allocation", post(optimize_allocation))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), mock)
}

/// A base URL with nothing listening on it.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}", addr)
}
