//! Plan relay: forward a plan request to the ML backend and persist the
//! response as a new record.
//!
//! The backend call and the insert are not transactional. If the backend
//! succeeds and the insert fails, the generated plan is lost and the caller
//! sees a failure; nothing is retried or compensated.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::client::{ApiError, BackendClient};
use crate::model::{FarmPlanRecord, NewFarmPlan};
use crate::store::{PlanStore, StoreError};

/// Backend endpoint the relay forwards to.
pub const GENERATE_PLAN_PATH: &str = "/generate-farm-plan";

/// Risk level recorded when the plan carries none.
pub const DEFAULT_RISK_LEVEL: &str = "Medium";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("backend request failed: {0}")]
    Backend(#[from] ApiError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Missing totalArea and land_area in plan request")]
    MissingArea,
}

impl RelayError {
    /// Underlying error text for the `details` field of a failed response.
    pub fn details(&self) -> String {
        match self {
            RelayError::Backend(e) => e.raw.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct PlanRelay {
    backend: BackendClient,
    store: PlanStore,
}

impl PlanRelay {
    pub fn new(backend: BackendClient, store: PlanStore) -> Self {
        Self { backend, store }
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    /// Generate and persist a plan. The request is forwarded verbatim.
    ///
    /// With a `requestId` that already has a record, that record is returned
    /// and the backend is not called.
    pub async fn generate(&self, request: Value) -> Result<FarmPlanRecord, RelayError> {
        let request_id = request_id(&request);
        if let Some(id) = &request_id {
            if let Some(existing) = self.store.find_by_request_id(id).await? {
                tracing::info!("Returning existing plan {} for request {}", existing.id, id);
                return Ok(existing);
            }
        }

        let response = self.backend.forward(GENERATE_PLAN_PATH, &request).await?;
        let plan = new_plan_from_response(&request, &response, request_id)?;
        let record = self.store.create(plan).await?;

        tracing::info!(
            "Saved plan {} ({} acres, risk {})",
            record.id,
            record.total_area,
            record.risk_level
        );
        Ok(record)
    }
}

fn request_id(request: &Value) -> Option<String> {
    request
        .get("requestId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Number when present and non-zero.
fn non_zero_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| *n != 0.0)
}

/// Map a backend plan response onto a new record.
///
/// - `farmerName`: request value when a non-empty string, else null
/// - `totalArea`: request `totalArea` when non-zero, else `land_area`
/// - `recommendations`: `farm_plan`, or `[]`
/// - `allocation`: `{ predicted_crop, candidate_crops, farm_plan }`, absent keys omitted
/// - `totalProfit` / `sustainability`: number or 0
/// - `riskLevel`: first allocation's `risk_level`, or `DEFAULT_RISK_LEVEL`
pub fn new_plan_from_response(
    request: &Value,
    response: &Value,
    request_id: Option<String>,
) -> Result<NewFarmPlan, RelayError> {
    let farmer_name = request
        .get("farmerName")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let total_area = non_zero_number(request.get("totalArea"))
        .or_else(|| request.get("land_area").and_then(Value::as_f64))
        .ok_or(RelayError::MissingArea)?;

    let farm_plan = response.get("farm_plan").filter(|v| !v.is_null());

    let mut allocation = Map::new();
    for key in ["predicted_crop", "candidate_crops", "farm_plan"] {
        if let Some(value) = response.get(key).filter(|v| !v.is_null()) {
            allocation.insert(key.to_string(), value.clone());
        }
    }

    let number_or_zero = |key: &str| response.get(key).and_then(Value::as_f64).unwrap_or(0.0);

    let risk_level = farm_plan
        .and_then(|plan| plan.get(0))
        .and_then(|first| first.get("risk_level"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_RISK_LEVEL)
        .to_string();

    Ok(NewFarmPlan {
        farmer_name,
        total_area,
        recommendations: farm_plan.cloned().unwrap_or_else(|| Value::Array(Vec::new())),
        allocation: Value::Object(allocation),
        total_profit: number_or_zero("total_expected_profit"),
        sustainability: number_or_zero("sustainability_score"),
        risk_level,
        request_id,
    })
}
