//! Farm Planner
//!
//! Crop planning front-end and plan relay for an external ML/optimisation
//! backend. The backend owns the crop classifier, yield regressor and land
//! allocator; this crate collects and validates farm conditions, talks to the
//! backend, turns its results into display structures, and keeps a history
//! of generated plans.
//!
//! Layout:
//! - `model`: wire types shared by every layer
//! - `validation` / `forms`: input form layer (range rules, defaults, field edits)
//! - `client`: HTTP client for the ML backend and the relay server
//! - `presentation`: pure transforms from results to display structures
//! - `session`: last generated plan + page hand-off slots
//! - `store` / `relay` / `api_server` (feature `api`): plan relay service

pub mod client;
pub mod config;
pub mod forms;
pub mod model;
pub mod presentation;
pub mod session;
pub mod validation;

#[cfg(feature = "api")]
pub mod store;

#[cfg(feature = "api")]
pub mod relay;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use client::{ApiError, BackendClient, PlansClient};
pub use config::{RunMode, ServerConfig};
pub use model::{
    CropAllocation, FarmConditions, FarmPlanInput, FarmPlanRecord, FarmPlanResult,
    ResourceConstraints,
};
pub use session::{Handoff, HandoffSlot, PlanContext};
pub use validation::{validate_conditions, validate_plan_input, FieldErrors};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
#[cfg(feature = "api")]
pub use relay::PlanRelay;
#[cfg(feature = "api")]
pub use store::PlanStore;
