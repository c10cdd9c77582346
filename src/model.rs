//! Farm plan data model
//!
//! Wire types exchanged with the ML backend, plus the persisted plan record.
//! Field names on the wire follow the backend schema exactly
//! (`Temperature_C`, `land_area`, ...), records use camelCase.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Categorical Inputs
// ============================================================================

/// Error for a categorical value outside its fixed option set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {options})")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
    pub options: String,
}

/// Declares a closed set of labelled options, serialized by label.
macro_rules! option_set {
    ($(#[$meta:meta])* $name:ident, $kind:literal, [$($variant:ident),+ $(,)?]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const LABELS: &'static [&'static str] = &[$(stringify!($variant)),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            /// Case-insensitive match on the label.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: s.to_string(),
                        options: Self::LABELS.join(", "),
                    })
            }
        }
    };
}

option_set!(
    /// Soil texture class accepted by the crop classifier
    SoilType, "soil type", [Loamy, Sandy, Clay, Silty, Peaty]
);

option_set!(
    /// Irrigation method
    IrrigationType, "irrigation type", [Drip, Sprinkler, Flood, Rainfed]
);

option_set!(
    /// Cropping season (Indian agricultural calendar)
    Season, "season", [Kharif, Rabi, Summer]
);

option_set!(
    /// Risk level attached to a crop allocation by the backend
    RiskLevel, "risk level", [Low, Medium, High]
);

// ============================================================================
// Inputs
// ============================================================================

/// Environmental conditions and current practice of a farm.
///
/// This is the body of `/predict-crop` and the shared prefix of every other
/// backend request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmConditions {
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: f64,
    #[serde(rename = "Soil_pH")]
    pub soil_ph: f64,
    #[serde(rename = "Soil_Type")]
    pub soil_type: SoilType,
    #[serde(rename = "Irrigation_Type")]
    pub irrigation_type: IrrigationType,
    #[serde(rename = "Season")]
    pub season: Season,
    #[serde(rename = "Farm_Area_acres")]
    pub farm_area_acres: f64,
    #[serde(rename = "Water_Availability_L_per_week")]
    pub water_availability_l_per_week: f64,
    #[serde(rename = "Fertilizer_Used_kg")]
    pub fertilizer_used_kg: f64,
}

impl Default for FarmConditions {
    fn default() -> Self {
        Self {
            temperature_c: 23.0,
            rainfall_mm: 850.0,
            soil_ph: 6.5,
            soil_type: SoilType::Loamy,
            irrigation_type: IrrigationType::Drip,
            season: Season::Kharif,
            farm_area_acres: 10.0,
            water_availability_l_per_week: 2750.0,
            fertilizer_used_kg: 110.0,
        }
    }
}

/// Resource constraints for the land allocator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConstraints {
    pub land_area: f64,
    pub water_available: f64,
    pub fertilizer_available: f64,
}

impl Default for ResourceConstraints {
    fn default() -> Self {
        Self {
            land_area: 10.0,
            water_available: 15000.0,
            fertilizer_available: 500.0,
        }
    }
}

/// Full planner input: conditions plus constraints, flattened on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmPlanInput {
    #[serde(flatten)]
    pub conditions: FarmConditions,
    #[serde(flatten)]
    pub resources: ResourceConstraints,
}

/// Body of `/predict-yield`: conditions plus the crop and its acreage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRequest {
    #[serde(flatten)]
    pub conditions: FarmConditions,
    pub crop_name: String,
    pub acres: f64,
}

/// Body of `/optimize-allocation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    #[serde(flatten)]
    pub resources: ResourceConstraints,
    pub crop_names: Vec<String>,
}

// ============================================================================
// Backend Results
// ============================================================================

/// One crop's share of the plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropAllocation {
    pub crop: String,
    pub acres: f64,
    pub expected_profit: f64,
    pub expected_yield: f64,
    /// Yield after environmental stress, never above `expected_yield`
    pub adjusted_yield: f64,
    /// "Low" / "Medium" / "High"; kept verbatim so unknown values survive display
    pub risk_level: String,
    pub advisories: Vec<String>,
}

impl CropAllocation {
    pub fn risk(&self) -> Option<RiskLevel> {
        self.risk_level.parse().ok()
    }
}

/// Response of `/generate-farm-plan`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmPlanResult {
    pub predicted_crop: String,
    pub candidate_crops: Vec<String>,
    pub farm_plan: Vec<CropAllocation>,
    pub total_expected_profit: f64,
    /// 0-100
    pub sustainability_score: f64,
}

/// Response of `/predict-crop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPrediction {
    pub recommended_crop: String,
}

/// Response of `/predict-yield`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YieldPrediction {
    pub crop: String,
    pub acres: f64,
    pub yield_per_acre: f64,
    pub total_production_tons: f64,
    pub profit: f64,
}

/// Water and fertilizer consumed by an allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceUsage {
    pub water_used: f64,
    pub fertilizer_used: f64,
}

/// Response of `/optimize-allocation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationResult {
    /// Crop name -> allocated acres
    pub allocation: BTreeMap<String, f64>,
    pub resource_usage: ResourceUsage,
    pub total_profit: f64,
}

// ============================================================================
// Persisted Plan Record
// ============================================================================

/// A stored farm plan. Created once by the relay, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmPlanRecord {
    pub id: Uuid,
    pub farmer_name: Option<String>,
    pub total_area: f64,
    /// Copy of the backend's `farm_plan` array
    pub recommendations: Value,
    /// `{ predicted_crop, candidate_crops, farm_plan }`
    pub allocation: Value,
    pub total_profit: f64,
    pub sustainability: f64,
    pub risk_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a plan record; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFarmPlan {
    pub farmer_name: Option<String>,
    pub total_area: f64,
    pub recommendations: Value,
    pub allocation: Value,
    pub total_profit: f64,
    pub sustainability: f64,
    pub risk_level: String,
    pub request_id: Option<String>,
}

impl NewFarmPlan {
    /// Materialize the record with a fresh id and creation time.
    pub fn into_record(self) -> FarmPlanRecord {
        FarmPlanRecord {
            id: Uuid::new_v4(),
            farmer_name: self.farmer_name,
            total_area: self.total_area,
            recommendations: self.recommendations,
            allocation: self.allocation,
            total_profit: self.total_profit,
            sustainability: self.sustainability,
            risk_level: self.risk_level,
            request_id: self.request_id,
            created_at: Utc::now(),
        }
    }
}
