//! Page view models: farm dashboard, risk analysis, crop and yield results.
//!
//! Each builder takes the backend result and assembles everything a page
//! shows, using the rule tables of the sibling modules.

use serde::Serialize;

use super::advisory::{advisory_panel, AdvisoryPanel};
use super::charts::{
    land_allocation, profit_distribution, yield_impact, LandBar, ProfitDistribution, YieldImpact,
};
use super::risk::{risk_badge_class, risk_hero, RiskHero};
use super::sustainability::{sustainability_gauge, SustainabilityGauge};
use crate::model::{CropAllocation, FarmPlanResult, YieldPrediction};

pub const CROP_ICONS: &[(&str, &str)] = &[
    ("Rice", "🌾"),
    ("Wheat", "🌾"),
    ("Tomato", "🍅"),
    ("Maize", "🌽"),
    ("Potato", "🥔"),
];

pub const DEFAULT_CROP_ICON: &str = "🌿";

/// Risk shown on the analysis page when the plan has no allocations.
pub const DISPLAY_RISK_FALLBACK: &str = "Low";

pub fn crop_icon(crop: &str) -> &'static str {
    CROP_ICONS
        .iter()
        .find(|(name, _)| *name == crop)
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_CROP_ICON)
}

/// Rupee amount rounded to whole rupees with Indian digit grouping
/// (`₹12,34,567`).
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return "₹0".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    format!("{}₹{}", sign, grouped)
}

// ============================================================================
// Farm Dashboard
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub crop: String,
    pub acres: f64,
    pub adjusted_yield: f64,
    pub expected_profit: String,
    pub risk_level: String,
    pub risk_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropAdvisories {
    pub crop: String,
    pub panel: AdvisoryPanel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub recommended_crop: String,
    pub total_profit: String,
    /// "score / 100"
    pub sustainability: String,
    pub gauge: SustainabilityGauge,
    pub rows: Vec<PlanRow>,
    pub land: Vec<LandBar>,
    pub profit: Option<ProfitDistribution>,
    pub yield_impact: YieldImpact,
    pub advisories: Vec<CropAdvisories>,
}

pub fn dashboard(result: &FarmPlanResult) -> DashboardView {
    let rows = result
        .farm_plan
        .iter()
        .map(|alloc| PlanRow {
            crop: alloc.crop.clone(),
            acres: alloc.acres,
            adjusted_yield: alloc.adjusted_yield,
            expected_profit: format_inr(alloc.expected_profit),
            risk_level: alloc.risk_level.clone(),
            risk_class: risk_badge_class(&alloc.risk_level),
        })
        .collect();

    let advisories = result
        .farm_plan
        .iter()
        .filter_map(|alloc| {
            advisory_panel(&alloc.advisories, Some(&alloc.crop)).map(|panel| CropAdvisories {
                crop: alloc.crop.clone(),
                panel,
            })
        })
        .collect();

    DashboardView {
        recommended_crop: result.predicted_crop.clone(),
        total_profit: format_inr(result.total_expected_profit),
        sustainability: format!("{} / 100", result.sustainability_score),
        gauge: sustainability_gauge(result.sustainability_score),
        rows,
        land: land_allocation(&result.farm_plan),
        profit: profit_distribution(&result.farm_plan),
        yield_impact: yield_impact(&result.farm_plan),
        advisories,
    }
}

// ============================================================================
// Risk Analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskView {
    pub risk_level: String,
    pub hero: RiskHero,
    pub gauge: SustainabilityGauge,
    /// Advisories of every allocation, in plan order
    pub advisories: Option<AdvisoryPanel>,
    pub yield_impact: YieldImpact,
}

pub fn risk_view(result: &FarmPlanResult) -> RiskView {
    let risk_level = result
        .farm_plan
        .first()
        .map(|alloc| alloc.risk_level.as_str())
        .filter(|level| !level.is_empty())
        .unwrap_or(DISPLAY_RISK_FALLBACK)
        .to_string();

    let all_advisories: Vec<String> = result
        .farm_plan
        .iter()
        .flat_map(|alloc: &CropAllocation| alloc.advisories.iter().cloned())
        .collect();

    RiskView {
        hero: risk_hero(&risk_level),
        risk_level,
        gauge: sustainability_gauge(result.sustainability_score),
        advisories: advisory_panel(&all_advisories, None),
        yield_impact: yield_impact(&result.farm_plan),
    }
}

// ============================================================================
// Crop / Yield Results
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldView {
    pub crop: String,
    pub icon: &'static str,
    /// "1 acre" / "2.5 acres"
    pub acres: String,
    pub yield_per_acre: String,
    pub total_production: String,
    pub profit: String,
}

pub fn yield_view(prediction: &YieldPrediction) -> YieldView {
    let unit = if prediction.acres == 1.0 { "acre" } else { "acres" };
    YieldView {
        crop: prediction.crop.clone(),
        icon: crop_icon(&prediction.crop),
        acres: format!("{} {}", prediction.acres, unit),
        yield_per_acre: format!("{} tonnes", prediction.yield_per_acre),
        total_production: format!("{} tonnes", prediction.total_production_tons),
        profit: format_inr(prediction.profit),
    }
}
