//! Risk level badges and the risk-analysis hero block.
//!
//! The backend sends risk as free text. Known values map to their style,
//! anything else is displayed with the low-risk style.

use serde::Serialize;

use crate::model::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskHero {
    pub label: &'static str,
    pub badge: &'static str,
    pub glow: &'static str,
    pub dot: &'static str,
    pub icon: &'static str,
}

/// Styling per risk level, matched on the exact label.
pub const RISK_STYLES: &[(RiskLevel, &str, RiskHero)] = &[
    (
        RiskLevel::Low,
        "bg-green-100 text-green-700",
        RiskHero {
            label: "Low Risk",
            badge: "bg-green-100 text-green-700 border-green-300",
            glow: "shadow-green-200",
            dot: "bg-green-500",
            icon: "shield-check",
        },
    ),
    (
        RiskLevel::Medium,
        "bg-yellow-100 text-yellow-700",
        RiskHero {
            label: "Medium Risk",
            badge: "bg-yellow-100 text-yellow-700 border-yellow-300",
            glow: "shadow-yellow-200",
            dot: "bg-yellow-500",
            icon: "alert-triangle",
        },
    ),
    (
        RiskLevel::High,
        "bg-red-100 text-red-700",
        RiskHero {
            label: "High Risk",
            badge: "bg-red-100 text-red-700 border-red-300",
            glow: "shadow-red-200",
            dot: "bg-red-500",
            icon: "shield-alert",
        },
    ),
];

/// Resolve a risk string, falling back to `Low` for display.
///
/// Only the exact labels "Low", "Medium" and "High" are recognised.
pub fn display_risk(value: &str) -> RiskLevel {
    RISK_STYLES
        .iter()
        .map(|(level, _, _)| *level)
        .find(|level| level.as_str() == value)
        .unwrap_or(RiskLevel::Low)
}

fn style(value: &str) -> &'static (RiskLevel, &'static str, RiskHero) {
    let level = display_risk(value);
    RISK_STYLES
        .iter()
        .find(|(l, _, _)| *l == level)
        .unwrap_or(&RISK_STYLES[0])
}

/// Badge classes for a table cell.
pub fn risk_badge_class(value: &str) -> &'static str {
    style(value).1
}

pub fn risk_hero(value: &str) -> RiskHero {
    style(value).2
}
