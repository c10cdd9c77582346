//! Sustainability score bands and gauge geometry.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SustainabilityCategory {
    Sustainable,
    Moderate,
    HighRisk,
}

/// (minimum score, category), highest band first.
pub const SUSTAINABILITY_BANDS: &[(f64, SustainabilityCategory)] = &[
    (70.0, SustainabilityCategory::Sustainable),
    (40.0, SustainabilityCategory::Moderate),
];

impl SustainabilityCategory {
    /// Band for a 0-100 score. Anything below the lowest band (NaN included)
    /// is high risk.
    pub fn from_score(score: f64) -> Self {
        SUSTAINABILITY_BANDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, category)| *category)
            .unwrap_or(SustainabilityCategory::HighRisk)
    }

    pub fn label(self) -> &'static str {
        match self {
            SustainabilityCategory::Sustainable => "Sustainable",
            SustainabilityCategory::Moderate => "Moderate",
            SustainabilityCategory::HighRisk => "High Risk",
        }
    }

    /// Stroke colour of the gauge arc.
    pub fn color(self) -> &'static str {
        match self {
            SustainabilityCategory::Sustainable => "#22c55e",
            SustainabilityCategory::Moderate => "#f97316",
            SustainabilityCategory::HighRisk => "#ef4444",
        }
    }

    /// Track (background) colour of the gauge.
    pub fn track_color(self) -> &'static str {
        match self {
            SustainabilityCategory::Sustainable => "#dcfce7",
            SustainabilityCategory::Moderate => "#ffedd5",
            SustainabilityCategory::HighRisk => "#fee2e2",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SustainabilityGauge {
    pub score: f64,
    pub category: SustainabilityCategory,
    pub label: &'static str,
    pub color: &'static str,
    pub track_color: &'static str,
    /// Filled fraction of the arc, 0..=1
    pub progress: f64,
}

/// Gauge for a score; the arc is clamped to 0..100 while the label keeps the
/// raw value.
pub fn sustainability_gauge(score: f64) -> SustainabilityGauge {
    let category = SustainabilityCategory::from_score(score);
    let progress = if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0) / 100.0
    };

    SustainabilityGauge {
        score,
        category,
        label: category.label(),
        color: category.color(),
        track_color: category.track_color(),
        progress,
    }
}
