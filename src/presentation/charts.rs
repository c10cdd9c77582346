//! Chart series derived from crop allocations.
//!
//! Land allocation bars, the profit distribution pie and the yield impact
//! bars. All functions are pure; empty input gives empty series or `None`.

use serde::Serialize;

use crate::model::CropAllocation;

// ============================================================================
// Colours
// ============================================================================

pub const CROP_COLORS: &[(&str, &str)] = &[
    ("Tomato", "#22c55e"),
    ("Wheat", "#f59e0b"),
    ("Rice", "#3b82f6"),
    ("Maize", "#eab308"),
    ("Potato", "#a78bfa"),
];

/// Cycled for pie slices of crops without a fixed colour.
pub const FALLBACK_PALETTE: &[&str] = &["#64748b", "#94a3b8", "#cbd5e1", "#e2e8f0"];

/// Bar colour for crops without a fixed colour.
pub const DEFAULT_BAR_COLOR: &str = "#94a3b8";

pub fn crop_color(crop: &str) -> Option<&'static str> {
    CROP_COLORS
        .iter()
        .find(|(name, _)| *name == crop)
        .map(|(_, color)| *color)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================================
// Land Allocation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandBar {
    pub crop: String,
    pub acres: f64,
    pub profit: f64,
    pub color: &'static str,
}

pub fn land_allocation(plan: &[CropAllocation]) -> Vec<LandBar> {
    plan.iter()
        .map(|alloc| LandBar {
            crop: alloc.crop.clone(),
            acres: alloc.acres,
            profit: alloc.expected_profit,
            color: crop_color(&alloc.crop).unwrap_or(DEFAULT_BAR_COLOR),
        })
        .collect()
}

// ============================================================================
// Profit Distribution
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitSlice {
    pub crop: String,
    pub profit: f64,
    /// Share of positive profit, one decimal
    pub percent: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitDistribution {
    pub slices: Vec<ProfitSlice>,
    /// Sum of `expected_profit` over every allocation, losses included
    pub total_profit: f64,
}

/// Profit share per crop with positive profit.
///
/// Each share is `100 * profit / positive_total`, rounded to one decimal on
/// its own, so the slices sum to 100 within rounding. Returns `None` when no
/// crop made a profit.
pub fn profit_distribution(plan: &[CropAllocation]) -> Option<ProfitDistribution> {
    let positive: Vec<(usize, &CropAllocation)> = plan
        .iter()
        .filter(|a| a.expected_profit.is_finite() && a.expected_profit > 0.0)
        .enumerate()
        .collect();
    let denominator: f64 = positive.iter().map(|(_, a)| a.expected_profit).sum();
    if positive.is_empty() || !denominator.is_finite() {
        return None;
    }

    let slices = positive
        .into_iter()
        .map(|(i, alloc)| ProfitSlice {
            crop: alloc.crop.clone(),
            profit: alloc.expected_profit,
            percent: round1(100.0 * alloc.expected_profit / denominator),
            color: crop_color(&alloc.crop)
                .unwrap_or(FALLBACK_PALETTE[i % FALLBACK_PALETTE.len()]),
        })
        .collect();

    Some(ProfitDistribution {
        slices,
        total_profit: plan.iter().map(|a| a.expected_profit).sum(),
    })
}

// ============================================================================
// Yield Impact
// ============================================================================

/// Percentage yield lost to environmental stress, one decimal.
///
/// `None` when there is no base yield or the rounded loss is not positive.
pub fn yield_loss_percent(base_yield: f64, adjusted_yield: f64) -> Option<f64> {
    if !base_yield.is_finite() || !adjusted_yield.is_finite() || base_yield <= 0.0 {
        return None;
    }
    let loss = round1(100.0 * (base_yield - adjusted_yield) / base_yield);
    (loss > 0.0).then_some(loss)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldBar {
    pub crop: String,
    pub base_yield: f64,
    pub adjusted_yield: f64,
    pub loss_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldImpact {
    pub bars: Vec<YieldBar>,
    pub any_loss: bool,
}

pub fn yield_impact(plan: &[CropAllocation]) -> YieldImpact {
    let bars: Vec<YieldBar> = plan
        .iter()
        .map(|alloc| YieldBar {
            crop: alloc.crop.clone(),
            base_yield: alloc.expected_yield,
            adjusted_yield: alloc.adjusted_yield,
            loss_percent: yield_loss_percent(alloc.expected_yield, alloc.adjusted_yield),
        })
        .collect();
    let any_loss = bars.iter().any(|b| b.loss_percent.is_some());
    YieldImpact { bars, any_loss }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn alloc(crop: &str, profit: f64) -> CropAllocation {
        CropAllocation {
            crop: crop.to_string(),
            acres: 2.0,
            expected_profit: profit,
            ..Default::default()
        }
    }

    fn percent_sum(dist: &ProfitDistribution) -> f64 {
        dist.slices.iter().map(|s| s.percent).sum()
    }

    #[test]
    fn test_equal_profits_get_equal_shares() {
        let plan = vec![alloc("Rice", 1.0), alloc("Wheat", 1.0), alloc("Maize", 1.0)];
        let dist = profit_distribution(&plan).unwrap();
        for slice in &dist.slices {
            assert_relative_eq!(slice.percent, 33.3);
        }
        assert_relative_eq!(percent_sum(&dist), 99.9, epsilon = 1e-9);
    }

    #[test]
    fn test_profit_shares_sum_to_100() {
        let plan = vec![alloc("Rice", 120_000.0), alloc("Maize", 80_000.0)];
        let dist = profit_distribution(&plan).unwrap();
        assert_relative_eq!(dist.slices[0].percent, 60.0);
        assert_relative_eq!(dist.slices[1].percent, 40.0);

        let plan = vec![alloc("Rice", 2.0), alloc("Wheat", 1.0)];
        let dist = profit_distribution(&plan).unwrap();
        assert_relative_eq!(dist.slices[0].percent, 66.7);
        assert_relative_eq!(dist.slices[1].percent, 33.3);

        let plan = vec![
            alloc("Tomato", 12_345.0),
            alloc("Potato", 67_890.0),
            alloc("Okra", 333.0),
            alloc("Cotton", 7.0),
        ];
        let dist = profit_distribution(&plan).unwrap();
        assert!((percent_sum(&dist) - 100.0).abs() <= 0.1 + 1e-9);
    }

    #[test]
    fn test_non_positive_profit_excluded() {
        let plan = vec![alloc("Rice", 30_000.0), alloc("Wheat", -5_000.0), alloc("Maize", 0.0)];
        let dist = profit_distribution(&plan).unwrap();

        assert_eq!(dist.slices.len(), 1);
        assert_eq!(dist.slices[0].crop, "Rice");
        assert_relative_eq!(dist.slices[0].percent, 100.0);
        assert_relative_eq!(dist.total_profit, 25_000.0);
    }

    #[test]
    fn test_no_positive_profit_renders_nothing() {
        assert!(profit_distribution(&[]).is_none());
        assert!(profit_distribution(&[alloc("Rice", -1.0)]).is_none());
    }

    #[test]
    fn test_distribution_is_deterministic() {
        let plan = vec![alloc("Rice", 10.0), alloc("Wheat", 20.0), alloc("Sorghum", 40.0)];
        assert_eq!(profit_distribution(&plan), profit_distribution(&plan));
    }

    #[test]
    fn test_slice_colours() {
        let plan = vec![alloc("Rice", 1.0), alloc("Okra", 1.0), alloc("Jute", 1.0)];
        let dist = profit_distribution(&plan).unwrap();
        assert_eq!(dist.slices[0].color, "#3b82f6");
        assert_eq!(dist.slices[1].color, FALLBACK_PALETTE[1]);
        assert_eq!(dist.slices[2].color, FALLBACK_PALETTE[2]);

        let bars = land_allocation(&plan);
        assert_eq!(bars[0].color, "#3b82f6");
        assert_eq!(bars[1].color, DEFAULT_BAR_COLOR);
    }

    #[test]
    fn test_yield_loss() {
        assert_eq!(yield_loss_percent(4.0, 3.0), Some(25.0));
        assert_eq!(yield_loss_percent(3.0, 2.0), Some(33.3));
        assert_eq!(yield_loss_percent(4.0, 4.0), None);
        assert_eq!(yield_loss_percent(4.0, 4.5), None);
        assert_eq!(yield_loss_percent(0.0, 1.0), None);
        assert_eq!(yield_loss_percent(1000.0, 999.99), None);
    }

    #[test]
    fn test_yield_impact_flags_any_loss() {
        let mut a = alloc("Rice", 1.0);
        a.expected_yield = 4.0;
        a.adjusted_yield = 4.0;
        let mut b = alloc("Wheat", 1.0);
        b.expected_yield = 3.0;
        b.adjusted_yield = 2.4;

        assert!(!yield_impact(&[a.clone()]).any_loss);
        let impact = yield_impact(&[a, b]);
        assert!(impact.any_loss);
        assert_eq!(impact.bars[0].loss_percent, None);
        assert_eq!(impact.bars[1].loss_percent, Some(20.0));
    }
}
