//! Plain-text rendering of the page views for the `planner` binary.

use crate::model::{AllocationResult, FarmPlanRecord};
use crate::validation::FieldErrors;

use super::advisory::{AdvisoryPanel, Severity};
use super::charts::YieldImpact;
use super::dashboard::{crop_icon, format_inr, DashboardView, RiskView, YieldView};
use super::sustainability::SustainabilityGauge;

const GAUGE_WIDTH: usize = 20;

/// A page that found no data to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingState {
    Dashboard,
    CropResult,
    YieldResult,
    RiskResult,
}

impl MissingState {
    pub fn message(self) -> &'static str {
        match self {
            MissingState::Dashboard => "No farm plan yet",
            MissingState::CropResult => "No prediction result found.",
            MissingState::YieldResult => "No yield result found.",
            MissingState::RiskResult => "No analysis result found.",
        }
    }

    /// Command that produces the missing data.
    pub fn hint(self) -> &'static str {
        match self {
            MissingState::Dashboard => {
                "Generate a farm plan first to see insights, yield predictions, and advisories here.\n\
                 Run `planner plan` to go to the planner."
            }
            MissingState::CropResult => "Run `planner predict-crop` to go back to the crop predictor.",
            MissingState::YieldResult => "Run `planner predict-yield` to go back to the yield predictor.",
            MissingState::RiskResult => "Run `planner risk` to go back to the risk analysis.",
        }
    }
}

/// Text formatter for page views
pub struct TerminalFormatter;

impl TerminalFormatter {
    pub fn error_card(message: &str) -> String {
        format!(
            "✖ Something went wrong\n  {}\n  Re-run the command to retry.\n",
            message
        )
    }

    pub fn missing_state(state: MissingState) -> String {
        format!("{}\n{}\n", state.message(), state.hint())
    }

    pub fn field_errors(errors: &FieldErrors) -> String {
        let mut out = String::from("Please fix the highlighted fields:\n");
        for (field, message) in errors {
            out.push_str(&format!("  {:<30} {}\n", field, message));
        }
        out
    }

    pub fn dashboard(view: &DashboardView) -> String {
        let mut out = String::with_capacity(1024);

        out.push_str(&format!(
            "Farm Dashboard - {} recommended\n\n",
            view.recommended_crop
        ));
        out.push_str(&format!("  Recommended Crop      {}\n", view.recommended_crop));
        out.push_str(&format!("  Total Profit          {}\n", view.total_profit));
        out.push_str(&format!("  Sustainability Score  {}\n", view.sustainability));
        out.push_str(&format!("  {}\n\n", Self::gauge(&view.gauge)));

        out.push_str("Per-Crop Breakdown\n");
        out.push_str(&format!(
            "  {:<12} {:>8} {:>12} {:>14}  {}\n",
            "Crop", "Acres", "Adj. Yield", "Profit", "Risk"
        ));
        for row in &view.rows {
            out.push_str(&format!(
                "  {:<12} {:>8} {:>9} t/ac {:>14}  {}\n",
                row.crop, row.acres, row.adjusted_yield, row.expected_profit, row.risk_level
            ));
        }

        if let Some(profit) = &view.profit {
            out.push_str("\nProfit Distribution\n");
            for slice in &profit.slices {
                out.push_str(&format!(
                    "  {:<12} {:>5.1}%  {}\n",
                    slice.crop,
                    slice.percent,
                    format_inr(slice.profit)
                ));
            }
        }

        out.push('\n');
        out.push_str(&Self::yield_impact(&view.yield_impact));

        for crop in &view.advisories {
            out.push('\n');
            out.push_str(&Self::advisories(&crop.panel));
        }
        out
    }

    pub fn risk(view: &RiskView) -> String {
        let mut out = String::with_capacity(512);
        out.push_str(&format!("Risk Analysis: {}\n", view.hero.label));
        out.push_str(&format!("  {}\n\n", Self::gauge(&view.gauge)));
        out.push_str(&Self::yield_impact(&view.yield_impact));
        if let Some(panel) = &view.advisories {
            out.push('\n');
            out.push_str(&Self::advisories(panel));
        }
        out
    }

    pub fn crop_result(crop: &str) -> String {
        format!(
            "ML Recommended Crop\n  {} {}\n  Best match for your soil & climate conditions\n",
            crop_icon(crop),
            crop
        )
    }

    pub fn yield_result(view: &YieldView) -> String {
        let mut out = String::from("Yield Forecast Result\n");
        out.push_str(&format!("  {} {} ({} allocated)\n", view.icon, view.crop, view.acres));
        out.push_str(&format!("  Yield per Acre    {}\n", view.yield_per_acre));
        out.push_str(&format!("  Total Production  {}\n", view.total_production));
        out.push_str(&format!("  Expected Profit   {}\n", view.profit));
        out
    }

    pub fn allocation(result: &AllocationResult) -> String {
        let mut out = String::from("Optimized Allocation\n");
        for (crop, acres) in &result.allocation {
            out.push_str(&format!("  {:<12} {:>8} acres\n", crop, acres));
        }
        out.push_str(&format!(
            "  Water used        {} L\n  Fertilizer used   {} kg\n  Total profit      {}\n",
            result.resource_usage.water_used,
            result.resource_usage.fertilizer_used,
            format_inr(result.total_profit)
        ));
        out
    }

    pub fn history(records: &[FarmPlanRecord]) -> String {
        if records.is_empty() {
            return "No saved plans.\n".to_string();
        }
        let mut out = format!(
            "{:<36}  {:<16}  {:>8}  {:>14}  {:>6}  {:<6}  {}\n",
            "ID", "Farmer", "Area", "Profit", "Score", "Risk", "Created"
        );
        for record in records {
            out.push_str(&format!(
                "{:<36}  {:<16}  {:>8}  {:>14}  {:>6}  {:<6}  {}\n",
                record.id,
                record.farmer_name.as_deref().unwrap_or("-"),
                record.total_area,
                format_inr(record.total_profit),
                record.sustainability,
                record.risk_level,
                record.created_at.format("%Y-%m-%d %H:%M")
            ));
        }
        out
    }

    pub fn record(record: &FarmPlanRecord) -> String {
        let mut out = format!("Plan {}\n", record.id);
        out.push_str(&format!(
            "  Farmer          {}\n",
            record.farmer_name.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!("  Total area      {} acres\n", record.total_area));
        out.push_str(&format!("  Total profit    {}\n", format_inr(record.total_profit)));
        out.push_str(&format!("  Sustainability  {} / 100\n", record.sustainability));
        out.push_str(&format!("  Risk level      {}\n", record.risk_level));
        out.push_str(&format!("  Created         {}\n", record.created_at.to_rfc3339()));
        if let Some(crops) = record.recommendations.as_array() {
            for crop in crops {
                let name = crop.get("crop").and_then(|c| c.as_str()).unwrap_or("?");
                let acres = crop.get("acres").and_then(|a| a.as_f64()).unwrap_or(0.0);
                out.push_str(&format!("    - {} ({} acres)\n", name, acres));
            }
        }
        out
    }

    fn gauge(gauge: &SustainabilityGauge) -> String {
        let filled = (gauge.progress * GAUGE_WIDTH as f64).round() as usize;
        format!(
            "[{}{}] {} ({})",
            "█".repeat(filled),
            "░".repeat(GAUGE_WIDTH - filled.min(GAUGE_WIDTH)),
            gauge.score,
            gauge.label
        )
    }

    fn yield_impact(impact: &YieldImpact) -> String {
        let mut out = String::from("Yield Impact\n");
        for bar in &impact.bars {
            let badge = bar
                .loss_percent
                .map(|loss| format!("  -{}%", loss))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {:<12} {} -> {} t/ac{}\n",
                bar.crop, bar.base_yield, bar.adjusted_yield, badge
            ));
        }
        if !impact.any_loss {
            out.push_str("  No yield loss from current conditions\n");
        }
        out
    }

    fn advisories(panel: &AdvisoryPanel) -> String {
        let mut out = format!("{} ({})\n", panel.title, panel.count);
        for card in &panel.cards {
            let marker = match card.severity {
                Severity::Danger => "!!",
                Severity::Warning => "! ",
                Severity::Success => "ok",
                Severity::Info => "i ",
            };
            out.push_str(&format!("  [{}] {}\n", marker, card.text));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CropAllocation, FarmPlanResult};
    use crate::presentation::dashboard::{dashboard, risk_view};

    fn result() -> FarmPlanResult {
        FarmPlanResult {
            predicted_crop: "Wheat".to_string(),
            farm_plan: vec![CropAllocation {
                crop: "Wheat".to_string(),
                acres: 10.0,
                expected_profit: 150_000.0,
                expected_yield: 3.0,
                adjusted_yield: 2.7,
                risk_level: "Medium".to_string(),
                advisories: vec!["Rainfall below optimal".to_string()],
            }],
            total_expected_profit: 150_000.0,
            sustainability_score: 75.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_error_card() {
        let card = TerminalFormatter::error_card("Server error. The model or backend is unavailable.");
        assert!(card.contains("Something went wrong"));
        assert!(card.contains("backend is unavailable"));
    }

    #[test]
    fn test_missing_state_prompts() {
        let text = TerminalFormatter::missing_state(MissingState::YieldResult);
        assert!(text.starts_with("No yield result found."));
        assert!(text.contains("planner predict-yield"));
    }

    #[test]
    fn test_dashboard_text() {
        let text = TerminalFormatter::dashboard(&dashboard(&result()));
        assert!(text.contains("Wheat recommended"));
        assert!(text.contains("₹1,50,000"));
        assert!(text.contains("75 / 100"));
        assert!(text.contains("-10%"));
        assert!(text.contains("[! ] Rainfall below optimal"));
    }

    #[test]
    fn test_risk_text() {
        let text = TerminalFormatter::risk(&risk_view(&result()));
        assert!(text.starts_with("Risk Analysis: Medium Risk"));
        assert!(text.contains("Farm Advisories (1)"));
    }

    #[test]
    fn test_field_errors_text() {
        let mut errors = FieldErrors::new();
        errors.insert("Soil_pH", "Soil pH must be between 3.0 and 10.0".to_string());
        let text = TerminalFormatter::field_errors(&errors);
        assert!(text.contains("Soil_pH"));
        assert!(text.contains("Soil pH must be between 3.0 and 10.0"));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(TerminalFormatter::history(&[]), "No saved plans.\n");
    }
}
