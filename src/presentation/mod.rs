//! Result presentation
//!
//! Pure transforms from backend results to display structures. Nothing in
//! here performs I/O or keeps state; the same payload always renders the
//! same way.

pub mod advisory;
pub mod charts;
pub mod dashboard;
pub mod risk;
pub mod sustainability;
pub mod terminal;

pub use advisory::{advisory_panel, classify_advisory, clean_advisory_text, AdvisoryPanel, Severity};
pub use charts::{land_allocation, profit_distribution, yield_impact, yield_loss_percent};
pub use dashboard::{dashboard, format_inr, risk_view, yield_view, DashboardView, RiskView, YieldView};
pub use risk::{risk_badge_class, risk_hero};
pub use sustainability::{sustainability_gauge, SustainabilityCategory};
pub use terminal::{MissingState, TerminalFormatter};
