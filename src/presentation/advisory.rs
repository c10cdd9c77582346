//! Advisory severity classification.
//!
//! Advisories are free text from the backend. Severity is derived by an
//! ordered rule table: the first matching rule wins, danger before warning
//! before success, and anything unmatched is informational.

use serde::Serialize;

// ============================================================================
// Rules
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Warning,
    Success,
    Info,
}

/// Text predicate used by a severity rule. Matching is on lowercased text.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    ContainsAny(&'static [&'static str]),
    StartsWith(&'static str),
}

impl Matcher {
    fn matches(&self, lower: &str) -> bool {
        match self {
            Matcher::ContainsAny(keywords) => keywords.iter().any(|k| lower.contains(k)),
            Matcher::StartsWith(prefix) => lower.starts_with(prefix),
        }
    }
}

pub const DANGER_KEYWORDS: &[&str] = &[
    "critically", "severe", "frost", "extreme", "exceeded",
    "too hot", "too cold", "urgently", "flood", "immediately",
];

pub const WARNING_KEYWORDS: &[&str] = &[
    "high", "above", "below", "outside", "alkaline", "acidic",
    "reduce", "increase", "moderate", "excess", "low", "risk",
];

/// Marker the backend puts on positive advisories.
pub const SUCCESS_MARKER: &str = "✅";

pub const SEVERITY_RULES: &[(Matcher, Severity)] = &[
    (Matcher::ContainsAny(DANGER_KEYWORDS), Severity::Danger),
    (Matcher::ContainsAny(WARNING_KEYWORDS), Severity::Warning),
    (Matcher::StartsWith(SUCCESS_MARKER), Severity::Success),
];

/// Classify an advisory string.
pub fn classify_advisory(text: &str) -> Severity {
    let lower = text.to_lowercase();
    SEVERITY_RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(&lower))
        .map(|(_, severity)| *severity)
        .unwrap_or(Severity::Info)
}

// ============================================================================
// Styling
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityStyle {
    pub icon: &'static str,
    pub card: &'static str,
    pub icon_class: &'static str,
    pub text: &'static str,
}

impl Severity {
    pub fn style(self) -> SeverityStyle {
        match self {
            Severity::Info => SeverityStyle {
                icon: "info",
                card: "bg-blue-50 border-blue-200",
                icon_class: "text-blue-500",
                text: "text-blue-800",
            },
            Severity::Warning => SeverityStyle {
                icon: "alert-triangle",
                card: "bg-yellow-50 border-yellow-200",
                icon_class: "text-yellow-500",
                text: "text-yellow-800",
            },
            Severity::Danger => SeverityStyle {
                icon: "alert-circle",
                card: "bg-red-50 border-red-200",
                icon_class: "text-red-500",
                text: "text-red-800",
            },
            Severity::Success => SeverityStyle {
                icon: "check-circle-2",
                card: "bg-green-50 border-green-200",
                icon_class: "text-green-600",
                text: "text-green-800",
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Danger => "danger",
            Severity::Warning => "warning",
            Severity::Success => "success",
            Severity::Info => "info",
        }
    }
}

/// Leading emoji / pictographs / spaces the backend prefixes advisories with.
fn is_leading_marker(c: char) -> bool {
    matches!(
        c,
        '\u{1F300}'..='\u{1FFFF}'
            | '\u{2705}' // ✅
            | '\u{2697}' // ⚗
            | '\u{2744}' // ❄
            | '\u{2600}' // ☀
            | '\u{26A0}' // ⚠
            | '\u{FE0F}' // emoji presentation selector
            | ' '
    )
}

/// Strip leading markers for display.
pub fn clean_advisory_text(text: &str) -> String {
    text.trim_start_matches(is_leading_marker).trim().to_string()
}

// ============================================================================
// Panel
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryCard {
    pub severity: Severity,
    pub text: String,
    pub style: SeverityStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryPanel {
    pub title: String,
    pub count: usize,
    pub cards: Vec<AdvisoryCard>,
}

/// Build the advisory panel; nothing to render when there are no advisories.
pub fn advisory_panel(advisories: &[String], crop_name: Option<&str>) -> Option<AdvisoryPanel> {
    if advisories.is_empty() {
        return None;
    }

    let cards = advisories
        .iter()
        .map(|text| {
            let severity = classify_advisory(text);
            AdvisoryCard {
                severity,
                text: clean_advisory_text(text),
                style: severity.style(),
            }
        })
        .collect();

    let title = match crop_name {
        Some(crop) if !crop.is_empty() => format!("Advisories - {}", crop),
        _ => "Farm Advisories".to_string(),
    };

    Some(AdvisoryPanel {
        title,
        count: advisories.len(),
        cards,
    })
}
