//! The risk classifier: a pure function from hazards plus headlines to a
//! [`RiskVerdict`].
//!
//! Escalation rules, in precedence order:
//!
//! 1. a severe-class hazard corroborated by an alert keyword -> Severe
//! 2. a severe-class hazard alone, or two or more distinct hazards -> High
//! 3. any hazard -> Moderate
//! 4. keyword matches without any hazard -> Low, with the matches recorded
//! 5. nothing -> Low, empty factors
//!
//! Disruption keywords (strikes, closures, traffic) are context, not
//! corroboration: they appear in the factors but never change the
//! category on their own and never satisfy rule 1.

use std::collections::BTreeSet;

use citypulse_core::news::Headline;
use citypulse_core::risk::{HazardSet, RiskCategory, RiskVerdict};
use tracing::debug;

/// Keywords that corroborate a severe-class weather hazard.
pub const ALERT_KEYWORDS: &[&str] = &[
    "storm",
    "disaster",
    "warning",
    "evacuate",
    "flood",
    "landslide",
    "emergency",
    "evacuation",
];

/// Keywords that signal civic disruption. Factor-only.
pub const DISRUPTION_KEYWORDS: &[&str] = &[
    "protest", "strike", "closure", "outage", "traffic",
];

/// Classify hazards and headlines into a verdict.
///
/// Keyword matching is a case-insensitive substring scan over each
/// headline's title and snippet. Matched keywords are deduplicated, so
/// five storm headlines weigh the same as one.
pub fn classify(hazards: &HazardSet, headlines: &[Headline]) -> RiskVerdict {
    let mut alert_hits: BTreeSet<&str> = BTreeSet::new();
    let mut disruption_hits: BTreeSet<&str> = BTreeSet::new();
    for headline in headlines {
        let text = headline.text().to_lowercase();
        for keyword in ALERT_KEYWORDS {
            if text.contains(keyword) {
                alert_hits.insert(keyword);
            }
        }
        for keyword in DISRUPTION_KEYWORDS {
            if text.contains(keyword) {
                disruption_hits.insert(keyword);
            }
        }
    }

    let severe_class = hazards.iter().any(|hazard| hazard.is_severe_class());
    let category = if severe_class && !alert_hits.is_empty() {
        RiskCategory::Severe
    } else if severe_class || hazards.len() >= 2 {
        RiskCategory::High
    } else if !hazards.is_empty() {
        RiskCategory::Moderate
    } else {
        RiskCategory::Low
    };

    let mut verdict = RiskVerdict::new(category);
    for hazard in hazards {
        verdict.contributing_factors.insert(hazard.label().to_string());
    }
    for keyword in &alert_hits {
        verdict
            .contributing_factors
            .insert(format!("alert: {keyword}"));
    }
    for keyword in &disruption_hits {
        verdict
            .contributing_factors
            .insert(format!("disruption: {keyword}"));
    }

    debug!(
        category = %verdict.category,
        hazards = hazards.len(),
        alerts = alert_hits.len(),
        disruptions = disruption_hits.len(),
        "risk classified"
    );
    verdict
}
