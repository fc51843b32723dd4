//! Risk domain types: hazards derived from weather, and the verdict the
//! classifier produces from hazards plus headlines.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A discrete hazard signal derived from weather data.
///
/// Code-derived hazards come from the WMO interpretation tables; the
/// threshold-derived ones (heat, cold, wind tiers) come from the daily
/// aggregates. Ordering is only used to keep set renderings stable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    Thunderstorm,
    HeavyRain,
    Rain,
    Snow,
    Fog,
    ExtremeHeat,
    ExtremeCold,
    SevereWind,
    HighWind,
}

impl Hazard {
    /// Hazards that can escalate the verdict to its highest categories.
    pub fn is_severe_class(&self) -> bool {
        matches!(
            self,
            Hazard::Thunderstorm | Hazard::ExtremeHeat | Hazard::SevereWind
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Hazard::Thunderstorm => "thunderstorm",
            Hazard::HeavyRain => "heavy_rain",
            Hazard::Rain => "rain",
            Hazard::Snow => "snow",
            Hazard::Fog => "fog",
            Hazard::ExtremeHeat => "extreme_heat",
            Hazard::ExtremeCold => "extreme_cold",
            Hazard::SevereWind => "severe_wind",
            Hazard::HighWind => "high_wind",
        }
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deterministically ordered set of hazards for one place and horizon.
pub type HazardSet = BTreeSet<Hazard>;

/// Overall risk level, lowest to highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    #[default]
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Low => "low",
            RiskCategory::Moderate => "moderate",
            RiskCategory::High => "high",
            RiskCategory::Severe => "severe",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The classifier's output: a category plus everything that drove it.
///
/// `contributing_factors` is an ordered set so two identical inputs render
/// the same explanation, which the end-to-end tests rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskVerdict {
    pub category: RiskCategory,
    pub contributing_factors: BTreeSet<String>,
}

impl RiskVerdict {
    pub fn new(category: RiskCategory) -> Self {
        Self {
            category,
            contributing_factors: BTreeSet::new(),
        }
    }

    pub fn with_factor(mut self, factor: impl Into<String>) -> Self {
        self.contributing_factors.insert(factor.into());
        self
    }

    /// Comma-separated factor list for prompts and summaries.
    pub fn factors_line(&self) -> String {
        self.contributing_factors
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}
