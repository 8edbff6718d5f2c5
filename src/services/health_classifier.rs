use rust_decimal::Decimal;
use rust_decimal::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ColorToken, HealthFactor};

/// Lower bound (inclusive) of the `Healthy` tier.
pub const HEALTHY_THRESHOLD: Decimal = dec!(2.0);
/// Lower bound (inclusive) of the `Moderate` tier.
pub const MODERATE_THRESHOLD: Decimal = dec!(1.5);
/// Health factor at which the health bar is drawn full.
pub const HEALTH_BAR_CEILING: Decimal = dec!(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthTier {
    NoExposure,
    Healthy,
    Moderate,
    AtRisk,
}

impl HealthTier {
    pub fn label(&self) -> &'static str {
        match self {
            HealthTier::NoExposure => "No Exposure",
            HealthTier::Healthy => "Healthy",
            HealthTier::Moderate => "Moderate",
            HealthTier::AtRisk => "At Risk",
        }
    }

    pub fn color(&self) -> ColorToken {
        match self {
            HealthTier::NoExposure => ColorToken::Neutral,
            HealthTier::Healthy => ColorToken::Emerald,
            HealthTier::Moderate => ColorToken::Amber,
            HealthTier::AtRisk => ColorToken::Red,
        }
    }
}

impl fmt::Display for HealthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthClassification {
    pub tier: HealthTier,
    pub color: ColorToken,
    pub label: &'static str,
    pub health_factor: Option<Decimal>,
}

impl HealthClassification {
    /// Width of the health bar, `min(hf / 3 * 100, 100)`, and zero without exposure.
    pub fn bar_fill_percent(&self) -> Decimal {
        match self.health_factor {
            Some(hf) => (hf / HEALTH_BAR_CEILING * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED),
            None => Decimal::ZERO,
        }
    }
}

/// The one health-factor classification every view uses.
pub fn classify(health_factor: Option<HealthFactor>) -> HealthClassification {
    classify_value(health_factor.map(|hf| hf.value()))
}

/// Classifies an already-validated raw value. Aggregates such as the portfolio
/// mean stay positive because every input was.
pub(crate) fn classify_value(health_factor: Option<Decimal>) -> HealthClassification {
    let tier = match health_factor {
        None => HealthTier::NoExposure,
        Some(hf) if hf >= HEALTHY_THRESHOLD => HealthTier::Healthy,
        Some(hf) if hf >= MODERATE_THRESHOLD => HealthTier::Moderate,
        Some(_) => HealthTier::AtRisk,
    };

    HealthClassification {
        tier,
        color: tier.color(),
        label: tier.label(),
        health_factor,
    }
}
