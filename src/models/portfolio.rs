use rust_decimal::Decimal;
use serde::Serialize;

use crate::services::health_classifier::HealthClassification;

/// Derived, never persisted. Rates are fractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioSummary {
    pub position_count: usize,
    pub total_supplied: Decimal,
    pub total_borrowed: Decimal,
    /// `supplied - borrowed`.
    pub net_position: Decimal,
    /// `None` when the book has no principal at all.
    pub weighted_net_apy: Option<Decimal>,
    /// `None` when no position carries borrow exposure.
    pub average_health_factor: Option<Decimal>,
    pub health: HealthClassification,
}
