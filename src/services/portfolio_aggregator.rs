use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, ValidationError};
use crate::models::{PortfolioSummary, Position, PositionKind};
use crate::services::health_classifier::classify_value;
use crate::services::market_data_service::MarketDataProvider;
use crate::utils::math::{checked_sum, mean, weighted_average};

/// Totals, principal-weighted net APY and mean health factor over a set of positions.
///
/// Pure and order-independent: sums run over a canonical term order and each
/// ratio is taken once at the end. Overflow surfaces as
/// `ValidationError::ArithmeticOverflow` rather than a panic.
pub fn aggregate(positions: &[Position]) -> Result<PortfolioSummary, ValidationError> {
    let principals_of = |kind: PositionKind| {
        positions
            .iter()
            .filter(move |position| position.kind == kind)
            .map(|position| position.principal)
    };
    let total_supplied = checked_sum(principals_of(PositionKind::Supply), "total supplied")?;
    let total_borrowed = checked_sum(principals_of(PositionKind::Borrow), "total borrowed")?;
    let net_position = total_supplied
        .checked_sub(total_borrowed)
        .ok_or(ValidationError::ArithmeticOverflow { operation: "net position" })?;

    let weighted_net_apy = weighted_average(
        positions
            .iter()
            .map(|position| (position.signed_apy(), position.principal)),
    )?;

    let average_health_factor = mean(
        positions
            .iter()
            .filter_map(|position| position.health_factor)
            .map(|hf| hf.value()),
    )?;

    Ok(PortfolioSummary {
        position_count: positions.len(),
        total_supplied,
        total_borrowed,
        net_position,
        weighted_net_apy,
        average_health_factor,
        health: classify_value(average_health_factor),
    })
}

/// Fetches an account's positions from a provider and aggregates them.
pub struct PortfolioAggregator {
    provider: Arc<dyn MarketDataProvider>,
}

impl PortfolioAggregator {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    pub async fn summary_for_account(&self, account: &str) -> Result<PortfolioSummary, AppError> {
        let positions = self.provider.positions_for(account).await?;
        let summary = aggregate(&positions)?;

        info!(
            account = %account,
            position_count = summary.position_count,
            total_supplied = %summary.total_supplied,
            total_borrowed = %summary.total_borrowed,
            health = %summary.health.tier,
            "Portfolio aggregation completed"
        );

        Ok(summary)
    }
}
