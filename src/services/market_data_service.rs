use async_trait::async_trait;
use rust_decimal::{dec, Decimal};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{CreatePosition, Market, MarketCategory, Position, PositionKind};
use crate::utils::format::{parse_currency, parse_percentage};

/// Source of read-only market and position snapshots.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn markets(&self) -> Result<Vec<Market>, AppError>;

    async fn positions_for(&self, account: &str) -> Result<Vec<Position>, AppError>;

    async fn market(&self, market_id: &str) -> Result<Market, AppError> {
        self.markets()
            .await?
            .into_iter()
            .find(|market| market.id == market_id)
            .ok_or_else(|| AppError::NotFound(format!("market {}", market_id)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub markets: Vec<Market>,
    pub positions: Vec<Position>,
}

/// In-memory provider over a fixed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    snapshot: MarketSnapshot,
}

impl StaticMarketData {
    pub fn new(snapshot: MarketSnapshot) -> Result<Self, AppError> {
        for market in &snapshot.markets {
            market.validate()?;
        }
        for position in &snapshot.positions {
            position.validate()?;
        }
        Ok(Self { snapshot })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let snapshot: MarketSnapshot = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            market_count = snapshot.markets.len(),
            position_count = snapshot.positions.len(),
            "Loaded market snapshot"
        );
        Self::new(snapshot)
    }

    /// The platform's sample catalog, parsed from its display strings.
    pub fn sample() -> Result<Self, AppError> {
        let markets = SAMPLE_MARKETS
            .iter()
            .map(SampleMarket::parse)
            .collect::<Result<Vec<_>, _>>()?;
        let positions = SAMPLE_POSITIONS
            .iter()
            .map(SamplePosition::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(MarketSnapshot { markets, positions })
    }

    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn markets(&self) -> Result<Vec<Market>, AppError> {
        Ok(self.snapshot.markets.clone())
    }

    async fn positions_for(&self, account: &str) -> Result<Vec<Position>, AppError> {
        let positions: Vec<Position> = self
            .snapshot
            .positions
            .iter()
            .filter(|position| position.account == account)
            .cloned()
            .collect();
        debug!(account = %account, position_count = positions.len(), "Served position snapshot");
        Ok(positions)
    }
}

pub const SAMPLE_ACCOUNT: &str = "GABC123456789DEFGHIJKLMNOPQRSTUVWXYZ0123456789ABCDEF";

struct SampleMarket {
    id: &'static str,
    name: &'static str,
    asset: &'static str,
    asset_symbol: &'static str,
    category: &'static str,
    total_supply: &'static str,
    total_borrow: &'static str,
    supply_apy: &'static str,
    borrow_apy: &'static str,
    lltv: &'static str,
    risk_premium: &'static str,
    is_permissioned: bool,
    min_investment: &'static str,
    description: &'static str,
}

impl SampleMarket {
    fn parse(&self) -> Result<Market, AppError> {
        Ok(Market {
            id: self.id.to_string(),
            name: self.name.to_string(),
            asset: self.asset.to_string(),
            asset_symbol: self.asset_symbol.to_string(),
            category: MarketCategory::from(self.category),
            total_supply: parse_currency(self.total_supply)?,
            total_borrow: parse_currency(self.total_borrow)?,
            supply_apy: parse_percentage(self.supply_apy)?,
            borrow_apy: parse_percentage(self.borrow_apy)?,
            lltv: parse_percentage(self.lltv)?,
            risk_premium: parse_percentage(self.risk_premium)?,
            is_permissioned: self.is_permissioned,
            min_investment: parse_currency(self.min_investment)?,
            description: self.description.to_string(),
        })
    }
}

struct SamplePosition {
    id: &'static str,
    account: &'static str,
    market_id: &'static str,
    kind: PositionKind,
    amount: &'static str,
    apy: &'static str,
    health_factor: Option<Decimal>,
}

impl SamplePosition {
    fn parse(&self) -> Result<Position, AppError> {
        Ok(Position::new(
            self.id,
            CreatePosition {
                account: self.account.to_string(),
                market_id: self.market_id.to_string(),
                kind: self.kind,
                principal: parse_currency(self.amount)?,
                apy: parse_percentage(self.apy)?,
                health_factor: self.health_factor,
            },
        )?)
    }
}

const SAMPLE_MARKETS: &[SampleMarket] = &[
    SampleMarket {
        id: "treasury-bills-1",
        name: "US Treasury Bills (3M)",
        asset: "T-BILL-3M",
        asset_symbol: "TB3M",
        category: "treasury",
        total_supply: "$125.5M",
        total_borrow: "$89.2M",
        supply_apy: "4.85%",
        borrow_apy: "5.95%",
        lltv: "85%",
        risk_premium: "0.15%",
        is_permissioned: true,
        min_investment: "$100,000",
        description: "High-grade US Treasury Bills with 3-month maturity. Collateralized by government securities.",
    },
    SampleMarket {
        id: "corporate-credit-1",
        name: "Investment Grade Corporate Bonds",
        asset: "IG-CORP",
        asset_symbol: "IGCB",
        category: "credit",
        total_supply: "$78.3M",
        total_borrow: "$45.1M",
        supply_apy: "6.25%",
        borrow_apy: "7.85%",
        lltv: "75%",
        risk_premium: "0.45%",
        is_permissioned: true,
        min_investment: "$250,000",
        description: "Diversified portfolio of investment-grade corporate bonds with average rating of BBB+.",
    },
    SampleMarket {
        id: "real-estate-1",
        name: "Commercial Real Estate Fund",
        asset: "CRE-FUND",
        asset_symbol: "CREF",
        category: "real-estate",
        total_supply: "$156.7M",
        total_borrow: "$98.4M",
        supply_apy: "7.45%",
        borrow_apy: "9.15%",
        lltv: "65%",
        risk_premium: "0.85%",
        is_permissioned: true,
        min_investment: "$500,000",
        description: "Institutional-grade commercial real estate properties across major US metros.",
    },
];

const SAMPLE_POSITIONS: &[SamplePosition] = &[
    SamplePosition {
        id: "tb3m-supply",
        account: SAMPLE_ACCOUNT,
        market_id: "treasury-bills-1",
        kind: PositionKind::Supply,
        amount: "$2.5M",
        apy: "4.85%",
        health_factor: None,
    },
    SamplePosition {
        id: "tb3m-borrow",
        account: SAMPLE_ACCOUNT,
        market_id: "treasury-bills-1",
        kind: PositionKind::Borrow,
        amount: "$1.2M",
        apy: "5.95%",
        health_factor: Some(dec!(2.45)),
    },
    SamplePosition {
        id: "igcb-supply",
        account: SAMPLE_ACCOUNT,
        market_id: "corporate-credit-1",
        kind: PositionKind::Supply,
        amount: "$800K",
        apy: "6.25%",
        health_factor: None,
    },
    SamplePosition {
        id: "igcb-borrow",
        account: SAMPLE_ACCOUNT,
        market_id: "corporate-credit-1",
        kind: PositionKind::Borrow,
        amount: "$350K",
        apy: "7.85%",
        health_factor: Some(dec!(1.89)),
    },
    SamplePosition {
        id: "pos-2",
        account: "GDEF456789ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789GHIJ",
        market_id: "corporate-credit-1",
        kind: PositionKind::Borrow,
        amount: "$50,000",
        apy: "7.85%",
        health_factor: Some(dec!(1.8)),
    },
    SamplePosition {
        id: "pos-3",
        account: "GHIJ789012345ABCDEFGHIJKLMNOPQRSTUVWXYZ6789KLMNO",
        market_id: "real-estate-1",
        kind: PositionKind::Supply,
        amount: "$75,000",
        apy: "7.45%",
        health_factor: Some(dec!(1.3)),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_catalog_parses() {
        let data = StaticMarketData::sample().unwrap();
        let markets = data.markets().await.unwrap();
        assert_eq!(markets.len(), 3);

        let treasury = data.market("treasury-bills-1").await.unwrap();
        assert_eq!(treasury.total_supply, dec!(125500000));
        assert_eq!(treasury.lltv, dec!(0.85));
        assert_eq!(treasury.risk_premium, dec!(0.0015));
    }

    #[tokio::test]
    async fn test_positions_filtered_by_account() {
        let data = StaticMarketData::sample().unwrap();
        let positions = data.positions_for(SAMPLE_ACCOUNT).await.unwrap();
        assert_eq!(positions.len(), 4);

        let borrow = positions.iter().find(|p| p.id == "tb3m-borrow").unwrap();
        assert_eq!(borrow.health_factor.unwrap().value(), dec!(2.45));
        assert!(data.positions_for("GUNKNOWN").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_market_is_not_found() {
        let data = StaticMarketData::sample().unwrap();
        assert!(matches!(data.market("missing").await, Err(AppError::NotFound(_))));
    }
}
