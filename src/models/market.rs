use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Asset class of a lending pool. Categories added upstream before this crate
/// learns about them are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketCategory {
    Treasury,
    Credit,
    RealEstate,
    Other(String),
}

impl MarketCategory {
    pub fn as_str(&self) -> &str {
        match self {
            MarketCategory::Treasury => "treasury",
            MarketCategory::Credit => "credit",
            MarketCategory::RealEstate => "real-estate",
            MarketCategory::Other(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, MarketCategory::Other(_))
    }
}

impl FromStr for MarketCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "treasury" => MarketCategory::Treasury,
            "credit" => MarketCategory::Credit,
            "real-estate" | "real_estate" | "realestate" => MarketCategory::RealEstate,
            _ => MarketCategory::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for MarketCategory {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for MarketCategory {
    fn from(s: &str) -> Self {
        MarketCategory::from(s.to_string())
    }
}

impl From<MarketCategory> for String {
    fn from(category: MarketCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for MarketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lending pool for a specific RWA asset class. Rates and ratios are fractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub name: String,
    pub asset: String,
    pub asset_symbol: String,
    pub category: MarketCategory,
    pub total_supply: Decimal,
    pub total_borrow: Decimal,
    pub supply_apy: Decimal,
    pub borrow_apy: Decimal,
    pub lltv: Decimal,
    pub risk_premium: Decimal,
    pub is_permissioned: bool,
    pub min_investment: Decimal,
    #[serde(default)]
    pub description: String,
}

impl Market {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.lltv <= Decimal::ZERO || self.lltv > Decimal::ONE {
            return Err(ValidationError::LltvOutOfRange {
                market_id: self.id.clone(),
                value: self.lltv.to_string(),
            });
        }
        if self.risk_premium < Decimal::ZERO {
            return Err(ValidationError::NegativeRiskPremium {
                market_id: self.id.clone(),
                value: self.risk_premium.to_string(),
            });
        }
        Ok(())
    }

    /// Borrowed share of supplied liquidity; `None` for an empty pool.
    pub fn utilization(&self) -> Option<Decimal> {
        if self.total_supply.is_zero() {
            return None;
        }
        Some(self.total_borrow / self.total_supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn market(lltv: Decimal, risk_premium: Decimal) -> Market {
        Market {
            id: "treasury-bills-1".to_string(),
            name: "US Treasury Bills (3M)".to_string(),
            asset: "T-BILL-3M".to_string(),
            asset_symbol: "TB3M".to_string(),
            category: MarketCategory::Treasury,
            total_supply: dec!(125500000),
            total_borrow: dec!(89200000),
            supply_apy: dec!(0.0485),
            borrow_apy: dec!(0.0595),
            lltv,
            risk_premium,
            is_permissioned: true,
            min_investment: dec!(100000),
            description: String::new(),
        }
    }

    #[test]
    fn test_category_parsing_keeps_unknown_values() {
        assert_eq!(MarketCategory::from("treasury"), MarketCategory::Treasury);
        assert_eq!(MarketCategory::from("Real-Estate"), MarketCategory::RealEstate);
        assert_eq!(
            MarketCategory::from("unknown-future-type"),
            MarketCategory::Other("unknown-future-type".to_string())
        );
        assert!(!MarketCategory::from("private-equity").is_recognized());
    }

    #[test]
    fn test_category_parsing_trims_unknown_values() {
        assert_eq!(MarketCategory::from(" treasury "), MarketCategory::Treasury);
        assert_eq!(MarketCategory::from(" infra "), MarketCategory::Other("infra".to_string()));
        let other: MarketCategory = serde_json::from_str("\"  infra\"").unwrap();
        assert_eq!(other.as_str(), "infra");
    }

    #[test]
    fn test_category_serde_round_trips_raw_string() {
        let json = serde_json::to_string(&MarketCategory::RealEstate).unwrap();
        assert_eq!(json, "\"real-estate\"");
        let other: MarketCategory = serde_json::from_str("\"infrastructure\"").unwrap();
        assert_eq!(other.as_str(), "infrastructure");
    }

    #[test]
    fn test_validate_lltv_bounds() {
        assert!(market(dec!(0.85), dec!(0.0015)).validate().is_ok());
        assert!(market(Decimal::ONE, Decimal::ZERO).validate().is_ok());
        assert!(matches!(
            market(Decimal::ZERO, dec!(0.0015)).validate(),
            Err(ValidationError::LltvOutOfRange { .. })
        ));
        assert!(market(dec!(1.01), dec!(0.0015)).validate().is_err());
        assert!(matches!(
            market(dec!(0.85), dec!(-0.01)).validate(),
            Err(ValidationError::NegativeRiskPremium { .. })
        ));
    }

    #[test]
    fn test_utilization() {
        let m = market(dec!(0.85), dec!(0.0015));
        assert_eq!(m.utilization().unwrap().round_dp(3), dec!(0.711));

        let mut empty = m.clone();
        empty.total_supply = Decimal::ZERO;
        assert_eq!(empty.utilization(), None);
    }
}
