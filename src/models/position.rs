use rust_decimal::{dec, Decimal};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Largest principal a single position may carry. Keeps book-level sums far
/// inside the exact range of `Decimal`.
pub const MAX_PRINCIPAL: Decimal = dec!(1000000000000000000);

/// Ratio of risk-adjusted collateral to debt. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct HealthFactor(Decimal);

impl HealthFactor {
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveHealthFactor {
                value: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for HealthFactor {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HealthFactor> for Decimal {
    fn from(hf: HealthFactor) -> Self {
        hf.0
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionKind {
    Supply,
    Borrow,
}

/// One account's stake in a market, as a read-only snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub account: String,
    pub market_id: String,
    pub kind: PositionKind,
    pub principal: Decimal,
    /// Annual rate as a fraction, `0.0485` for 4.85%.
    pub apy: Decimal,
    /// `None` means no borrow exposure and therefore no liquidation risk.
    #[serde(default)]
    pub health_factor: Option<HealthFactor>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePosition {
    pub account: String,
    pub market_id: String,
    pub kind: PositionKind,
    pub principal: Decimal,
    pub apy: Decimal,
    pub health_factor: Option<Decimal>,
}

impl Position {
    pub fn new(id: impl Into<String>, create_position: CreatePosition) -> Result<Self, ValidationError> {
        let health_factor = create_position.health_factor.map(HealthFactor::new).transpose()?;
        let position = Self {
            id: id.into(),
            account: create_position.account,
            market_id: create_position.market_id,
            kind: create_position.kind,
            principal: create_position.principal,
            apy: create_position.apy,
            health_factor,
        };
        position.validate()?;
        Ok(position)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("principal", self.principal), ("apy", self.apy)] {
            if value < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    position_id: self.id.clone(),
                    field,
                    value: value.to_string(),
                });
            }
        }
        if self.principal > MAX_PRINCIPAL {
            return Err(ValidationError::AmountTooLarge {
                position_id: self.id.clone(),
                field: "principal",
                value: self.principal.to_string(),
                max: MAX_PRINCIPAL.to_string(),
            });
        }
        Ok(())
    }

    /// Contribution to net yield: earned on supply, paid on borrow.
    pub fn signed_apy(&self) -> Decimal {
        match self.kind {
            PositionKind::Supply => self.apy,
            PositionKind::Borrow => -self.apy,
        }
    }
}
