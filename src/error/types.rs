use std::fmt;
use thiserror::Error;

use crate::models::{OnboardingAction, OnboardingStatus, OnboardingStep};

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    ValidationError(String),
    FormatError(String),
    OnboardingError(String),
    WalletError(String),
    NotFound(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::FormatError(msg) => write!(f, "Format error: {}", msg),
            AppError::OnboardingError(msg) => write!(f, "Onboarding error: {}", msg),
            AppError::WalletError(msg) => write!(f, "Wallet error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("I/O error: {}", err))
    }
}

/// Invariant violations on position and market records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Health factor must be greater than zero, got {value}")]
    NonPositiveHealthFactor { value: String },

    #[error("LLTV must be in (0, 1], got {value} for market {market_id}")]
    LltvOutOfRange { market_id: String, value: String },

    #[error("Risk premium must be non-negative, got {value} for market {market_id}")]
    NegativeRiskPremium { market_id: String, value: String },

    #[error("Negative {field} on position {position_id}: {value}")]
    NegativeAmount { position_id: String, field: &'static str, value: String },

    #[error("{field} on position {position_id} exceeds {max}: {value}")]
    AmountTooLarge { position_id: String, field: &'static str, value: String, max: String },

    #[error("Arithmetic overflow while computing {operation}")]
    ArithmeticOverflow { operation: &'static str },
}

/// Failures of the display-string adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unparseable currency amount: {input:?}")]
    InvalidCurrency { input: String },

    #[error("Unparseable percentage: {input:?}")]
    InvalidPercentage { input: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("Cannot {action} while {status} at step {step}")]
    InvalidTransition {
        action: OnboardingAction,
        status: OnboardingStatus,
        step: OnboardingStep,
    },

    #[error("Step {step} has empty required fields: {}", .missing.join(", "))]
    IncompleteStep { step: OnboardingStep, missing: Vec<&'static str> },

    #[error("Application fields are locked while {status}")]
    FieldsLocked { status: OnboardingStatus },

    #[error("Stale transition request: expected revision {expected}, current revision is {actual}")]
    StaleRevision { expected: u64, actual: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("A wallet connection is already in progress")]
    AlreadyConnecting,

    #[error("No wallet is connected")]
    NotConnected,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<FormatError> for AppError {
    fn from(err: FormatError) -> Self {
        AppError::FormatError(err.to_string())
    }
}

impl From<OnboardingError> for AppError {
    fn from(err: OnboardingError) -> Self {
        AppError::OnboardingError(err.to_string())
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        AppError::WalletError(err.to_string())
    }
}
