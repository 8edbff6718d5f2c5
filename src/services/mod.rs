pub mod health_classifier;
pub mod market_data_service;
pub mod market_presenter;
pub mod onboarding_service;
pub mod portfolio_aggregator;
pub mod wallet_service;

pub use health_classifier::*;
pub use market_data_service::*;
pub use market_presenter::*;
pub use onboarding_service::*;
pub use portfolio_aggregator::*;
pub use wallet_service::*;
