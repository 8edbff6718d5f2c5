use rust_decimal::dec;
use rwa_lending_core::{
    error::AppError,
    models::{ColorToken, MarketCategory},
    services::{filter_markets, presentation_for, MarketDataProvider, StaticMarketData},
};
use std::io::Write;

const SNAPSHOT: &str = r#"{
  "markets": [
    {
      "id": "infra-debt-1",
      "name": "Infrastructure Debt",
      "asset": "INFRA",
      "asset_symbol": "INFD",
      "category": "infrastructure",
      "total_supply": "10000000",
      "total_borrow": "2500000",
      "supply_apy": "0.061",
      "borrow_apy": "0.072",
      "lltv": "0.7",
      "risk_premium": "0.006",
      "is_permissioned": false,
      "min_investment": "50000"
    }
  ],
  "positions": [
    {
      "id": "p1",
      "account": "GXYZ",
      "market_id": "infra-debt-1",
      "kind": "borrow",
      "principal": "40000",
      "apy": "0.072",
      "health_factor": "1.42"
    }
  ]
}"#;

#[tokio::test]
async fn test_sample_markets_present_by_category() {
    let data = StaticMarketData::sample().unwrap();
    let markets = data.markets().await.unwrap();

    let colors: Vec<ColorToken> = markets.iter().map(|m| presentation_for(m).badge_color).collect();
    assert_eq!(colors, vec![ColorToken::Brand, ColorToken::Amber, ColorToken::Emerald]);
    assert!(markets.iter().all(|m| presentation_for(m).permissioned));
}

#[tokio::test]
async fn test_snapshot_file_with_unknown_category() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.as_bytes()).unwrap();

    let data = StaticMarketData::from_json_file(file.path()).unwrap();
    let market = data.market("infra-debt-1").await.unwrap();
    assert_eq!(market.category, MarketCategory::Other("infrastructure".to_string()));
    assert_eq!(market.utilization(), Some(dec!(0.25)));

    let presentation = presentation_for(&market);
    assert_eq!(presentation.badge_color, ColorToken::Neutral);
    assert!(!presentation.recognized);

    let positions = data.positions_for("GXYZ").await.unwrap();
    assert_eq!(positions[0].health_factor.unwrap().value(), dec!(1.42));
}

#[test]
fn test_snapshot_with_invalid_lltv_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.replace("\"0.7\"", "\"1.5\"").as_bytes()).unwrap();

    let result = StaticMarketData::from_json_file(file.path());
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[test]
fn test_snapshot_with_zero_health_factor_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.replace("\"1.42\"", "\"0\"").as_bytes()).unwrap();

    assert!(StaticMarketData::from_json_file(file.path()).is_err());
}

#[test]
fn test_missing_snapshot_file() {
    let result = StaticMarketData::from_json_file("/nonexistent/snapshot.json");
    assert!(matches!(result, Err(AppError::InternalError(_))));
}

#[tokio::test]
async fn test_filter_sample_markets() {
    let data = StaticMarketData::sample().unwrap();
    let markets = data.markets().await.unwrap();

    let treasury = filter_markets(&markets, "", Some(&MarketCategory::Treasury));
    assert_eq!(treasury.len(), 1);
    assert_eq!(treasury[0].asset_symbol, "TB3M");

    assert_eq!(filter_markets(&markets, "FUND", None).len(), 1);
    assert!(filter_markets(&markets, "gold", None).is_empty());
}

#[test]
fn test_snapshot_with_negative_principal_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SNAPSHOT.replace("\"40000\"", "\"-40000\"").as_bytes()).unwrap();

    let result = StaticMarketData::from_json_file(file.path());
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}
