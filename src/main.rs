use rwa_lending_core::{
    config::Settings,
    models::{OnboardingAction, OnboardingStep},
    services::{
        presentation_for, MarketDataProvider, OnboardingSession, PortfolioAggregator, SimulatedWallet,
        StaticMarketData, WalletProvider,
    },
    utils::{format_currency, format_percentage, init_logging},
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;
    init_logging(&settings.logging)?;
    info!("Configuration loaded successfully");

    let provider: Arc<dyn MarketDataProvider> = match &settings.data.snapshot_path {
        Some(path) => Arc::new(StaticMarketData::from_json_file(path)?),
        None => Arc::new(StaticMarketData::sample()?),
    };

    for market in provider.markets().await? {
        let presentation = presentation_for(&market);
        info!(
            market_id = %market.id,
            badge = %presentation.badge_color,
            risk = %presentation.risk_label,
            lltv = %format_percentage(market.lltv),
            supply = %format_currency(market.total_supply),
            "Market"
        );
    }

    let wallet = SimulatedWallet::new(&settings.wallet);
    let account = match wallet.connect().await {
        Ok(address) => address,
        Err(e) => {
            error!(error = %e, "Could not connect wallet");
            return Err(e.into());
        }
    };

    let aggregator = PortfolioAggregator::new(provider.clone());
    let summary = aggregator.summary_for_account(&account).await?;
    info!(
        supplied = %format_currency(summary.total_supplied),
        borrowed = %format_currency(summary.total_borrowed),
        net_apy = %summary.weighted_net_apy.map(format_percentage).unwrap_or_else(|| "n/a".to_string()),
        avg_health_factor = %summary.average_health_factor.map(|hf| format!("{:.2}", hf)).unwrap_or_else(|| "n/a".to_string()),
        health = %summary.health.label,
        "Portfolio summary"
    );

    let session = OnboardingSession::new(account.clone(), &settings.onboarding);
    let demo_fields = [
        (OnboardingStep::PersonalInformation, "first_name", "Avery"),
        (OnboardingStep::PersonalInformation, "last_name", "Quinn"),
        (OnboardingStep::PersonalInformation, "email", "avery@example.com"),
        (OnboardingStep::PersonalInformation, "phone", "+1 555 0100"),
        (OnboardingStep::PersonalInformation, "country", "us"),
        (OnboardingStep::EntityDetails, "entity_type", "fund"),
        (OnboardingStep::EntityDetails, "company_name", "Example Capital LP"),
        (OnboardingStep::EntityDetails, "tax_id", "12-3456789"),
    ];
    for (step, key, value) in demo_fields {
        session.set_field(step, key, value).await?;
    }
    for action in [
        OnboardingAction::Advance,
        OnboardingAction::Advance,
        OnboardingAction::Advance,
        OnboardingAction::Submit,
    ] {
        session.apply(action).await?;
    }
    let snapshot = session.snapshot().await;
    info!(
        status = %snapshot.application.status(),
        progress = %snapshot.application.progress_percent(),
        "Onboarding application ready for review"
    );

    wallet.disconnect().await;
    info!("Shutting down");
    Ok(())
}
