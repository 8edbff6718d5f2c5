use serde::Serialize;
use tracing::warn;

use crate::models::{ColorToken, Market, MarketCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketPresentation {
    pub badge_color: ColorToken,
    pub risk_label: String,
    pub category_label: String,
    pub permissioned: bool,
    /// False when the category is newer than this crate and was presented neutrally.
    pub recognized: bool,
}

pub fn presentation_for(market: &Market) -> MarketPresentation {
    let (badge_color, category_label) = match &market.category {
        MarketCategory::Treasury => (ColorToken::Brand, "Treasury".to_string()),
        MarketCategory::Credit => (ColorToken::Amber, "Corporate Credit".to_string()),
        MarketCategory::RealEstate => (ColorToken::Emerald, "Real Estate".to_string()),
        MarketCategory::Other(raw) => {
            warn!(market_id = %market.id, category = %raw, "Unrecognized market category, using neutral presentation");
            (ColorToken::Neutral, raw.clone())
        }
    };

    let access = if market.is_permissioned { "Permissioned" } else { "Open" };

    MarketPresentation {
        badge_color,
        risk_label: format!("{} · {}", category_label, access),
        category_label,
        permissioned: market.is_permissioned,
        recognized: market.category.is_recognized(),
    }
}

/// Markets whose name or asset symbol contains `search` (case-insensitive),
/// optionally restricted to one category.
pub fn filter_markets<'a>(
    markets: &'a [Market],
    search: &str,
    category: Option<&MarketCategory>,
) -> Vec<&'a Market> {
    let needle = search.trim().to_lowercase();
    markets
        .iter()
        .filter(|market| {
            needle.is_empty()
                || market.name.to_lowercase().contains(&needle)
                || market.asset_symbol.to_lowercase().contains(&needle)
        })
        .filter(|market| category.map_or(true, |wanted| &market.category == wanted))
        .collect()
}
