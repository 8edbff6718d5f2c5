//! Boundary adapter between display strings ("$125.5M", "4.85%") and the
//! decimal values the core works with.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::FormatError;

static CURRENCY_PATTERN: OnceLock<Regex> = OnceLock::new();
static PERCENTAGE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn currency_pattern() -> &'static Regex {
    CURRENCY_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(-)?\s*\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?|\.[0-9]+)\s*([KkMmBb])?\s*$")
            .expect("currency pattern is valid")
    })
}

fn percentage_pattern() -> &'static Regex {
    PERCENTAGE_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(-?[0-9]+(?:\.[0-9]+)?|-?\.[0-9]+)\s*%?\s*$").expect("percentage pattern is valid")
    })
}

/// Parses `"$125.5M"`, `"$800K"`, `"$1.24B"` or `"$100,000"` into a plain amount.
pub fn parse_currency(input: &str) -> Result<Decimal, FormatError> {
    let invalid = || FormatError::InvalidCurrency {
        input: input.to_string(),
    };

    let captures = currency_pattern().captures(input).ok_or_else(invalid)?;
    let digits = captures[2].replace(',', "");
    let mut amount = Decimal::from_str(&digits).map_err(|_| invalid())?;

    let multiplier = match captures.get(3).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(suffix) if suffix == "K" => Decimal::from(1_000),
        Some(suffix) if suffix == "M" => Decimal::from(1_000_000),
        Some(suffix) if suffix == "B" => Decimal::from(1_000_000_000),
        _ => Decimal::ONE,
    };
    amount = amount.checked_mul(multiplier).ok_or_else(invalid)?;

    if captures.get(1).is_some() {
        amount = -amount;
    }
    Ok(amount.normalize())
}

/// Parses `"4.85%"` into the fraction `0.0485`.
pub fn parse_percentage(input: &str) -> Result<Decimal, FormatError> {
    let invalid = || FormatError::InvalidPercentage {
        input: input.to_string(),
    };

    let captures = percentage_pattern().captures(input).ok_or_else(invalid)?;
    let value = Decimal::from_str(&captures[1]).map_err(|_| invalid())?;
    Ok((value / Decimal::ONE_HUNDRED).normalize())
}

/// Compact currency rendering: `$2.5M`, `$800K`, `$1.24B`, `$950`.
pub fn format_currency(amount: Decimal) -> String {
    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let abs = amount.abs();

    let (scaled, suffix) = if abs >= Decimal::from(1_000_000_000) {
        (abs / Decimal::from(1_000_000_000), "B")
    } else if abs >= Decimal::from(1_000_000) {
        (abs / Decimal::from(1_000_000), "M")
    } else if abs >= Decimal::from(1_000) {
        (abs / Decimal::from(1_000), "K")
    } else {
        (abs, "")
    };

    format!("{}${}{}", sign, scaled.round_dp(2).normalize(), suffix)
}

/// Renders a fraction as a percentage with two decimals: `0.0342` -> `3.42%`.
pub fn format_percentage(fraction: Decimal) -> String {
    format!("{:.2}%", fraction * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_parse_currency_suffixes() {
        assert_eq!(parse_currency("$125.5M").unwrap(), dec!(125500000));
        assert_eq!(parse_currency("$800K").unwrap(), dec!(800000));
        assert_eq!(parse_currency("$1.24B").unwrap(), dec!(1240000000));
        assert_eq!(parse_currency("$100,000").unwrap(), dec!(100000));
        assert_eq!(parse_currency("950").unwrap(), dec!(950));
        assert_eq!(parse_currency("-$1.2m").unwrap(), dec!(-1200000));
    }

    #[test]
    fn test_parse_currency_rejects_garbage() {
        assert!(matches!(parse_currency("abc"), Err(FormatError::InvalidCurrency { .. })));
        assert!(parse_currency("$").is_err());
        assert!(parse_currency("$12Q").is_err());
        assert!(parse_currency("").is_err());
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("4.85%").unwrap(), dec!(0.0485));
        assert_eq!(parse_percentage("85%").unwrap(), dec!(0.85));
        assert_eq!(parse_percentage(" 0.15 % ").unwrap(), dec!(0.0015));
        assert!(matches!(parse_percentage("n/a"), Err(FormatError::InvalidPercentage { .. })));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(dec!(2500000)), "$2.5M");
        assert_eq!(format_currency(dec!(800000)), "$800K");
        assert_eq!(format_currency(dec!(1240000000)), "$1.24B");
        assert_eq!(format_currency(dec!(950)), "$950");
        assert_eq!(format_currency(dec!(-1200000)), "-$1.2M");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(dec!(0.0342)), "3.42%");
        assert_eq!(format_percentage(dec!(0.00666666)), "0.67%");
    }
}
