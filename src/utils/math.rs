use rust_decimal::Decimal;

use crate::error::ValidationError;

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

/// Sum with every addition checked. Terms are added in a canonical order, so
/// the result is the same for any permutation of the input even when a partial
/// sum has to round.
pub fn checked_sum<I>(values: I, operation: &'static str) -> Result<Decimal, ValidationError>
where
    I: IntoIterator<Item = Decimal>,
{
    let mut terms: Vec<Decimal> = values.into_iter().collect();
    terms.sort_unstable_by(|a, b| a.cmp(b).then_with(|| a.scale().cmp(&b.scale())));
    terms
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, term| sum.checked_add(term))
        .ok_or(ValidationError::ArithmeticOverflow { operation })
}

/// Arithmetic mean; `Ok(None)` for an empty series.
pub fn mean<I>(values: I) -> Result<Option<Decimal>, ValidationError>
where
    I: IntoIterator<Item = Decimal>,
{
    let values: Vec<Decimal> = values.into_iter().collect();
    let count = Decimal::from(values.len());
    let sum = checked_sum(values, "mean")?;
    Ok(safe_div(sum, count))
}

/// Weighted average of `(value, weight)` pairs; `Ok(None)` when the weights sum to zero.
pub fn weighted_average<I>(pairs: I) -> Result<Option<Decimal>, ValidationError>
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    let mut products = Vec::new();
    let mut weights = Vec::new();
    for (value, weight) in pairs {
        let product = value
            .checked_mul(weight)
            .ok_or(ValidationError::ArithmeticOverflow { operation: "weighted average" })?;
        products.push(product);
        weights.push(weight);
    }
    let weighted_sum = checked_sum(products, "weighted average")?;
    let total_weight = checked_sum(weights, "weighted average")?;
    Ok(safe_div(weighted_sum, total_weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(dec!(1), dec!(4)), Some(dec!(0.25)));
        assert_eq!(safe_div(dec!(1), Decimal::ZERO), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(vec![dec!(2.45), dec!(1.89)]), Ok(Some(dec!(2.17))));
        assert_eq!(mean(Vec::new()), Ok(None));
    }

    #[test]
    fn test_weighted_average() {
        let avg = weighted_average(vec![(dec!(0.05), dec!(100)), (dec!(0.08), dec!(50))]);
        assert_eq!(avg, Ok(Some(dec!(0.06))));
        assert_eq!(weighted_average(vec![(dec!(0.05), Decimal::ZERO)]), Ok(None));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(
            checked_sum(vec![Decimal::MAX, Decimal::MAX], "total"),
            Err(ValidationError::ArithmeticOverflow { operation: "total" })
        );
        assert_eq!(
            weighted_average(vec![(Decimal::MAX, dec!(2))]),
            Err(ValidationError::ArithmeticOverflow { operation: "weighted average" })
        );
    }

    #[test]
    fn test_checked_sum_ignores_term_order_when_rounding() {
        let big = dec!(9000000000000000000000000001);
        let forward = checked_sum(vec![big, dec!(0.4), dec!(0.4)], "total").unwrap();
        let backward = checked_sum(vec![dec!(0.4), dec!(0.4), big], "total").unwrap();
        assert_eq!(forward.serialize(), backward.serialize());
    }
}
