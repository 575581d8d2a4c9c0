//! Currency to unit conversion

use super::round2;
use rust_decimal::Decimal;

/// Express a monetary amount as a number of units.
///
/// Returns zero when the unit value is absent or zero.
pub fn to_units(value: Decimal, unit_value: Option<Decimal>) -> Decimal {
    match unit_value {
        Some(unit) if !unit.is_zero() => round2(value / unit),
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_units_divides_and_rounds() {
        assert_eq!(to_units(dec!(75), Some(dec!(10))), dec!(7.5));
        assert_eq!(to_units(dec!(10), Some(dec!(3))), dec!(3.33));
        assert_eq!(to_units(dec!(20), Some(dec!(3))), dec!(6.67));
        assert_eq!(to_units(dec!(-50), Some(dec!(20))), dec!(-2.5));
    }

    #[test]
    fn test_to_units_zero_guard() {
        assert_eq!(to_units(dec!(75), Some(Decimal::ZERO)), Decimal::ZERO);
        assert_eq!(to_units(dec!(75), None), Decimal::ZERO);
    }
}
