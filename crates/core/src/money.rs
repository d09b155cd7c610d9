use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A currency amount in reais. The wrapped value is kept unrounded for
/// display; comparisons go through [`Money::rounded`] (2 decimal places).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn amount(self) -> Decimal {
        self.0
    }

    /// The 2-dp value used wherever two amounts are compared.
    pub fn rounded(self) -> Decimal {
        self.0.round_dp(2)
    }

    /// Parse a pt-BR formatted amount: optional `R$` prefix, `.` as the
    /// thousands separator, `,` as the decimal separator.
    pub fn parse_brl(s: &str) -> Option<Money> {
        let s = s.trim();
        let s = s.strip_prefix("R$").unwrap_or(s).trim_start();
        let clean = s.replace('.', "").replace(',', ".");
        Decimal::from_str(&clean).ok().map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_brl_plain() {
        assert_eq!(Money::parse_brl("123,45").unwrap().rounded(), Decimal::new(12345, 2));
    }

    #[test]
    fn parse_brl_with_prefix() {
        assert_eq!(Money::parse_brl("R$ 99,99").unwrap().rounded(), Decimal::new(9999, 2));
    }

    #[test]
    fn parse_brl_thousands() {
        assert_eq!(
            Money::parse_brl("1.234,56").unwrap().rounded(),
            Decimal::new(123456, 2)
        );
    }

    #[test]
    fn parse_brl_whole_number() {
        assert_eq!(Money::parse_brl("100").unwrap().rounded(), Decimal::from(100));
    }

    #[test]
    fn parse_brl_invalid() {
        assert!(Money::parse_brl("abc").is_none());
        assert!(Money::parse_brl("").is_none());
    }

    #[test]
    fn rounded_comparison_equates_formats() {
        let a = Money::parse_brl("1.234,5600").unwrap();
        let b = Money::parse_brl("1.234,56").unwrap();
        assert_eq!(a.rounded(), b.rounded());
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(Money::parse_brl("5,5").unwrap().to_string(), "R$ 5.50");
    }
}
