use serde::Deserialize;

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{AddAssign, Mul},
    str::FromStr,
};

/// Represents an amount of money.
///
/// The amount is stored as an `f64`, but the [`Display`] implementation
/// formats it to 2 decimal places.
#[derive(Clone, Copy, Default, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct Money(f64);

impl Money {
    #[must_use]
    pub fn new(amount: f64) -> Self {
        Self(amount)
    }

    #[must_use]
    pub fn amount(self) -> f64 {
        self.0
    }

    /// Reports whether this is a usable unit price: finite and not negative.
    #[must_use]
    pub fn is_valid_price(self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

impl Debug for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().replace(',', "").parse()?))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<f64> for Money {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, m| {
            acc += m;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rounds_to_two_places() {
        assert_eq!(Money::new(35.0).to_string(), "35.00");
        assert_eq!(Money::new(2.005_1).to_string(), "2.01");
        assert_eq!(Money::default().to_string(), "0.00");
    }

    #[test]
    fn from_str_accepts_thousands_separators() {
        assert_eq!(Money::from_str("3,409.15").unwrap(), Money::new(3409.15));
        assert_eq!(Money::from_str(" 12.5 ").unwrap(), Money::new(12.5));
        assert!(Money::from_str("twelve").is_err());
    }

    #[test]
    fn negative_and_non_finite_amounts_are_not_valid_prices() {
        assert!(Money::new(0.0).is_valid_price());
        assert!(!Money::new(-1.0).is_valid_price());
        assert!(!Money::new(f64::NAN).is_valid_price());
        assert!(!Money::new(f64::INFINITY).is_valid_price());
    }

    #[test]
    fn sum_adds_all_amounts() {
        let total: Money = [Money::new(30.0), Money::new(5.0)].into_iter().sum();
        assert_eq!(total, Money::new(35.0));
    }
}
