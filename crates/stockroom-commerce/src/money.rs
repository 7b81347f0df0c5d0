//! Money type for representing prices.
//!
//! Amounts are integers in the smallest unit of the display currency
//! (cents for USD, dong for VND). The currency itself is a deployment
//! setting and is not stored with each amount.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};
use std::str::FromStr;

/// Supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    JPY,
    VND,
}

impl Currency {
    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::VND => "VND",
        }
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::VND => "\u{20ab}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY | Currency::VND => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "VND" => Some(Currency::VND),
            _ => None,
        }
    }

    /// Parse a decimal amount as typed into a form (e.g., "49.99").
    ///
    /// Returns `None` for empty, non-numeric or non-finite input.
    pub fn parse_amount(&self, input: &str) -> Option<Money> {
        let amount: f64 = input.trim().parse().ok()?;
        if !amount.is_finite() {
            return None;
        }
        let multiplier = 10_i64.pow(self.decimal_places());
        Some(Money::new((amount * multiplier as f64).round() as i64))
    }

    /// Format an amount in this currency (e.g., "$49.99", "120000\u{20ab}").
    pub fn format(&self, money: Money) -> String {
        let amount = self.format_plain(money);
        match self {
            Currency::VND => format!("{}{}", amount, self.symbol()),
            _ => format!("{}{}", self.symbol(), amount),
        }
    }

    /// Format an amount without a symbol, as a form field value.
    pub fn format_plain(&self, money: Money) -> String {
        let places = self.decimal_places() as usize;
        let divisor = 10_i64.pow(self.decimal_places());
        format!("{:.places$}", money.amount_minor as f64 / divisor as f64)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| format!("unsupported currency '{}'", s))
    }
}

/// An amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_minor: i64,
}

impl Money {
    /// Create a new Money value from minor units.
    pub const fn new(amount_minor: i64) -> Self {
        Self { amount_minor }
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Multiply by a quantity.
    pub fn times(&self, quantity: i64) -> Money {
        Money::new(self.amount_minor.saturating_mul(quantity))
    }

    /// Amount in minor units as a float, for range filters.
    pub fn as_f64(&self) -> f64 {
        self.amount_minor as f64
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(self.amount_minor.saturating_add(other.amount_minor))
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        self.times(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}
