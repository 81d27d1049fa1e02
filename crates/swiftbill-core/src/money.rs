//! # Money Module
//!
//! Provides the `Money` type for invoice amounts held in paise.
//!
//! ## Paise In, Rupees Out
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE CONVERSIONS HAPPEN                                               │
//! │                                                                         │
//! │  invoices.total_amount (REAL, rupees) ──┐                              │
//! │  items.unit_price     (REAL, rupees) ──┼──► Money::from_rupees ──► i64 │
//! │  items_json "unit_price": 100          ──┘         (paise)              │
//! │                                                                         │
//! │  All line, tax and total arithmetic runs on i64 paise.                 │
//! │                                                                         │
//! │  i64 paise ──► Money::to_rupees ──► REAL column / JSON number           │
//! │                                                                         │
//! │  Floats only ever appear at the storage edge, never in a sum.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use swiftbill_core::money::Money;
//!
//! let price = Money::from_paise(10_000); // ₹100.00
//! let line = price.multiply_milli(2_000); // qty 2
//! assert_eq!(line.paise(), 20_000);
//! assert_eq!(line.to_string(), "₹200.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Where Money is Used
/// ```text
/// Item.unit_price ──► LineItem.unit_price × quantity ──► LineItem.amount
///                                                            │
///                          Σ amounts = base_amount ◄─────────┘
///                                │
///             ┌──────────────────┼──────────────────┐
///             ▼                  ▼                  ▼
///       cgst (base × %)    sgst (base × %)    total = base + cgst + sgst
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use swiftbill_core::money::Money;
    ///
    /// let price = Money::from_paise(1099); // ₹10.99
    /// assert_eq!(price.paise(), 1099);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_whole_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Converts a stored rupee amount (REAL column or JSON number) to paise,
    /// rounding to the nearest paisa.
    ///
    /// Non-finite input (NaN, ±∞) maps to zero.
    ///
    /// ## Example
    /// ```rust
    /// use swiftbill_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(236.0).paise(), 23_600);
    /// assert_eq!(Money::from_rupees(0.1 + 0.2).paise(), 30);
    /// ```
    pub fn from_rupees(rupees: f64) -> Self {
        if !rupees.is_finite() {
            return Money::zero();
        }
        Money((rupees * 100.0).round() as i64)
    }

    /// Returns the amount in rupees for storage in REAL columns and JSON.
    #[inline]
    pub fn to_rupees(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates a GST component (CGST or SGST) on this amount.
    ///
    /// ## Implementation
    /// Integer math on basis points: `(paise * bps + 5000) / 10000`, with
    /// the `+5000` rounding half a paisa up. Computed in i128 so very large
    /// invoices cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use swiftbill_core::money::Money;
    /// use swiftbill_core::types::TaxRate;
    ///
    /// let base = Money::from_whole_rupees(200);
    /// let cgst = base.calculate_tax(TaxRate::from_percentage(9.0));
    /// assert_eq!(cgst, Money::from_whole_rupees(18));
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000).div_euclid(10000);
        Money::from_paise(tax as i64)
    }

    /// Multiplies by a quantity expressed in thousandths (2.5 units = 2500),
    /// rounding to the nearest paisa.
    ///
    /// Line items accept fractional quantities (kilograms, metres); keeping
    /// them in thousandths keeps the multiplication in integers.
    ///
    /// ## Example
    /// ```rust
    /// use swiftbill_core::money::Money;
    ///
    /// let per_kg = Money::from_paise(4_999);
    /// assert_eq!(per_kg.multiply_milli(2_500).paise(), 12_498); // 124.975 → 124.98
    /// ```
    pub fn multiply_milli(&self, qty_milli: i64) -> Self {
        let scaled = (self.0 as i128 * qty_milli as i128 + 500).div_euclid(1000);
        Money(scaled as i64)
    }

    /// Divides by a count, rounding to the nearest paisa.
    ///
    /// Returns zero when `count` is zero, which is what the dashboard average
    /// shows for an empty invoice list.
    pub fn divide_rounded(&self, count: i64) -> Self {
        if count == 0 {
            return Money::zero();
        }
        let numerator = self.0 as i128 * 2 + count as i128;
        let result = numerator.div_euclid(count as i128 * 2);
        Money(result as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as rupees with two decimals, e.g. `₹236.00`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Rupee Serde Adapter
// =============================================================================

/// Serializes `Money` as a decimal rupee number.
///
/// Line items inside `items_json` carry amounts as plain rupee numbers
/// (`"unit_price": 100`), so blobs written by earlier builds keep decoding.
///
/// ```rust,ignore
/// #[serde(with = "crate::money::rupees")]
/// pub unit_price: Money,
/// ```
pub mod rupees {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_rupees())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rupees = f64::deserialize(deserializer)?;
        Ok(Money::from_rupees(rupees))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(23_600).to_string(), "₹236.00");
        assert_eq!(Money::from_paise(5).to_string(), "₹0.05");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
    }

    #[test]
    fn test_rupee_conversion_rounds_to_nearest_paisa() {
        assert_eq!(Money::from_rupees(18.0).paise(), 1800);
        assert_eq!(Money::from_rupees(10.994).paise(), 1099);
        assert_eq!(Money::from_rupees(10.996).paise(), 1100);
        assert_eq!(Money::from_rupees(f64::NAN), Money::zero());
        assert!((Money::from_paise(23_600).to_rupees() - 236.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gst_component() {
        let base = Money::from_whole_rupees(200);
        assert_eq!(base.calculate_tax(TaxRate::from_percentage(9.0)).paise(), 1800);

        // ₹10.05 at 9% = 90.45 paise → 90
        let odd = Money::from_paise(1005);
        assert_eq!(odd.calculate_tax(TaxRate::from_bps(900)).paise(), 90);

        // ₹10.50 at 2.5% = 26.25 paise → 26
        let quarter = Money::from_paise(1050);
        assert_eq!(quarter.calculate_tax(TaxRate::from_bps(250)).paise(), 26);
    }

    #[test]
    fn test_fractional_quantity() {
        let price = Money::from_whole_rupees(100);
        assert_eq!(price.multiply_milli(1_500).paise(), 15_000);
        assert_eq!(price.multiply_milli(1_000), price);
        assert_eq!(Money::from_paise(333).multiply_milli(333).paise(), 111);
    }

    #[test]
    fn test_divide_rounded() {
        assert_eq!(Money::from_whole_rupees(600).divide_rounded(3), Money::from_whole_rupees(200));
        assert_eq!(Money::from_paise(1000).divide_rounded(3).paise(), 333);
        assert_eq!(Money::from_paise(500).divide_rounded(3).paise(), 167);
        assert_eq!(Money::from_paise(500).divide_rounded(0), Money::zero());
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_paise(100), Money::from_paise(250)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.paise(), 350);
    }

    #[test]
    fn test_rupee_serde_adapter() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "rupees")]
            amount: Money,
        }

        let json = serde_json::to_string(&Wrapper { amount: Money::from_paise(23_650) }).unwrap();
        assert_eq!(json, r#"{"amount":236.5}"#);

        let back: Wrapper = serde_json::from_str(r#"{"amount":100}"#).unwrap();
        assert_eq!(back.amount.paise(), 10_000);
    }
}
