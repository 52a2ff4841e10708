use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::PaymentMethod;

/// A per-payment-method map of monetary totals.
///
/// This is the in-memory form of the JSON columns on `cash_cuts`
/// (`sales_by_method`, `expected_by_method`, ...). Amounts are `Decimal`
/// end to end; serde serializes them as decimal strings, so persisting a
/// map and reading it back never loses precision. Serialization happens
/// only at the storage/HTTP boundary via [`MethodTotals::to_json`] and
/// [`MethodTotals::from_json`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodTotals(BTreeMap<PaymentMethod, Decimal>);

impl MethodTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total for a method, zero when the method has no entry.
    pub fn get(&self, method: &PaymentMethod) -> Decimal {
        self.0.get(method).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn set(&mut self, method: PaymentMethod, amount: Decimal) {
        self.0.insert(method, amount);
    }

    /// Adds `amount` into the method's bucket.
    pub fn add(&mut self, method: PaymentMethod, amount: Decimal) {
        *self.0.entry(method).or_insert(Decimal::ZERO) += amount;
    }

    /// Sums another map into this one, bucket by bucket.
    pub fn merge(&mut self, other: &MethodTotals) {
        for (method, amount) in &other.0 {
            self.add(method.clone(), *amount);
        }
    }

    /// Sum across all methods.
    pub fn grand_total(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    pub fn methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PaymentMethod, &Decimal)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, method: &PaymentMethod) -> bool {
        self.0.contains_key(method)
    }

    /// Collects `(method, amount)` rows, summing duplicates.
    pub fn from_rows<I, M>(rows: I) -> Self
    where
        I: IntoIterator<Item = (M, Decimal)>,
        M: Into<PaymentMethod>,
    {
        let mut totals = Self::new();
        for (method, amount) in rows {
            totals.add(method.into(), amount);
        }
        totals
    }

    /// Serializes for a JSON column. Decimals become strings.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }

    /// Parses a JSON column value. Accepts both string- and number-encoded
    /// amounts so rows written by older backends still load.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}

impl FromIterator<(PaymentMethod, Decimal)> for MethodTotals {
    fn from_iter<I: IntoIterator<Item = (PaymentMethod, Decimal)>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_methods_default_to_zero() {
        let totals = MethodTotals::new();
        assert_eq!(totals.get(&PaymentMethod::cash()), Decimal::ZERO);
    }

    #[test]
    fn merge_sums_buckets() {
        let mut a = MethodTotals::from_rows([("cash", dec!(200)), ("card", dec!(150))]);
        let b = MethodTotals::from_rows([("cash", dec!(50.25))]);
        a.merge(&b);
        assert_eq!(a.get(&PaymentMethod::cash()), dec!(250.25));
        assert_eq!(a.get(&PaymentMethod::card()), dec!(150));
        assert_eq!(a.grand_total(), dec!(400.25));
    }

    #[test]
    fn json_round_trip_preserves_decimals() {
        let totals = MethodTotals::from_rows([("cash", dec!(650.10)), ("transfer", dec!(0.01))]);
        let json = totals.to_json();
        let back = MethodTotals::from_json(&json).unwrap();
        assert_eq!(back, totals);
    }

    #[test]
    fn accepts_number_encoded_amounts() {
        let json = serde_json::json!({"cash": 123.45, "card": "10.00"});
        let totals = MethodTotals::from_json(&json).unwrap();
        assert_eq!(totals.get(&PaymentMethod::cash()), dec!(123.45));
        assert_eq!(totals.get(&PaymentMethod::card()), dec!(10.00));
    }
}
