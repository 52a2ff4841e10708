use serde::{Deserialize, Serialize};
use std::fmt;

/// A payment method key such as `cash`, `card` or `transfer`.
///
/// The set is open: branches may record other methods (vouchers, gift
/// cards), so this is a normalized string key rather than a closed enum.
/// Cash is special-cased in the cash-cut computation because it is the only
/// method backed by a physical drawer count.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    pub const CASH: &'static str = "cash";
    pub const CARD: &'static str = "card";
    pub const TRANSFER: &'static str = "transfer";

    /// Methods always present in a cash cut, even with zero activity.
    pub const FIXED: [&'static str; 3] = [Self::CASH, Self::CARD, Self::TRANSFER];

    pub fn new(raw: impl AsRef<str>) -> Self {
        PaymentMethod(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn cash() -> Self {
        PaymentMethod(Self::CASH.to_string())
    }

    pub fn card() -> Self {
        PaymentMethod(Self::CARD.to_string())
    }

    pub fn transfer() -> Self {
        PaymentMethod(Self::TRANSFER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_cash(&self) -> bool {
        self.0 == Self::CASH
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaymentMethod {
    fn from(raw: &str) -> Self {
        PaymentMethod::new(raw)
    }
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        PaymentMethod::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(PaymentMethod::new(" Cash "), PaymentMethod::cash());
        assert_eq!(PaymentMethod::new("CARD").as_str(), "card");
    }

    #[test]
    fn open_set_keys_survive() {
        let voucher = PaymentMethod::new("voucher");
        assert_eq!(voucher.as_str(), "voucher");
        assert!(!voucher.is_cash());
    }
}
