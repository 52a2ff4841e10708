use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Shift lifecycle: `open` until the drawer is counted, then `closed`.
/// Closed is terminal for a shift instance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Open,
    Closed,
}

/// Derived purchase status. `cancelled` is terminal; the rest follow the
/// paid amount against the total.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Partial,
    Paid,
    Cancelled,
}

impl PurchaseStatus {
    /// Whether the purchase can still receive payments.
    pub fn accepts_payments(self) -> bool {
        matches!(self, PurchaseStatus::Pending | PurchaseStatus::Partial)
    }
}

/// How a purchase is settled: cash purchases are paid on the spot, credit
/// purchases accrue to the supplier's running balance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PurchasePaymentType {
    Cash,
    Credit,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

/// Direction of an inventory movement. `quantity` on the movement row is
/// signed; `out` movements carry negative quantities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

/// Sale and appointment line items reference either a catalog service or a
/// stocked product; only product lines touch inventory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SaleItemKind {
    Service,
    Product,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn statuses_round_trip_through_strings() {
        assert_eq!(ShiftStatus::Open.to_string(), "open");
        assert_eq!(ShiftStatus::from_str("closed").unwrap(), ShiftStatus::Closed);
        assert_eq!(PurchaseStatus::from_str("partial").unwrap(), PurchaseStatus::Partial);
        assert_eq!(MovementType::Adjustment.to_string(), "adjustment");
    }

    #[test]
    fn terminal_purchase_statuses_reject_payments() {
        assert!(PurchaseStatus::Pending.accepts_payments());
        assert!(PurchaseStatus::Partial.accepts_payments());
        assert!(!PurchaseStatus::Paid.accepts_payments());
        assert!(!PurchaseStatus::Cancelled.accepts_payments());
    }
}
