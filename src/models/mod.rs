//! Application-layer domain types shared by services and handlers.
//!
//! Database entities store statuses and payment methods as plain strings;
//! everything above the storage boundary goes through the typed values in
//! this module.

pub mod method_totals;
pub mod payment_method;
pub mod payment_reference;
pub mod status;

pub use method_totals::MethodTotals;
pub use payment_method::PaymentMethod;
pub use payment_reference::{PaymentReference, PaymentReferenceKind};
pub use status::{
    AppointmentStatus, MovementType, PurchasePaymentType, PurchaseStatus, SaleItemKind,
    ShiftStatus,
};
