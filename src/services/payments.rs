//! Shared payment-row primitive.
//!
//! Every payment in the system settles exactly one sale, appointment or
//! purchase; the typed [`PaymentReference`] union picks the target, and the
//! row stores its `(reference_type, reference_id)` form. Runs inside the
//! caller's transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, Set};
use uuid::Uuid;

use crate::entities::payment;
use crate::errors::ServiceError;
use crate::models::{PaymentMethod, PaymentReference};

/// Inserts one payment row against the referenced record.
pub async fn record_payment(
    txn: &DatabaseTransaction,
    reference: PaymentReference,
    method: &PaymentMethod,
    amount: Decimal,
    external_reference: Option<String>,
    user_id: Option<Uuid>,
) -> Result<payment::Model, ServiceError> {
    let created = payment::ActiveModel {
        id: Set(Uuid::new_v4()),
        reference_type: Set(reference.kind().to_string()),
        reference_id: Set(reference.id()),
        method: Set(method.to_string()),
        amount: Set(amount),
        reference: Set(external_reference),
        created_by: Set(user_id),
        created_at: Set(Utc::now()),
    }
    .insert(txn)
    .await?;
    Ok(created)
}
