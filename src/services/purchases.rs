//! Purchase payment/balance ledger.
//!
//! A purchase carries `total`, `paid_amount` and `balance` as explicit
//! columns maintained inside the same transaction as every triggering
//! event, keeping `paid_amount + balance == total` without recomputing
//! from history. Credit purchases feed the supplier's running balance.
//! Cancel and delete share one reversal routine so the two paths cannot
//! drift apart.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{payment, purchase, purchase_line, supplier};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    PaymentMethod, PaymentReference, PaymentReferenceKind, PurchasePaymentType, PurchaseStatus,
};
use crate::services::inventory::{self, record_lines, StockDirection, StockLine};
use crate::services::payments::record_payment;

/// One product line on a new purchase.
#[derive(Debug, Clone)]
pub struct NewPurchaseLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
}

/// One payment recorded with a new purchase or added later.
#[derive(Debug, Clone)]
pub struct NewPurchasePayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePurchase {
    pub date: NaiveDate,
    pub supplier_id: Option<Uuid>,
    pub lines: Vec<NewPurchaseLine>,
    pub payments: Vec<NewPurchasePayment>,
    pub payment_type: PurchasePaymentType,
    pub due_date: Option<NaiveDate>,
    /// Caller-supplied; not recomputed from lines.
    pub total: Decimal,
    pub notes: Option<String>,
}

/// Filters for listing purchases.
#[derive(Debug, Clone, Default)]
pub struct PurchaseFilter {
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PurchaseStatus>,
    pub supplier_id: Option<Uuid>,
}

/// A purchase with its lines and payments attached.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: purchase::Model,
    pub lines: Vec<purchase_line::Model>,
    pub payments: Vec<payment::Model>,
}

#[derive(Clone)]
pub struct PurchaseService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl PurchaseService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records a purchase with its lines and any up-front payments, all in
    /// one transaction: purchase row, line rows, stock intake plus `in`
    /// movements, payment rows, and the supplier balance increment for
    /// credit purchases.
    #[instrument(skip(self, input))]
    pub async fn create_purchase(
        &self,
        branch_id: Uuid,
        account_id: Uuid,
        user_id: Uuid,
        input: CreatePurchase,
    ) -> Result<purchase::Model, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::Validation(
                "a purchase needs at least one line".to_string(),
            ));
        }
        if input.total < Decimal::ZERO {
            return Err(ServiceError::Validation(
                "purchase total cannot be negative".to_string(),
            ));
        }
        for p in &input.payments {
            if p.amount <= Decimal::ZERO {
                return Err(ServiceError::Validation(
                    "payment amounts must be positive".to_string(),
                ));
            }
        }

        let paid_amount: Decimal = input.payments.iter().map(|p| p.amount).sum();
        let balance = input.total - paid_amount;
        let status = derive_status(input.payment_type, paid_amount, input.total);

        let purchase_id = Uuid::new_v4();
        let total = input.total;
        let supplier_id = input.supplier_id;
        let payment_type = input.payment_type;

        let created = self
            .db
            .transaction::<_, purchase::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    if let Some(supplier_id) = supplier_id {
                        supplier::Entity::find_by_id(supplier_id)
                            .filter(supplier::Column::AccountId.eq(account_id))
                            .one(txn)
                            .await?
                            .ok_or_else(|| ServiceError::not_found("supplier", supplier_id))?;
                    }

                    let created = purchase::ActiveModel {
                        id: Set(purchase_id),
                        branch_id: Set(branch_id),
                        supplier_id: Set(supplier_id),
                        date: Set(input.date),
                        total: Set(total),
                        payment_type: Set(payment_type.to_string()),
                        status: Set(status.to_string()),
                        paid_amount: Set(paid_amount),
                        balance: Set(balance),
                        due_date: Set(input.due_date),
                        notes: Set(input.notes.clone()),
                        created_by: Set(user_id),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await?;

                    let stock_lines: Vec<StockLine> = input
                        .lines
                        .iter()
                        .map(|line| StockLine {
                            product_id: line.product_id,
                            quantity: line.quantity,
                            unit_cost: Some(line.unit_cost),
                        })
                        .collect();
                    record_lines(
                        txn,
                        branch_id,
                        Some(user_id),
                        inventory::reasons::PURCHASE,
                        StockDirection::StockIn,
                        &stock_lines,
                    )
                    .await?;

                    for line in &input.lines {
                        purchase_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            purchase_id: Set(purchase_id),
                            product_id: Set(line.product_id),
                            quantity: Set(line.quantity),
                            unit_cost: Set(line.unit_cost),
                            subtotal: Set(line.subtotal),
                        }
                        .insert(txn)
                        .await?;
                    }

                    for p in &input.payments {
                        insert_purchase_payment(txn, purchase_id, p, user_id).await?;
                    }

                    if payment_type == PurchasePaymentType::Credit {
                        if let Some(supplier_id) = supplier_id {
                            if !balance.is_zero() {
                                adjust_supplier_balance(txn, supplier_id, balance).await?;
                            }
                        }
                    }

                    Ok(created)
                })
            })
            .await?;

        self.event_sender
            .send(Event::PurchaseCreated {
                purchase_id: created.id,
                supplier_id: created.supplier_id,
                total: created.total,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    /// Adds a partial payment to a pending or partially-paid purchase.
    ///
    /// The balance floors at zero: over-payment is accepted and the excess
    /// is not tracked. The supplier balance is decremented by the actual
    /// balance delta (equal to `amount` except when flooring), so the
    /// supplier's running total cannot drift under over-payment.
    #[instrument(skip(self))]
    pub async fn add_payment(
        &self,
        purchase_id: Uuid,
        branch_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> Result<purchase::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "payment amount must be positive".to_string(),
            ));
        }

        let updated = self
            .db
            .transaction::<_, purchase::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = purchase::Entity::find_by_id(purchase_id)
                        .filter(purchase::Column::BranchId.eq(branch_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("purchase", purchase_id))?;

                    let status = parse_status(&existing)?;
                    if !status.accepts_payments() {
                        return Err(ServiceError::InvalidState(format!(
                            "cannot add a payment to a {} purchase",
                            status
                        )));
                    }

                    let new_paid = existing.paid_amount + amount;
                    let new_balance = (existing.total - new_paid).max(Decimal::ZERO);
                    let new_status = if new_balance.is_zero() {
                        PurchaseStatus::Paid
                    } else {
                        PurchaseStatus::Partial
                    };
                    let balance_delta = existing.balance - new_balance;

                    let supplier_id = existing.supplier_id;
                    let payment_type: PurchasePaymentType =
                        existing.payment_type.parse().map_err(|_| {
                            ServiceError::InvalidState(format!(
                                "unknown purchase payment type {}",
                                existing.payment_type
                            ))
                        })?;

                    insert_purchase_payment(
                        txn,
                        purchase_id,
                        &NewPurchasePayment {
                            amount,
                            method,
                            reference,
                        },
                        user_id,
                    )
                    .await?;

                    let mut active: purchase::ActiveModel = existing.into();
                    active.paid_amount = Set(new_paid);
                    active.balance = Set(new_balance);
                    active.status = Set(new_status.to_string());
                    let updated = active.update(txn).await?;

                    if payment_type == PurchasePaymentType::Credit {
                        if let Some(supplier_id) = supplier_id {
                            if !balance_delta.is_zero() {
                                adjust_supplier_balance(txn, supplier_id, -balance_delta).await?;
                            }
                        }
                    }

                    Ok(updated)
                })
            })
            .await?;

        self.event_sender
            .send(Event::PurchasePaymentAdded {
                purchase_id,
                amount,
                new_balance: updated.balance,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(updated)
    }

    /// Cancels a purchase: reverses its stock and supplier effects and
    /// marks it cancelled. Terminal; further payments are rejected.
    #[instrument(skip(self))]
    pub async fn cancel_purchase(
        &self,
        purchase_id: Uuid,
        branch_id: Uuid,
        user_id: Uuid,
    ) -> Result<purchase::Model, ServiceError> {
        let cancelled = self
            .db
            .transaction::<_, purchase::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = purchase::Entity::find_by_id(purchase_id)
                        .filter(purchase::Column::BranchId.eq(branch_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("purchase", purchase_id))?;

                    if parse_status(&existing)? == PurchaseStatus::Cancelled {
                        return Err(ServiceError::InvalidState(
                            "purchase is already cancelled".to_string(),
                        ));
                    }

                    reverse_purchase(txn, &existing, user_id).await?;

                    let marker = format!("[cancelled {}]", Utc::now().date_naive());
                    let notes = match &existing.notes {
                        Some(notes) => format!("{} {}", notes, marker),
                        None => marker,
                    };

                    let mut active: purchase::ActiveModel = existing.into();
                    active.status = Set(PurchaseStatus::Cancelled.to_string());
                    active.notes = Set(Some(notes));
                    Ok(active.update(txn).await?)
                })
            })
            .await?;

        self.event_sender
            .send(Event::PurchaseCancelled(purchase_id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(cancelled)
    }

    /// Hard-deletes a purchase and its lines and payments. Applies the same
    /// reversal as cancellation first, unless the purchase was already
    /// cancelled (its effects are already unwound).
    #[instrument(skip(self))]
    pub async fn delete_purchase(
        &self,
        purchase_id: Uuid,
        branch_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = purchase::Entity::find_by_id(purchase_id)
                        .filter(purchase::Column::BranchId.eq(branch_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("purchase", purchase_id))?;

                    if parse_status(&existing)? != PurchaseStatus::Cancelled {
                        reverse_purchase(txn, &existing, user_id).await?;
                    }

                    payment::Entity::delete_many()
                        .filter(
                            payment::Column::ReferenceType
                                .eq(PaymentReferenceKind::Purchase.to_string()),
                        )
                        .filter(payment::Column::ReferenceId.eq(purchase_id))
                        .exec(txn)
                        .await?;
                    purchase_line::Entity::delete_many()
                        .filter(purchase_line::Column::PurchaseId.eq(purchase_id))
                        .exec(txn)
                        .await?;
                    purchase::Entity::delete_by_id(purchase_id).exec(txn).await?;

                    Ok(())
                })
            })
            .await?;

        self.event_sender
            .send(Event::PurchaseDeleted(purchase_id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(())
    }

    /// A purchase with its lines and payments.
    #[instrument(skip(self))]
    pub async fn get_purchase(
        &self,
        purchase_id: Uuid,
        branch_id: Uuid,
    ) -> Result<PurchaseDetail, ServiceError> {
        let purchase = purchase::Entity::find_by_id(purchase_id)
            .filter(purchase::Column::BranchId.eq(branch_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("purchase", purchase_id))?;

        let lines = purchase_line::Entity::find()
            .filter(purchase_line::Column::PurchaseId.eq(purchase_id))
            .all(&*self.db)
            .await?;
        let payments = payment::Entity::find()
            .filter(payment::Column::ReferenceType.eq(PaymentReferenceKind::Purchase.to_string()))
            .filter(payment::Column::ReferenceId.eq(purchase_id))
            .all(&*self.db)
            .await?;

        Ok(PurchaseDetail {
            purchase,
            lines,
            payments,
        })
    }

    /// Lists a branch's purchases with lines and payments attached, newest
    /// first.
    #[instrument(skip(self))]
    pub async fn list_purchases(
        &self,
        branch_id: Uuid,
        filter: PurchaseFilter,
    ) -> Result<Vec<PurchaseDetail>, ServiceError> {
        let mut query = purchase::Entity::find().filter(purchase::Column::BranchId.eq(branch_id));

        if let Some(date) = filter.date {
            query = query.filter(purchase::Column::Date.eq(date));
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            query = query.filter(purchase::Column::Date.between(start, end));
        }
        if let Some(status) = filter.status {
            query = query.filter(purchase::Column::Status.eq(status.to_string()));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(purchase::Column::SupplierId.eq(supplier_id));
        }

        let purchases = query
            .order_by_desc(purchase::Column::Date)
            .order_by_desc(purchase::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        if purchases.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = purchases.iter().map(|p| p.id).collect();

        let mut lines_by_purchase: HashMap<Uuid, Vec<purchase_line::Model>> = HashMap::new();
        for line in purchase_line::Entity::find()
            .filter(purchase_line::Column::PurchaseId.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
        {
            lines_by_purchase.entry(line.purchase_id).or_default().push(line);
        }

        let mut payments_by_purchase: HashMap<Uuid, Vec<payment::Model>> = HashMap::new();
        for p in payment::Entity::find()
            .filter(payment::Column::ReferenceType.eq(PaymentReferenceKind::Purchase.to_string()))
            .filter(payment::Column::ReferenceId.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
        {
            payments_by_purchase.entry(p.reference_id).or_default().push(p);
        }

        Ok(purchases
            .into_iter()
            .map(|purchase| {
                let lines = lines_by_purchase.remove(&purchase.id).unwrap_or_default();
                let payments = payments_by_purchase.remove(&purchase.id).unwrap_or_default();
                PurchaseDetail {
                    purchase,
                    lines,
                    payments,
                }
            })
            .collect())
    }
}

/// Status derivation at creation time. Cash purchases are settled on the
/// spot regardless of recorded payments.
fn derive_status(
    payment_type: PurchasePaymentType,
    paid_amount: Decimal,
    total: Decimal,
) -> PurchaseStatus {
    if payment_type == PurchasePaymentType::Cash || paid_amount >= total {
        PurchaseStatus::Paid
    } else if paid_amount > Decimal::ZERO {
        PurchaseStatus::Partial
    } else {
        PurchaseStatus::Pending
    }
}

fn parse_status(purchase: &purchase::Model) -> Result<PurchaseStatus, ServiceError> {
    purchase.status.parse().map_err(|_| {
        ServiceError::InvalidState(format!("unknown purchase status {}", purchase.status))
    })
}

async fn insert_purchase_payment(
    txn: &DatabaseTransaction,
    purchase_id: Uuid,
    p: &NewPurchasePayment,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    record_payment(
        txn,
        PaymentReference::Purchase(purchase_id),
        &p.method,
        p.amount,
        p.reference.clone(),
        Some(user_id),
    )
    .await?;
    Ok(())
}

/// Atomic `balance = balance + delta` on the supplier row.
async fn adjust_supplier_balance(
    txn: &DatabaseTransaction,
    supplier_id: Uuid,
    delta: Decimal,
) -> Result<(), ServiceError> {
    let result = supplier::Entity::update_many()
        .col_expr(
            supplier::Column::Balance,
            Expr::col(supplier::Column::Balance).add(delta),
        )
        .filter(supplier::Column::Id.eq(supplier_id))
        .exec(txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(ServiceError::not_found("supplier", supplier_id));
    }
    Ok(())
}

/// The one canonical reversal routine, shared by cancel and delete: per
/// line an atomic stock decrement plus an `out` movement, and for credit
/// purchases the outstanding balance comes back off the supplier.
async fn reverse_purchase(
    txn: &DatabaseTransaction,
    purchase: &purchase::Model,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    let lines = purchase_line::Entity::find()
        .filter(purchase_line::Column::PurchaseId.eq(purchase.id))
        .all(txn)
        .await?;

    let stock_lines: Vec<StockLine> = lines
        .iter()
        .map(|line| StockLine {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_cost: None,
        })
        .collect();
    record_lines(
        txn,
        purchase.branch_id,
        Some(user_id),
        inventory::reasons::PURCHASE_REVERSAL,
        StockDirection::StockOut,
        &stock_lines,
    )
    .await?;

    if purchase.payment_type == PurchasePaymentType::Credit.to_string() {
        if let Some(supplier_id) = purchase.supplier_id {
            if !purchase.balance.is_zero() {
                adjust_supplier_balance(txn, supplier_id, -purchase.balance).await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cash_purchases_are_paid_regardless_of_payments() {
        assert_eq!(
            derive_status(PurchasePaymentType::Cash, Decimal::ZERO, dec!(100)),
            PurchaseStatus::Paid
        );
    }

    #[test]
    fn credit_status_follows_paid_amount() {
        assert_eq!(
            derive_status(PurchasePaymentType::Credit, Decimal::ZERO, dec!(1000)),
            PurchaseStatus::Pending
        );
        assert_eq!(
            derive_status(PurchasePaymentType::Credit, dec!(400), dec!(1000)),
            PurchaseStatus::Partial
        );
        assert_eq!(
            derive_status(PurchasePaymentType::Credit, dec!(1000), dec!(1000)),
            PurchaseStatus::Paid
        );
        assert_eq!(
            derive_status(PurchasePaymentType::Credit, dec!(1200), dec!(1000)),
            PurchaseStatus::Paid
        );
    }
}
