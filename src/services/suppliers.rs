//! Suppliers and their running credit balance.
//!
//! The balance column is maintained incrementally by the purchase ledger;
//! this service adds the offline consistency check (`reconcile_balance`)
//! that recomputes the balance from uncancelled credit purchases and
//! reports or repairs drift. Incremental state is never trusted alone for
//! audits.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{payment, purchase, supplier};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{PaymentReferenceKind, PurchasePaymentType, PurchaseStatus};

#[derive(Debug, Clone)]
pub struct CreateSupplier {
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_days: i32,
    pub credit_limit: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSupplier {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_days: Option<i32>,
    pub credit_limit: Option<Decimal>,
    pub notes: Option<String>,
}

/// Account statement: purchases, their payments, and summary totals.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SupplierStatement {
    pub supplier: supplier::Model,
    pub purchases: Vec<purchase::Model>,
    pub payments: Vec<payment::Model>,
    pub total_purchased: Decimal,
    pub total_paid: Decimal,
    pub total_balance: Decimal,
}

/// An unpaid purchase with its age against the agreed due date.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PendingPurchase {
    #[serde(flatten)]
    pub purchase: purchase::Model,
    pub days_overdue: Option<i64>,
}

/// Result of recomputing a supplier balance from purchase history.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BalanceReconciliation {
    pub supplier_id: Uuid,
    pub recorded: Decimal,
    pub computed: Decimal,
    pub drift: Decimal,
    pub repaired: bool,
}

#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create_supplier(
        &self,
        account_id: Uuid,
        input: CreateSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".to_string()));
        }

        let created = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            name: Set(input.name),
            contact_name: Set(input.contact_name),
            phone: Set(input.phone),
            email: Set(input.email),
            balance: Set(Decimal::ZERO),
            credit_days: Set(input.credit_days),
            credit_limit: Set(input.credit_limit),
            notes: Set(input.notes),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        account_id: Uuid,
        input: UpdateSupplier,
    ) -> Result<supplier::Model, ServiceError> {
        let existing = self.get_supplier(supplier_id, account_id).await?;

        let mut active: supplier::ActiveModel = existing.into();
        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::Validation("name is required".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(contact_name) = input.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(credit_days) = input.credit_days {
            active.credit_days = Set(credit_days);
        }
        if let Some(credit_limit) = input.credit_limit {
            active.credit_limit = Set(credit_limit);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }

        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(
        &self,
        supplier_id: Uuid,
        account_id: Uuid,
    ) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(supplier_id)
            .filter(supplier::Column::AccountId.eq(account_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("supplier", supplier_id))
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        account_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<supplier::Model>, ServiceError> {
        let mut query =
            supplier::Entity::find().filter(supplier::Column::AccountId.eq(account_id));
        if active_only {
            query = query.filter(supplier::Column::Active.eq(true));
        }
        Ok(query
            .order_by_asc(supplier::Column::Name)
            .all(&*self.db)
            .await?)
    }

    /// Deactivates a supplier. Refused while the supplier still has
    /// purchases pending payment.
    #[instrument(skip(self))]
    pub async fn deactivate_supplier(
        &self,
        supplier_id: Uuid,
        account_id: Uuid,
    ) -> Result<supplier::Model, ServiceError> {
        let existing = self.get_supplier(supplier_id, account_id).await?;

        let outstanding = purchase::Entity::find()
            .filter(purchase::Column::SupplierId.eq(supplier_id))
            .filter(purchase::Column::Status.is_in([
                PurchaseStatus::Pending.to_string(),
                PurchaseStatus::Partial.to_string(),
            ]))
            .all(&*self.db)
            .await?;
        if !outstanding.is_empty() {
            return Err(ServiceError::Conflict(
                "supplier has purchases pending payment".to_string(),
            ));
        }

        let mut active: supplier::ActiveModel = existing.into();
        active.active = Set(false);
        Ok(active.update(&*self.db).await?)
    }

    /// The supplier's account statement: every purchase, every payment
    /// against those purchases, and summary totals over uncancelled
    /// purchases.
    #[instrument(skip(self))]
    pub async fn statement(
        &self,
        supplier_id: Uuid,
        account_id: Uuid,
    ) -> Result<SupplierStatement, ServiceError> {
        let supplier = self.get_supplier(supplier_id, account_id).await?;

        let purchases = purchase::Entity::find()
            .filter(purchase::Column::SupplierId.eq(supplier_id))
            .order_by_desc(purchase::Column::Date)
            .all(&*self.db)
            .await?;

        let purchase_ids: Vec<Uuid> = purchases.iter().map(|p| p.id).collect();
        let payments = if purchase_ids.is_empty() {
            Vec::new()
        } else {
            payment::Entity::find()
                .filter(
                    payment::Column::ReferenceType
                        .eq(PaymentReferenceKind::Purchase.to_string()),
                )
                .filter(payment::Column::ReferenceId.is_in(purchase_ids.iter().copied()))
                .order_by_desc(payment::Column::CreatedAt)
                .all(&*self.db)
                .await?
        };

        let uncancelled = purchases
            .iter()
            .filter(|p| p.status != PurchaseStatus::Cancelled.to_string());
        let mut total_purchased = Decimal::ZERO;
        let mut total_paid = Decimal::ZERO;
        let mut total_balance = Decimal::ZERO;
        for p in uncancelled {
            total_purchased += p.total;
            total_paid += p.paid_amount;
            total_balance += p.balance;
        }

        Ok(SupplierStatement {
            supplier,
            purchases,
            payments,
            total_purchased,
            total_paid,
            total_balance,
        })
    }

    /// Purchases still awaiting payment, with days overdue where a due
    /// date has passed.
    #[instrument(skip(self))]
    pub async fn pending_purchases(
        &self,
        supplier_id: Uuid,
        account_id: Uuid,
    ) -> Result<Vec<PendingPurchase>, ServiceError> {
        self.get_supplier(supplier_id, account_id).await?;

        let today = Utc::now().date_naive();
        let pending = purchase::Entity::find()
            .filter(purchase::Column::SupplierId.eq(supplier_id))
            .filter(purchase::Column::Status.is_in([
                PurchaseStatus::Pending.to_string(),
                PurchaseStatus::Partial.to_string(),
            ]))
            .order_by_asc(purchase::Column::DueDate)
            .all(&*self.db)
            .await?;

        Ok(pending
            .into_iter()
            .map(|purchase| {
                let days_overdue = purchase
                    .due_date
                    .filter(|due| *due < today)
                    .map(|due| (today - due).num_days());
                PendingPurchase {
                    purchase,
                    days_overdue,
                }
            })
            .collect())
    }

    /// Recomputes the supplier balance from uncancelled credit purchases
    /// and reports drift against the incrementally-maintained column. With
    /// `repair` set, the column is corrected to the computed value.
    #[instrument(skip(self))]
    pub async fn reconcile_balance(
        &self,
        supplier_id: Uuid,
        account_id: Uuid,
        repair: bool,
    ) -> Result<BalanceReconciliation, ServiceError> {
        let supplier = self.get_supplier(supplier_id, account_id).await?;

        let credit_purchases = purchase::Entity::find()
            .filter(purchase::Column::SupplierId.eq(supplier_id))
            .filter(purchase::Column::PaymentType.eq(PurchasePaymentType::Credit.to_string()))
            .filter(purchase::Column::Status.ne(PurchaseStatus::Cancelled.to_string()))
            .all(&*self.db)
            .await?;

        let recorded = supplier.balance;
        let computed: Decimal = credit_purchases.iter().map(|p| p.balance).sum();
        let drift = recorded - computed;

        let repaired = repair && !drift.is_zero();
        if repaired {
            let mut active: supplier::ActiveModel = supplier.into();
            active.balance = Set(computed);
            active.update(&*self.db).await?;
        }

        self.event_sender
            .send(Event::SupplierBalanceReconciled {
                supplier_id,
                recorded,
                computed,
                repaired,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(BalanceReconciliation {
            supplier_id,
            recorded,
            computed,
            drift,
            repaired,
        })
    }
}
