//! Stock movements and the shared transaction recorder.
//!
//! Every stock change in the system, whatever triggered it, goes through
//! [`record_lines`]: one atomic `stock = stock ± quantity` update plus one
//! append-only movement row per product line, inside the caller's
//! transaction. Purchases, sales, appointment completion and the manual
//! in/out/adjustment operations all share this routine so the running
//! `product.stock` total and the movement trail can never diverge.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{inventory_movement, product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::MovementType;

/// Fixed reason strings for recorder-driven movements.
pub mod reasons {
    pub const PURCHASE: &str = "Inventory purchase";
    pub const PURCHASE_REVERSAL: &str = "Purchase reversal";
    pub const SALE: &str = "Sale";
    pub const SALE_REVERSAL: &str = "Sale reversal";
    pub const APPOINTMENT: &str = "Appointment completed";
    pub const MANUAL_IN: &str = "Manual stock in";
    pub const MANUAL_OUT: &str = "Manual stock out";
    pub const ADJUSTMENT: &str = "Stock adjustment";
}

/// Whether the parent event takes stock out (sale-like) or brings it in
/// (purchase-like or reversal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    StockIn,
    StockOut,
}

impl StockDirection {
    /// Signed stock delta for a positive line quantity.
    fn signed(self, quantity: i32) -> i32 {
        match self {
            StockDirection::StockIn => quantity,
            StockDirection::StockOut => -quantity,
        }
    }

    fn movement_type(self) -> MovementType {
        match self {
            StockDirection::StockIn => MovementType::In,
            StockDirection::StockOut => MovementType::Out,
        }
    }
}

/// One product line handed to the recorder. `unit_cost` is set by purchase
/// intake, where the product's cost follows the latest line (last write
/// wins); every other caller leaves it `None`.
#[derive(Debug, Clone)]
pub struct StockLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost: Option<Decimal>,
}

/// Applies a set of product lines to stock and logs one movement per line.
///
/// The stock update is a single atomic SQL expression, never a
/// read-modify-write, so concurrent writers cannot lose updates. Runs
/// inside the caller's transaction; any failure rolls the whole parent
/// operation back.
pub async fn record_lines(
    txn: &DatabaseTransaction,
    branch_id: Uuid,
    user_id: Option<Uuid>,
    reason: &str,
    direction: StockDirection,
    lines: &[StockLine],
) -> Result<(), ServiceError> {
    for line in lines {
        if line.quantity <= 0 {
            return Err(ServiceError::Validation(format!(
                "line quantity must be positive, got {}",
                line.quantity
            )));
        }

        let delta = direction.signed(line.quantity);

        let mut update = product::Entity::update_many().col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).add(delta),
        );
        if let Some(cost) = line.unit_cost {
            update = update.col_expr(product::Column::Cost, Expr::value(cost));
        }
        let result = update
            .filter(product::Column::Id.eq(line.product_id))
            .exec(txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("product", line.product_id));
        }

        inventory_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            branch_id: Set(branch_id),
            product_id: Set(line.product_id),
            movement_type: Set(direction.movement_type().to_string()),
            quantity: Set(delta),
            reason: Set(reason.to_string()),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        }
        .insert(txn)
        .await?;
    }

    Ok(())
}

/// Filters for listing inventory movements.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Aggregate value of stock on hand.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InventoryValue {
    pub total_units: i64,
    pub total_value: Decimal,
}

/// Manual stock operations and movement queries.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Manual stock intake.
    #[instrument(skip(self))]
    pub async fn stock_in(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        reason: Option<String>,
    ) -> Result<(), ServiceError> {
        self.manual_movement(
            branch_id,
            user_id,
            product_id,
            quantity,
            StockDirection::StockIn,
            reason.unwrap_or_else(|| reasons::MANUAL_IN.to_string()),
        )
        .await
    }

    /// Manual stock issue.
    #[instrument(skip(self))]
    pub async fn stock_out(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        reason: Option<String>,
    ) -> Result<(), ServiceError> {
        self.manual_movement(
            branch_id,
            user_id,
            product_id,
            quantity,
            StockDirection::StockOut,
            reason.unwrap_or_else(|| reasons::MANUAL_OUT.to_string()),
        )
        .await
    }

    async fn manual_movement(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        direction: StockDirection,
        reason: String,
    ) -> Result<(), ServiceError> {
        let line = StockLine {
            product_id,
            quantity,
            unit_cost: None,
        };
        let reason_for_txn = reason.clone();

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    record_lines(
                        txn,
                        branch_id,
                        Some(user_id),
                        &reason_for_txn,
                        direction,
                        &[line],
                    )
                    .await
                })
            })
            .await?;

        self.event_sender
            .send(Event::StockAdjusted {
                product_id,
                quantity: direction.signed(quantity),
                reason,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(())
    }

    /// Sets a product's stock to a counted value, logging the delta as an
    /// adjustment movement.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        account_id: Uuid,
        branch_id: Uuid,
        user_id: Uuid,
        product_id: Uuid,
        new_stock: i32,
        reason: Option<String>,
    ) -> Result<i32, ServiceError> {
        if new_stock < 0 {
            return Err(ServiceError::Validation(
                "stock cannot be adjusted to a negative value".to_string(),
            ));
        }
        let reason = reason.unwrap_or_else(|| reasons::ADJUSTMENT.to_string());
        let reason_for_txn = reason.clone();

        let difference = self
            .db
            .transaction::<_, i32, ServiceError>(move |txn| {
                Box::pin(async move {
                    let current = product::Entity::find_by_id(product_id)
                        .filter(product::Column::AccountId.eq(account_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("product", product_id))?;

                    let difference = new_stock - current.stock;

                    let mut active: product::ActiveModel = current.into();
                    active.stock = Set(new_stock);
                    active.update(txn).await?;

                    inventory_movement::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        branch_id: Set(branch_id),
                        product_id: Set(product_id),
                        movement_type: Set(MovementType::Adjustment.to_string()),
                        quantity: Set(difference),
                        reason: Set(reason_for_txn),
                        user_id: Set(Some(user_id)),
                        created_at: Set(Utc::now()),
                    }
                    .insert(txn)
                    .await?;

                    Ok(difference)
                })
            })
            .await?;

        self.event_sender
            .send(Event::StockAdjusted {
                product_id,
                quantity: difference,
                reason,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(difference)
    }

    /// Lists movements for a branch, newest first.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        branch_id: Uuid,
        filter: MovementFilter,
    ) -> Result<Vec<inventory_movement::Model>, ServiceError> {
        let mut query = inventory_movement::Entity::find()
            .filter(inventory_movement::Column::BranchId.eq(branch_id));

        if let Some(product_id) = filter.product_id {
            query = query.filter(inventory_movement::Column::ProductId.eq(product_id));
        }
        if let Some(movement_type) = filter.movement_type {
            query = query
                .filter(inventory_movement::Column::MovementType.eq(movement_type.to_string()));
        }
        if let Some(start) = filter.start_date {
            let from = start.and_time(chrono::NaiveTime::MIN).and_utc();
            query = query.filter(inventory_movement::Column::CreatedAt.gte(from));
        }
        if let Some(end) = filter.end_date {
            let to = end.and_time(chrono::NaiveTime::MIN).and_utc() + chrono::Duration::days(1);
            query = query.filter(inventory_movement::Column::CreatedAt.lt(to));
        }

        let movements = query
            .order_by_desc(inventory_movement::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(movements)
    }

    /// Current stock levels for an account's products. With `below_min_only`
    /// set, returns only products at or under their minimum.
    #[instrument(skip(self))]
    pub async fn stock_levels(
        &self,
        account_id: Uuid,
        below_min_only: bool,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::AccountId.eq(account_id))
            .filter(product::Column::Active.eq(true))
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?;

        if below_min_only {
            Ok(products
                .into_iter()
                .filter(|p| p.stock <= p.min_stock)
                .collect())
        } else {
            Ok(products)
        }
    }

    /// Total units and cost value of stock on hand for an account.
    #[instrument(skip(self))]
    pub async fn inventory_value(&self, account_id: Uuid) -> Result<InventoryValue, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::AccountId.eq(account_id))
            .filter(product::Column::Active.eq(true))
            .all(&*self.db)
            .await?;

        let mut total_units: i64 = 0;
        let mut total_value = Decimal::ZERO;
        for p in &products {
            total_units += i64::from(p.stock);
            total_value += Decimal::from(p.stock) * p.cost;
        }

        Ok(InventoryValue {
            total_units,
            total_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_signs_quantities() {
        assert_eq!(StockDirection::StockIn.signed(5), 5);
        assert_eq!(StockDirection::StockOut.signed(5), -5);
    }

    #[test]
    fn direction_maps_to_movement_type() {
        assert_eq!(StockDirection::StockIn.movement_type(), MovementType::In);
        assert_eq!(StockDirection::StockOut.movement_type(), MovementType::Out);
    }
}
