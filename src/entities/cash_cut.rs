use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable reconciliation snapshot for a shift or an ad-hoc window.
///
/// The per-method columns hold JSON maps of decimal strings (see
/// `models::MethodTotals`). A cut is written once by the cash-cut engine and
/// never updated or recomputed afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_cuts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shift_id: Option<Uuid>,
    pub branch_id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub total_sales: Decimal,
    pub total_expenses: Decimal,
    pub total_purchases: Decimal,
    pub completed_appointments: i64,
    pub sales_by_method: Json,
    pub expenses_by_method: Json,
    pub purchases_by_method: Json,
    pub expected_by_method: Json,
    pub real_by_method: Json,
    pub difference_by_method: Json,
    pub expected: Decimal,
    pub real_amount: Decimal,
    pub difference: Decimal,
    pub initial_cash: Decimal,
    pub final_cash: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
