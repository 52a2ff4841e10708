use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplier purchase. `paid_amount + balance == total` is maintained on
/// every mutation; `status` is derived from those amounts and never set
/// directly by callers.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub date: Date,
    pub total: Decimal,
    pub payment_type: String,
    pub status: String,
    pub paid_amount: Decimal,
    pub balance: Decimal,
    pub due_date: Option<Date>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
