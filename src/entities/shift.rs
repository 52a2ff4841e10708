use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded work period at a branch, bracketed by an opening cash float and
/// a closing physical count. At most one shift per branch is `open` at any
/// time; the database enforces this with a partial unique index.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shifts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub branch_id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Option<Time>,
    pub initial_cash: Decimal,
    pub final_cash: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
