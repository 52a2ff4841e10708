//! SeaORM entities, one per table. Statuses and payment methods are stored
//! as plain strings; the typed views live in `crate::models`.

pub mod appointment;
pub mod appointment_item;
pub mod cash_cut;
pub mod expense;
pub mod inventory_movement;
pub mod payment;
pub mod product;
pub mod purchase;
pub mod purchase_line;
pub mod sale;
pub mod sale_item;
pub mod shift;
pub mod supplier;
