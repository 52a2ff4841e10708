//! HTTP handlers, one module per resource, each exporting its router.

pub mod appointments;
pub mod cash_cuts;
pub mod common;
pub mod expenses;
pub mod inventory;
pub mod purchases;
pub mod sales;
pub mod shifts;
pub mod suppliers;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::services;

/// The service instances shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub shifts: Arc<services::shifts::ShiftService>,
    pub cash_cuts: Arc<services::cash_cuts::CashCutService>,
    pub purchases: Arc<services::purchases::PurchaseService>,
    pub suppliers: Arc<services::suppliers::SupplierService>,
    pub inventory: Arc<services::inventory::InventoryService>,
    pub sales: Arc<services::sales::SaleService>,
    pub appointments: Arc<services::appointments::AppointmentService>,
    pub expenses: Arc<services::expenses::ExpenseService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            shifts: Arc::new(services::shifts::ShiftService::new(
                db.clone(),
                event_sender.clone(),
            )),
            cash_cuts: Arc::new(services::cash_cuts::CashCutService::new(
                db.clone(),
                event_sender.clone(),
            )),
            purchases: Arc::new(services::purchases::PurchaseService::new(
                db.clone(),
                event_sender.clone(),
            )),
            suppliers: Arc::new(services::suppliers::SupplierService::new(
                db.clone(),
                event_sender.clone(),
            )),
            inventory: Arc::new(services::inventory::InventoryService::new(
                db.clone(),
                event_sender.clone(),
            )),
            sales: Arc::new(services::sales::SaleService::new(
                db.clone(),
                event_sender.clone(),
            )),
            appointments: Arc::new(services::appointments::AppointmentService::new(
                db.clone(),
                event_sender.clone(),
            )),
            expenses: Arc::new(services::expenses::ExpenseService::new(db, event_sender)),
        }
    }
}
