//! Domain events.
//!
//! Services emit an event after each committed mutation; a background loop
//! consumes them for audit logging. Event delivery is fire-and-forget and
//! never part of the enclosing transaction: a lost event loses a log line,
//! not ledger state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the services after a committed mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Shift events
    ShiftOpened {
        shift_id: Uuid,
        branch_id: Uuid,
    },
    ShiftClosed {
        shift_id: Uuid,
        branch_id: Uuid,
        final_cash: Decimal,
    },

    // Cash cut events
    CashCutCreated {
        cash_cut_id: Uuid,
        branch_id: Uuid,
        difference: Decimal,
    },
    CashCutDeleted(Uuid),

    // Purchase ledger events
    PurchaseCreated {
        purchase_id: Uuid,
        supplier_id: Option<Uuid>,
        total: Decimal,
    },
    PurchasePaymentAdded {
        purchase_id: Uuid,
        amount: Decimal,
        new_balance: Decimal,
    },
    PurchaseCancelled(Uuid),
    PurchaseDeleted(Uuid),

    // Sales channel events
    SaleCreated(Uuid),
    SaleDeleted(Uuid),
    AppointmentCreated(Uuid),
    AppointmentStatusChanged {
        appointment_id: Uuid,
        old_status: String,
        new_status: String,
    },

    // Expense events
    ExpenseCreated(Uuid),
    ExpenseDeleted(Uuid),

    // Inventory events
    StockAdjusted {
        product_id: Uuid,
        quantity: i32,
        reason: String,
    },

    // Supplier ledger events
    SupplierBalanceReconciled {
        supplier_id: Uuid,
        recorded: Decimal,
        computed: Decimal,
        repaired: bool,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event to the processing loop.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {}", e))
    }
}

/// Background loop consuming domain events for audit logging.
///
/// Runs until every [`EventSender`] is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processing loop started");

    while let Some(event) = receiver.recv().await {
        match event {
            Event::ShiftOpened {
                shift_id,
                branch_id,
            } => {
                info!(%shift_id, %branch_id, "shift opened");
            }
            Event::ShiftClosed {
                shift_id,
                branch_id,
                final_cash,
            } => {
                info!(%shift_id, %branch_id, %final_cash, "shift closed");
            }
            Event::CashCutCreated {
                cash_cut_id,
                branch_id,
                difference,
            } => {
                if difference.is_zero() {
                    info!(%cash_cut_id, %branch_id, "cash cut created, drawer balanced");
                } else {
                    warn!(%cash_cut_id, %branch_id, %difference, "cash cut created with drawer difference");
                }
            }
            Event::CashCutDeleted(id) => {
                info!(cash_cut_id = %id, "cash cut deleted");
            }
            Event::PurchaseCreated {
                purchase_id,
                supplier_id,
                total,
            } => {
                info!(%purchase_id, ?supplier_id, %total, "purchase created");
            }
            Event::PurchasePaymentAdded {
                purchase_id,
                amount,
                new_balance,
            } => {
                info!(%purchase_id, %amount, %new_balance, "purchase payment recorded");
            }
            Event::PurchaseCancelled(id) => {
                info!(purchase_id = %id, "purchase cancelled");
            }
            Event::PurchaseDeleted(id) => {
                info!(purchase_id = %id, "purchase deleted");
            }
            Event::SaleCreated(id) => {
                info!(sale_id = %id, "sale created");
            }
            Event::SaleDeleted(id) => {
                info!(sale_id = %id, "sale deleted");
            }
            Event::AppointmentCreated(id) => {
                info!(appointment_id = %id, "appointment created");
            }
            Event::AppointmentStatusChanged {
                appointment_id,
                old_status,
                new_status,
            } => {
                info!(%appointment_id, %old_status, %new_status, "appointment status changed");
            }
            Event::ExpenseCreated(id) => {
                info!(expense_id = %id, "expense created");
            }
            Event::ExpenseDeleted(id) => {
                info!(expense_id = %id, "expense deleted");
            }
            Event::StockAdjusted {
                product_id,
                quantity,
                reason,
            } => {
                info!(%product_id, quantity, %reason, "stock adjusted");
            }
            Event::SupplierBalanceReconciled {
                supplier_id,
                recorded,
                computed,
                repaired,
            } => {
                if recorded == computed {
                    info!(%supplier_id, %recorded, "supplier balance reconciled, no drift");
                } else {
                    warn!(%supplier_id, %recorded, %computed, repaired, "supplier balance drift detected");
                }
            }
        }
    }

    warn!("Event processing loop has ended");
}
