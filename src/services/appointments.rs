//! Salon appointments as a sales channel.
//!
//! Stock is consumed when an appointment transitions to `completed`, not
//! when it is booked, and exactly once: completed and cancelled are both
//! terminal, so the transition cannot repeat. Payments recorded against an
//! appointment join the cash cut only once the appointment completes.

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{appointment, appointment_item, payment};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{AppointmentStatus, PaymentReference, PaymentReferenceKind, SaleItemKind};
use crate::services::inventory::{self, record_lines, StockDirection, StockLine};
use crate::services::payments::record_payment;
use crate::services::sales::NewTicketPayment;

/// One service or product line on an appointment.
#[derive(Debug, Clone)]
pub struct NewAppointmentItem {
    pub item_type: SaleItemKind,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone)]
pub struct CreateAppointment {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub stylist_id: Option<Uuid>,
    pub items: Vec<NewAppointmentItem>,
    pub payments: Vec<NewTicketPayment>,
    pub total: Decimal,
    pub notes: Option<String>,
}

/// An appointment with its items and payments attached.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: appointment::Model,
    pub items: Vec<appointment_item::Model>,
    pub payments: Vec<payment::Model>,
}

#[derive(Clone)]
pub struct AppointmentService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl AppointmentService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Books an appointment with its items and any advance payments. No
    /// stock moves until completion.
    #[instrument(skip(self, input))]
    pub async fn create_appointment(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        input: CreateAppointment,
    ) -> Result<appointment::Model, ServiceError> {
        let now = Utc::now();
        let appointment_id = Uuid::new_v4();

        let created = self
            .db
            .transaction::<_, appointment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let created = appointment::ActiveModel {
                        id: Set(appointment_id),
                        branch_id: Set(branch_id),
                        client_id: Set(input.client_id),
                        client_name: Set(input.client_name.clone()),
                        stylist_id: Set(input.stylist_id),
                        date: Set(input.date),
                        start_time: Set(input.start_time),
                        status: Set(AppointmentStatus::Scheduled.to_string()),
                        total: Set(input.total),
                        notes: Set(input.notes.clone()),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    for item in &input.items {
                        appointment_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            appointment_id: Set(appointment_id),
                            item_type: Set(item.item_type.to_string()),
                            item_id: Set(item.item_id),
                            name: Set(item.name.clone()),
                            quantity: Set(item.quantity),
                            price: Set(item.price),
                            subtotal: Set(item.subtotal),
                        }
                        .insert(txn)
                        .await?;
                    }

                    for p in &input.payments {
                        record_payment(
                            txn,
                            PaymentReference::Appointment(appointment_id),
                            &p.method,
                            p.amount,
                            None,
                            Some(user_id),
                        )
                        .await?;
                    }

                    Ok(created)
                })
            })
            .await?;

        self.event_sender
            .send(Event::AppointmentCreated(created.id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    /// Moves an appointment through its lifecycle. Completing consumes the
    /// product items from stock inside the same transaction as the status
    /// write; completed and cancelled are terminal.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        branch_id: Uuid,
        user_id: Uuid,
        new_status: AppointmentStatus,
    ) -> Result<appointment::Model, ServiceError> {
        let (updated, old_status) = self
            .db
            .transaction::<_, (appointment::Model, AppointmentStatus), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let existing = appointment::Entity::find_by_id(appointment_id)
                            .filter(appointment::Column::BranchId.eq(branch_id))
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::not_found("appointment", appointment_id)
                            })?;

                        let old_status: AppointmentStatus =
                            existing.status.parse().map_err(|_| {
                                ServiceError::InvalidState(format!(
                                    "unknown appointment status {}",
                                    existing.status
                                ))
                            })?;

                        match old_status {
                            AppointmentStatus::Completed => {
                                return Err(ServiceError::InvalidState(
                                    "appointment is already completed".to_string(),
                                ));
                            }
                            AppointmentStatus::Cancelled => {
                                return Err(ServiceError::InvalidState(
                                    "appointment is cancelled".to_string(),
                                ));
                            }
                            _ => {}
                        }

                        if new_status == AppointmentStatus::Completed {
                            let items = appointment_item::Entity::find()
                                .filter(
                                    appointment_item::Column::AppointmentId.eq(appointment_id),
                                )
                                .all(txn)
                                .await?;
                            let product_lines: Vec<StockLine> = items
                                .iter()
                                .filter(|item| {
                                    item.item_type == SaleItemKind::Product.to_string()
                                })
                                .map(|item| StockLine {
                                    product_id: item.item_id,
                                    quantity: item.quantity,
                                    unit_cost: None,
                                })
                                .collect();
                            if !product_lines.is_empty() {
                                record_lines(
                                    txn,
                                    branch_id,
                                    Some(user_id),
                                    inventory::reasons::APPOINTMENT,
                                    StockDirection::StockOut,
                                    &product_lines,
                                )
                                .await?;
                            }
                        }

                        let mut active: appointment::ActiveModel = existing.into();
                        active.status = Set(new_status.to_string());
                        let updated = active.update(txn).await?;

                        Ok((updated, old_status))
                    })
                },
            )
            .await?;

        self.event_sender
            .send(Event::AppointmentStatusChanged {
                appointment_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        branch_id: Uuid,
    ) -> Result<AppointmentDetail, ServiceError> {
        let appointment = appointment::Entity::find_by_id(appointment_id)
            .filter(appointment::Column::BranchId.eq(branch_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("appointment", appointment_id))?;

        let items = appointment_item::Entity::find()
            .filter(appointment_item::Column::AppointmentId.eq(appointment_id))
            .all(&*self.db)
            .await?;
        let payments = payment::Entity::find()
            .filter(
                payment::Column::ReferenceType.eq(PaymentReferenceKind::Appointment.to_string()),
            )
            .filter(payment::Column::ReferenceId.eq(appointment_id))
            .all(&*self.db)
            .await?;

        Ok(AppointmentDetail {
            appointment,
            items,
            payments,
        })
    }

    /// Lists a branch's appointments with items and payments, soonest
    /// first within a day.
    #[instrument(skip(self))]
    pub async fn list_appointments(
        &self,
        branch_id: Uuid,
        date: Option<NaiveDate>,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentDetail>, ServiceError> {
        let mut query =
            appointment::Entity::find().filter(appointment::Column::BranchId.eq(branch_id));
        if let Some(date) = date {
            query = query.filter(appointment::Column::Date.eq(date));
        }
        if let Some(status) = status {
            query = query.filter(appointment::Column::Status.eq(status.to_string()));
        }

        let appointments = query
            .order_by_desc(appointment::Column::Date)
            .order_by_asc(appointment::Column::StartTime)
            .all(&*self.db)
            .await?;

        if appointments.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();

        let mut items_by_appointment: HashMap<Uuid, Vec<appointment_item::Model>> = HashMap::new();
        for item in appointment_item::Entity::find()
            .filter(appointment_item::Column::AppointmentId.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
        {
            items_by_appointment
                .entry(item.appointment_id)
                .or_default()
                .push(item);
        }

        let mut payments_by_appointment: HashMap<Uuid, Vec<payment::Model>> = HashMap::new();
        for p in payment::Entity::find()
            .filter(
                payment::Column::ReferenceType.eq(PaymentReferenceKind::Appointment.to_string()),
            )
            .filter(payment::Column::ReferenceId.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
        {
            payments_by_appointment
                .entry(p.reference_id)
                .or_default()
                .push(p);
        }

        Ok(appointments
            .into_iter()
            .map(|appointment| {
                let items = items_by_appointment
                    .remove(&appointment.id)
                    .unwrap_or_default();
                let payments = payments_by_appointment
                    .remove(&appointment.id)
                    .unwrap_or_default();
                AppointmentDetail {
                    appointment,
                    items,
                    payments,
                }
            })
            .collect())
    }
}
