//! Direct point-of-sale tickets.
//!
//! Creating a sale writes the ticket, its items, the stock-out for product
//! items and the payment rows in one transaction; deleting a sale restocks
//! product items with reversal movements before removing the rows.

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

use crate::entities::{payment, sale, sale_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{PaymentMethod, PaymentReference, PaymentReferenceKind, SaleItemKind};
use crate::services::inventory::{self, record_lines, StockDirection, StockLine};
use crate::services::payments::record_payment;

/// One service or product line on a new sale.
#[derive(Debug, Clone)]
pub struct NewSaleItem {
    pub item_type: SaleItemKind,
    pub item_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

/// One payment on a sale or appointment.
#[derive(Debug, Clone)]
pub struct NewTicketPayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone)]
pub struct CreateSale {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub stylist_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub items: Vec<NewSaleItem>,
    pub payments: Vec<NewTicketPayment>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
}

/// A sale with its items and payments attached.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: sale::Model,
    pub items: Vec<sale_item::Model>,
    pub payments: Vec<payment::Model>,
}

#[derive(Clone)]
pub struct SaleService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl SaleService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records a sale: ticket, items, stock-out for product items, payment
    /// rows. One transaction.
    #[instrument(skip(self, input))]
    pub async fn create_sale(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        input: CreateSale,
    ) -> Result<sale::Model, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::Validation(
                "a sale needs at least one item".to_string(),
            ));
        }

        let now = Utc::now();
        let sale_id = Uuid::new_v4();

        let created = self
            .db
            .transaction::<_, sale::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let created = sale::ActiveModel {
                        id: Set(sale_id),
                        branch_id: Set(branch_id),
                        stylist_id: Set(input.stylist_id),
                        client_name: Set(input.client_name.clone()),
                        client_phone: Set(input.client_phone.clone()),
                        date: Set(input.date.unwrap_or_else(|| now.date_naive())),
                        time: Set(input.time.unwrap_or_else(|| now.time())),
                        subtotal: Set(input.subtotal),
                        discount: Set(input.discount),
                        total: Set(input.total),
                        notes: Set(input.notes.clone()),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    for item in &input.items {
                        sale_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            sale_id: Set(sale_id),
                            item_type: Set(item.item_type.to_string()),
                            item_id: Set(item.item_id),
                            name: Set(item.name.clone()),
                            quantity: Set(item.quantity),
                            price: Set(item.price),
                            discount: Set(item.discount),
                            subtotal: Set(item.subtotal),
                        }
                        .insert(txn)
                        .await?;
                    }

                    let product_lines = product_stock_lines(&input.items);
                    if !product_lines.is_empty() {
                        record_lines(
                            txn,
                            branch_id,
                            Some(user_id),
                            inventory::reasons::SALE,
                            StockDirection::StockOut,
                            &product_lines,
                        )
                        .await?;
                    }

                    for p in &input.payments {
                        record_payment(
                            txn,
                            PaymentReference::Sale(sale_id),
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
            .send(Event::SaleCreated(created.id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    /// Deletes a sale, restocking its product items with reversal
    /// movements.
    #[instrument(skip(self))]
    pub async fn delete_sale(
        &self,
        sale_id: Uuid,
        branch_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    sale::Entity::find_by_id(sale_id)
                        .filter(sale::Column::BranchId.eq(branch_id))
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::not_found("sale", sale_id))?;

                    let items = sale_item::Entity::find()
                        .filter(sale_item::Column::SaleId.eq(sale_id))
                        .all(txn)
                        .await?;

                    let product_lines: Vec<StockLine> = items
                        .iter()
                        .filter(|item| item.item_type == SaleItemKind::Product.to_string())
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
                            inventory::reasons::SALE_REVERSAL,
                            StockDirection::StockIn,
                            &product_lines,
                        )
                        .await?;
                    }

                    payment::Entity::delete_many()
                        .filter(
                            payment::Column::ReferenceType
                                .eq(PaymentReferenceKind::Sale.to_string()),
                        )
                        .filter(payment::Column::ReferenceId.eq(sale_id))
                        .exec(txn)
                        .await?;
                    sale_item::Entity::delete_many()
                        .filter(sale_item::Column::SaleId.eq(sale_id))
                        .exec(txn)
                        .await?;
                    sale::Entity::delete_by_id(sale_id).exec(txn).await?;

                    Ok(())
                })
            })
            .await?;

        self.event_sender
            .send(Event::SaleDeleted(sale_id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_sale(
        &self,
        sale_id: Uuid,
        branch_id: Uuid,
    ) -> Result<SaleDetail, ServiceError> {
        let sale = sale::Entity::find_by_id(sale_id)
            .filter(sale::Column::BranchId.eq(branch_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("sale", sale_id))?;

        let items = sale_item::Entity::find()
            .filter(sale_item::Column::SaleId.eq(sale_id))
            .all(&*self.db)
            .await?;
        let payments = payment::Entity::find()
            .filter(payment::Column::ReferenceType.eq(PaymentReferenceKind::Sale.to_string()))
            .filter(payment::Column::ReferenceId.eq(sale_id))
            .all(&*self.db)
            .await?;

        Ok(SaleDetail {
            sale,
            items,
            payments,
        })
    }

    /// Lists a branch's sales with items and payments, newest first.
    #[instrument(skip(self))]
    pub async fn list_sales(
        &self,
        branch_id: Uuid,
        date: Option<NaiveDate>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<SaleDetail>, ServiceError> {
        let mut query = sale::Entity::find().filter(sale::Column::BranchId.eq(branch_id));
        if let Some(date) = date {
            query = query.filter(sale::Column::Date.eq(date));
        }
        if let (Some(start), Some(end)) = (start_date, end_date) {
            query = query.filter(sale::Column::Date.between(start, end));
        }

        let sales = query
            .order_by_desc(sale::Column::Date)
            .order_by_desc(sale::Column::Time)
            .all(&*self.db)
            .await?;

        if sales.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();

        let mut items_by_sale: HashMap<Uuid, Vec<sale_item::Model>> = HashMap::new();
        for item in sale_item::Entity::find()
            .filter(sale_item::Column::SaleId.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
        {
            items_by_sale.entry(item.sale_id).or_default().push(item);
        }

        let mut payments_by_sale: HashMap<Uuid, Vec<payment::Model>> = HashMap::new();
        for p in payment::Entity::find()
            .filter(payment::Column::ReferenceType.eq(PaymentReferenceKind::Sale.to_string()))
            .filter(payment::Column::ReferenceId.is_in(ids.iter().copied()))
            .all(&*self.db)
            .await?
        {
            payments_by_sale.entry(p.reference_id).or_default().push(p);
        }

        Ok(sales
            .into_iter()
            .map(|sale| {
                let items = items_by_sale.remove(&sale.id).unwrap_or_default();
                let payments = payments_by_sale.remove(&sale.id).unwrap_or_default();
                SaleDetail {
                    sale,
                    items,
                    payments,
                }
            })
            .collect())
    }
}

/// Stock lines for the product items on a ticket. Service items never
/// touch inventory.
fn product_stock_lines(items: &[NewSaleItem]) -> Vec<StockLine> {
    items
        .iter()
        .filter(|item| item.item_type == SaleItemKind::Product)
        .map(|item| StockLine {
            product_id: item.item_id,
            quantity: item.quantity,
            unit_cost: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn only_product_items_produce_stock_lines() {
        let items = vec![
            NewSaleItem {
                item_type: SaleItemKind::Service,
                item_id: Uuid::new_v4(),
                name: "Haircut".to_string(),
                quantity: 1,
                price: dec!(150),
                discount: Decimal::ZERO,
                subtotal: dec!(150),
            },
            NewSaleItem {
                item_type: SaleItemKind::Product,
                item_id: Uuid::new_v4(),
                name: "Shampoo".to_string(),
                quantity: 2,
                price: dec!(80),
                discount: Decimal::ZERO,
                subtotal: dec!(160),
            },
        ];

        let lines = product_stock_lines(&items);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }
}
