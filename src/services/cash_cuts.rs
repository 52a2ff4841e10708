//! Cash-cut engine: expected-vs-counted reconciliation per payment method.
//!
//! The engine aggregates one (branch, date) window of the ledger (sale
//! payments plus completed-appointment payments merged into one sales map,
//! expenses by their own method, purchase payments by method) and derives
//! the expected drawer content per method. Reading and snapshotting take no
//! locks: a cut reflects the ledger at call time and is written once as an
//! immutable audit record, never recomputed.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{appointment, cash_cut, expense, payment, purchase, sale, shift};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{AppointmentStatus, MethodTotals, PaymentMethod, PaymentReferenceKind};

/// Aggregated ledger activity for one (branch, date) window.
///
/// Completed appointments are a sales channel: their payments are already
/// merged into `sales_by_method` and their totals into `total_sales`.
#[derive(Debug, Clone, Default)]
pub struct LedgerWindow {
    pub sales_by_method: MethodTotals,
    pub expenses_by_method: MethodTotals,
    pub purchases_by_method: MethodTotals,
    pub total_sales: Decimal,
    pub total_expenses: Decimal,
    pub total_purchases: Decimal,
    pub completed_appointments: i64,
}

/// The derived reconciliation figures for a window.
#[derive(Debug, Clone)]
pub struct CashCutComputation {
    pub expected_by_method: MethodTotals,
    pub real_by_method: MethodTotals,
    pub difference_by_method: MethodTotals,
    /// Expected cash, the reconciliation target.
    pub expected: Decimal,
    /// Counted cash.
    pub real_amount: Decimal,
    /// Counted minus expected cash.
    pub difference: Decimal,
}

impl CashCutComputation {
    /// Derives expected/real/difference per method.
    ///
    /// For each method: expected = sales − expenses − purchases, with the
    /// shift's starting float added to cash only. Methods the caller did
    /// not physically count default to their expected value, so only
    /// counted methods can show a difference. The scalar figures are the
    /// cash bucket; other methods are informational.
    pub fn compute(window: &LedgerWindow, initial_cash: Decimal, counted: &MethodTotals) -> Self {
        let mut methods: BTreeSet<PaymentMethod> = PaymentMethod::FIXED
            .iter()
            .map(PaymentMethod::new)
            .collect();
        methods.extend(window.sales_by_method.methods().cloned());
        methods.extend(window.expenses_by_method.methods().cloned());
        methods.extend(window.purchases_by_method.methods().cloned());
        methods.extend(counted.methods().cloned());

        let cash = PaymentMethod::cash();

        let mut expected_by_method = MethodTotals::new();
        for method in &methods {
            let mut expected = window.sales_by_method.get(method)
                - window.expenses_by_method.get(method)
                - window.purchases_by_method.get(method);
            if *method == cash {
                expected += initial_cash;
            }
            expected_by_method.set(method.clone(), expected);
        }

        let mut real_by_method = MethodTotals::new();
        let mut difference_by_method = MethodTotals::new();
        for method in &methods {
            let expected = expected_by_method.get(method);
            let real = if counted.contains(method) {
                counted.get(method)
            } else {
                expected
            };
            real_by_method.set(method.clone(), real);
            difference_by_method.set(method.clone(), real - expected);
        }

        let expected = expected_by_method.get(&cash);
        let real_amount = real_by_method.get(&cash);

        Self {
            expected_by_method,
            real_by_method,
            difference_by_method,
            expected,
            real_amount,
            difference: real_amount - expected,
        }
    }
}

/// Request to create a cash cut. Either against a shift (window and float
/// come from the shift) or ad hoc for a date.
#[derive(Debug, Clone)]
pub struct CreateCashCut {
    pub shift_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub real_by_method: MethodTotals,
    pub final_cash: Option<Decimal>,
}

/// A shift summary: the live (non-persisted) view of the same computation.
#[derive(Debug, Clone)]
pub struct ShiftSummary {
    pub shift: shift::Model,
    pub window: LedgerWindow,
    pub expected_by_method: MethodTotals,
}

#[derive(Clone)]
pub struct CashCutService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CashCutService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Aggregates one (branch, date) window from the ledger. A window with
    /// no activity yields all-zero maps, not an error.
    #[instrument(skip(self))]
    pub async fn fetch_window(
        &self,
        branch_id: Uuid,
        date: NaiveDate,
    ) -> Result<LedgerWindow, ServiceError> {
        let db = &*self.db;

        let sales = sale::Entity::find()
            .filter(sale::Column::BranchId.eq(branch_id))
            .filter(sale::Column::Date.eq(date))
            .all(db)
            .await?;
        let sale_ids: Vec<Uuid> = sales.iter().map(|s| s.id).collect();

        let completed = appointment::Entity::find()
            .filter(appointment::Column::BranchId.eq(branch_id))
            .filter(appointment::Column::Date.eq(date))
            .filter(appointment::Column::Status.eq(AppointmentStatus::Completed.to_string()))
            .all(db)
            .await?;
        let appointment_ids: Vec<Uuid> = completed.iter().map(|a| a.id).collect();

        let purchases = purchase::Entity::find()
            .filter(purchase::Column::BranchId.eq(branch_id))
            .filter(purchase::Column::Date.eq(date))
            .all(db)
            .await?;
        let purchase_ids: Vec<Uuid> = purchases.iter().map(|p| p.id).collect();

        let mut sales_by_method = self
            .payments_by_method(PaymentReferenceKind::Sale, &sale_ids)
            .await?;
        let appointment_payments = self
            .payments_by_method(PaymentReferenceKind::Appointment, &appointment_ids)
            .await?;
        sales_by_method.merge(&appointment_payments);

        let purchases_by_method = self
            .payments_by_method(PaymentReferenceKind::Purchase, &purchase_ids)
            .await?;

        let expenses = expense::Entity::find()
            .filter(expense::Column::BranchId.eq(branch_id))
            .filter(expense::Column::Date.eq(date))
            .all(db)
            .await?;
        let expenses_by_method = MethodTotals::from_rows(
            expenses
                .iter()
                .map(|e| (e.payment_method.as_str(), e.amount)),
        );

        let total_sales = sales.iter().map(|s| s.total).sum::<Decimal>()
            + completed.iter().map(|a| a.total).sum::<Decimal>();
        let total_expenses = expenses.iter().map(|e| e.amount).sum();
        let total_purchases = purchases.iter().map(|p| p.total).sum();

        Ok(LedgerWindow {
            sales_by_method,
            expenses_by_method,
            purchases_by_method,
            total_sales,
            total_expenses,
            total_purchases,
            completed_appointments: completed.len() as i64,
        })
    }

    /// Sums payment amounts per method for a set of reference rows.
    async fn payments_by_method(
        &self,
        kind: PaymentReferenceKind,
        reference_ids: &[Uuid],
    ) -> Result<MethodTotals, ServiceError> {
        if reference_ids.is_empty() {
            return Ok(MethodTotals::new());
        }

        let payments = payment::Entity::find()
            .filter(payment::Column::ReferenceType.eq(kind.to_string()))
            .filter(payment::Column::ReferenceId.is_in(reference_ids.iter().copied()))
            .all(&*self.db)
            .await?;

        Ok(MethodTotals::from_rows(
            payments.iter().map(|p| (p.method.as_str(), p.amount)),
        ))
    }

    /// The live summary for a shift: window aggregates plus expected per
    /// method, without persisting anything.
    #[instrument(skip(self))]
    pub async fn shift_summary(
        &self,
        shift_id: Uuid,
        branch_id: Uuid,
    ) -> Result<ShiftSummary, ServiceError> {
        let shift = shift::Entity::find_by_id(shift_id)
            .filter(shift::Column::BranchId.eq(branch_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("shift", shift_id))?;

        let window = self.fetch_window(branch_id, shift.date).await?;
        let computation =
            CashCutComputation::compute(&window, shift.initial_cash, &MethodTotals::new());

        Ok(ShiftSummary {
            shift,
            window,
            expected_by_method: computation.expected_by_method,
        })
    }

    /// Computes and persists a cash cut. The snapshot is immutable: there
    /// is no update path, and it is never recomputed from the ledger.
    #[instrument(skip(self, input))]
    pub async fn create_cut(
        &self,
        branch_id: Uuid,
        user_id: Uuid,
        input: CreateCashCut,
    ) -> Result<cash_cut::Model, ServiceError> {
        let (date, initial_cash, final_cash) = match input.shift_id {
            Some(shift_id) => {
                let shift = shift::Entity::find_by_id(shift_id)
                    .filter(shift::Column::BranchId.eq(branch_id))
                    .one(&*self.db)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("shift", shift_id))?;
                (
                    shift.date,
                    shift.initial_cash,
                    input.final_cash.or(shift.final_cash),
                )
            }
            None => (
                input.date.unwrap_or_else(|| Utc::now().date_naive()),
                Decimal::ZERO,
                input.final_cash,
            ),
        };

        let window = self.fetch_window(branch_id, date).await?;
        let computation =
            CashCutComputation::compute(&window, initial_cash, &input.real_by_method);

        let model = cash_cut::ActiveModel {
            id: Set(Uuid::new_v4()),
            shift_id: Set(input.shift_id),
            branch_id: Set(branch_id),
            user_id: Set(user_id),
            date: Set(date),
            total_sales: Set(window.total_sales),
            total_expenses: Set(window.total_expenses),
            total_purchases: Set(window.total_purchases),
            completed_appointments: Set(window.completed_appointments),
            sales_by_method: Set(window.sales_by_method.to_json()),
            expenses_by_method: Set(window.expenses_by_method.to_json()),
            purchases_by_method: Set(window.purchases_by_method.to_json()),
            expected_by_method: Set(computation.expected_by_method.to_json()),
            real_by_method: Set(computation.real_by_method.to_json()),
            difference_by_method: Set(computation.difference_by_method.to_json()),
            expected: Set(computation.expected),
            real_amount: Set(computation.real_amount),
            difference: Set(computation.difference),
            initial_cash: Set(initial_cash),
            final_cash: Set(final_cash),
            created_at: Set(Utc::now()),
        };
        let created = model.insert(&*self.db).await?;

        self.event_sender
            .send(Event::CashCutCreated {
                cash_cut_id: created.id,
                branch_id,
                difference: created.difference,
            })
            .await
            .map_err(ServiceError::Event)?;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_cut(
        &self,
        cash_cut_id: Uuid,
        branch_id: Uuid,
    ) -> Result<cash_cut::Model, ServiceError> {
        cash_cut::Entity::find_by_id(cash_cut_id)
            .filter(cash_cut::Column::BranchId.eq(branch_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("cash cut", cash_cut_id))
    }

    /// Lists a branch's cuts, newest first.
    #[instrument(skip(self))]
    pub async fn list_cuts(
        &self,
        branch_id: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<cash_cut::Model>, ServiceError> {
        let mut query = cash_cut::Entity::find().filter(cash_cut::Column::BranchId.eq(branch_id));

        if let (Some(start), Some(end)) = (start_date, end_date) {
            query = query.filter(cash_cut::Column::Date.between(start, end));
        }

        let cuts = query
            .order_by_desc(cash_cut::Column::Date)
            .order_by_desc(cash_cut::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(cuts)
    }

    #[instrument(skip(self))]
    pub async fn delete_cut(&self, cash_cut_id: Uuid, branch_id: Uuid) -> Result<(), ServiceError> {
        let cut = self.get_cut(cash_cut_id, branch_id).await?;
        cut.delete(&*self.db).await?;

        self.event_sender
            .send(Event::CashCutDeleted(cash_cut_id))
            .await
            .map_err(ServiceError::Event)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn window(
        sales: &[(&str, Decimal)],
        expenses: &[(&str, Decimal)],
        purchases: &[(&str, Decimal)],
    ) -> LedgerWindow {
        LedgerWindow {
            sales_by_method: MethodTotals::from_rows(sales.iter().cloned()),
            expenses_by_method: MethodTotals::from_rows(expenses.iter().cloned()),
            purchases_by_method: MethodTotals::from_rows(purchases.iter().cloned()),
            ..Default::default()
        }
    }

    #[test]
    fn expected_is_sales_minus_expenses_minus_purchases_plus_float() {
        // One cash sale of 200, one card sale of 150, one cash expense of
        // 50, opened with a 500 float; drawer counted at 640.
        let w = window(
            &[("cash", dec!(200)), ("card", dec!(150))],
            &[("cash", dec!(50))],
            &[],
        );
        let counted = MethodTotals::from_rows([("cash", dec!(640))]);

        let c = CashCutComputation::compute(&w, dec!(500), &counted);

        assert_eq!(c.expected_by_method.get(&PaymentMethod::cash()), dec!(650));
        assert_eq!(c.expected_by_method.get(&PaymentMethod::card()), dec!(150));
        assert_eq!(c.expected, dec!(650));
        assert_eq!(c.real_amount, dec!(640));
        assert_eq!(c.difference, dec!(-10));
        assert_eq!(
            c.difference_by_method.get(&PaymentMethod::cash()),
            dec!(-10)
        );
    }

    #[test]
    fn uncounted_methods_default_to_expected() {
        let w = window(&[("card", dec!(300)), ("transfer", dec!(120))], &[], &[]);
        let counted = MethodTotals::from_rows([("cash", dec!(0))]);

        let c = CashCutComputation::compute(&w, Decimal::ZERO, &counted);

        assert_eq!(c.real_by_method.get(&PaymentMethod::card()), dec!(300));
        assert_eq!(
            c.difference_by_method.get(&PaymentMethod::card()),
            Decimal::ZERO
        );
        assert_eq!(
            c.difference_by_method.get(&PaymentMethod::transfer()),
            Decimal::ZERO
        );
    }

    #[test]
    fn float_lands_on_cash_only() {
        let w = window(&[], &[], &[]);
        let c = CashCutComputation::compute(&w, dec!(500), &MethodTotals::new());

        assert_eq!(c.expected_by_method.get(&PaymentMethod::cash()), dec!(500));
        assert_eq!(
            c.expected_by_method.get(&PaymentMethod::card()),
            Decimal::ZERO
        );
        assert_eq!(
            c.expected_by_method.get(&PaymentMethod::transfer()),
            Decimal::ZERO
        );
    }

    #[test]
    fn empty_window_is_all_zeros_not_an_error() {
        let c = CashCutComputation::compute(
            &LedgerWindow::default(),
            Decimal::ZERO,
            &MethodTotals::new(),
        );

        assert_eq!(c.expected, Decimal::ZERO);
        assert_eq!(c.real_amount, Decimal::ZERO);
        assert_eq!(c.difference, Decimal::ZERO);
        for method in PaymentMethod::FIXED {
            assert_eq!(
                c.expected_by_method.get(&PaymentMethod::new(method)),
                Decimal::ZERO
            );
        }
    }

    #[test]
    fn open_method_set_extends_past_fixed_methods() {
        let w = window(&[("voucher", dec!(75))], &[], &[]);
        let c = CashCutComputation::compute(&w, Decimal::ZERO, &MethodTotals::new());

        assert_eq!(
            c.expected_by_method.get(&PaymentMethod::new("voucher")),
            dec!(75)
        );
        // Fixed methods are still present with zero totals.
        assert!(c.expected_by_method.contains(&PaymentMethod::card()));
    }

    #[test]
    fn purchases_and_expenses_reduce_expected() {
        let w = window(
            &[("cash", dec!(1000))],
            &[("cash", dec!(100))],
            &[("cash", dec!(250))],
        );
        let c = CashCutComputation::compute(&w, Decimal::ZERO, &MethodTotals::new());
        assert_eq!(c.expected, dec!(650));
    }
}
