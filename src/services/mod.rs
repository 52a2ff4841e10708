//! Business logic, one service per resource.
//!
//! Every multi-statement mutation runs inside a single database transaction;
//! services emit a domain event after the transaction commits. Tenant and
//! branch scoping is explicit in every method signature so that a missing
//! filter is visible at the call site.

pub mod appointments;
pub mod cash_cuts;
pub mod expenses;
pub mod inventory;
pub mod payments;
pub mod purchases;
pub mod sales;
pub mod shifts;
pub mod suppliers;
