//! Installment reconciliation: even splits, waterfall coverage, status
//! derivation, payment suggestions, validation and rebalancing.
//!
//! Everything in this module is a pure function over in-memory values. Callers
//! read plans through a [`crate::storage::PlanRepository`], pass "today" from a
//! [`crate::core::clock::Clock`], and persist whatever comes back.

pub mod allocation;
pub mod rebalance;
pub mod split;
pub mod status;
pub mod suggest;
pub mod summary;
pub mod validation;

/// Tolerance absorbing rounding drift when comparing paid totals against
/// cumulative scheduled amounts.
pub const PAID_EPSILON: f64 = 1e-6;

/// Half-cent slack allowed before a payment counts as an overpayment.
pub const OVERPAYMENT_TOLERANCE: f64 = 0.005;

pub use allocation::{allocate_amounts, order_installments, reconcile, Coverage, InstallmentAllocation};
pub use rebalance::{
    add_installment, add_months, enforce_single_identity, in_schedule_order, remove_installment,
};
pub use split::even_split;
pub use status::{derive_status, InstallmentStatus};
pub use suggest::next_payment_suggestion;
pub use summary::{build_schedule, schedule_warnings, PaymentSchedule};
pub use validation::{validate_payment, InvalidAmountReason, ValidationError};
