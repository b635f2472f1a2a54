//! Sequential ("waterfall") coverage of installments by the paid total.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{derive_status, InstallmentStatus};
use crate::currency::round_cents;
use crate::domain::Installment;

/// How much of one installment the paid total reaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coverage {
    pub amount_covered: f64,
    pub amount_remaining: f64,
    /// Sum of scheduled amounts up to and including this installment.
    pub cumulative_scheduled: f64,
}

/// Reconciled view of one installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentAllocation {
    pub installment_id: Uuid,
    pub sequence_number: Option<u32>,
    pub amount: f64,
    pub amount_covered: f64,
    pub amount_remaining: f64,
    pub cumulative_scheduled: f64,
    pub due_date: Option<NaiveDate>,
    pub status: InstallmentStatus,
}

/// Orders installments by sequence number when every installment has one,
/// otherwise by due date when every installment has one, otherwise keeps the
/// input order.
pub fn order_installments(installments: &[Installment]) -> Vec<&Installment> {
    let mut ordered: Vec<&Installment> = installments.iter().collect();
    if ordered.iter().all(|item| item.sequence_number.is_some()) {
        ordered.sort_by_key(|item| item.sequence_number);
    } else if ordered.iter().all(|item| item.due_date.is_some()) {
        ordered.sort_by_key(|item| item.due_date);
    }
    ordered
}

/// Applies `total_paid` to `amounts` strictly in order.
pub fn allocate_amounts(amounts: &[f64], total_paid: f64) -> Vec<Coverage> {
    let total_paid = non_negative(total_paid);
    let mut cumulative = 0.0;
    amounts
        .iter()
        .map(|raw| {
            let amount = non_negative(*raw);
            let covered = (total_paid - cumulative).clamp(0.0, amount);
            cumulative += amount;
            Coverage {
                amount_covered: round_cents(covered),
                amount_remaining: round_cents(amount - covered),
                cumulative_scheduled: cumulative,
            }
        })
        .collect()
}

/// Orders, allocates and classifies `installments` against `total_paid`.
pub fn reconcile(
    installments: &[Installment],
    total_paid: f64,
    today: NaiveDate,
) -> Vec<InstallmentAllocation> {
    let ordered = order_installments(installments);
    let amounts: Vec<f64> = ordered.iter().map(|item| item.amount).collect();
    let coverage = allocate_amounts(&amounts, total_paid);

    ordered
        .into_iter()
        .zip(coverage)
        .map(|(installment, coverage)| {
            let status = derive_status(
                total_paid,
                coverage.cumulative_scheduled,
                installment.due_date,
                today,
            );
            let amount = round_cents(non_negative(installment.amount));
            let (amount_covered, amount_remaining) = if status.is_paid() {
                (amount, 0.0)
            } else {
                (coverage.amount_covered, coverage.amount_remaining)
            };
            InstallmentAllocation {
                installment_id: installment.id,
                sequence_number: installment.sequence_number,
                amount,
                amount_covered,
                amount_remaining,
                cumulative_scheduled: round_cents(coverage.cumulative_scheduled),
                due_date: installment.due_date,
                status,
            }
        })
        .collect()
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
