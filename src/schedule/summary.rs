use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    allocation::{reconcile, InstallmentAllocation},
    status::InstallmentStatus,
    suggest::next_payment_suggestion,
    OVERPAYMENT_TOLERANCE,
};
use crate::currency::round_cents;
use crate::domain::BudgetPlan;

/// Everything a payments view needs for one budget item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub as_of: NaiveDate,
    pub total_amount: f64,
    pub total_scheduled: f64,
    pub total_paid: f64,
    pub remaining_balance: f64,
    /// Total minus the sum of installment amounts; non-zero after manual edits.
    pub unscheduled_amount: f64,
    pub progress_pct: f64,
    pub next_suggested_payment: f64,
    pub overdue_count: usize,
    pub rows: Vec<InstallmentAllocation>,
}

impl PaymentSchedule {
    pub fn is_settled(&self) -> bool {
        self.remaining_balance <= OVERPAYMENT_TOLERANCE
    }

    pub fn overdue(&self) -> impl Iterator<Item = &InstallmentAllocation> {
        self.rows
            .iter()
            .filter(|row| row.status == InstallmentStatus::Overdue)
    }
}

/// Reconciles `plan` as of `today`.
pub fn build_schedule(plan: &BudgetPlan, today: NaiveDate) -> PaymentSchedule {
    let total_amount = plan.total_amount();
    let total_paid = plan.total_paid();
    let rows = reconcile(&plan.installments, total_paid, today);
    let total_scheduled: f64 = rows.iter().map(|row| row.amount).sum();
    let progress_pct = if total_amount > 0.0 {
        (total_paid / total_amount).clamp(0.0, 1.0) * 100.0
    } else {
        0.0
    };
    let overdue_count = rows
        .iter()
        .filter(|row| row.status == InstallmentStatus::Overdue)
        .count();

    PaymentSchedule {
        as_of: today,
        total_amount,
        total_scheduled: round_cents(total_scheduled),
        total_paid: round_cents(total_paid),
        remaining_balance: round_cents(total_amount - total_paid),
        unscheduled_amount: round_cents(total_amount - total_scheduled),
        progress_pct,
        next_suggested_payment: next_payment_suggestion(&rows),
        overdue_count,
        rows,
    }
}

/// Consistency problems worth surfacing next to a schedule.
pub fn schedule_warnings(plan: &BudgetPlan) -> Vec<String> {
    let mut warnings = Vec::new();
    let total = plan.total_amount();
    let scheduled: f64 = plan.installments.iter().map(|item| item.amount).sum();

    if (total - scheduled).abs() > OVERPAYMENT_TOLERANCE {
        warnings.push(format!(
            "installments add up to {:.2} but the item total is {:.2}",
            scheduled, total
        ));
    }
    let paid = plan.total_paid();
    if paid > total + OVERPAYMENT_TOLERANCE {
        warnings.push(format!(
            "payments of {:.2} exceed the item total of {:.2}",
            paid, total
        ));
    }
    for installment in &plan.installments {
        if installment.due_date.is_none() {
            let label = installment
                .sequence_number
                .map(|n| format!("#{}", n))
                .unwrap_or_else(|| installment.id.to_string());
            warnings.push(format!("installment {} has no due date", label));
        }
    }
    let mut seen = HashSet::new();
    for number in plan.installments.iter().filter_map(|item| item.sequence_number) {
        if !seen.insert(number) {
            warnings.push(format!("sequence number {} is used more than once", number));
        }
    }
    warnings
}
