use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PAID_EPSILON;

/// Payment state of a single installment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InstallmentStatus {
    Paid,
    Overdue,
    Pending,
}

impl InstallmentStatus {
    pub fn is_paid(self) -> bool {
        matches!(self, InstallmentStatus::Paid)
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallmentStatus::Paid => "Paid",
            InstallmentStatus::Overdue => "Overdue",
            InstallmentStatus::Pending => "Pending",
        };
        f.write_str(label)
    }
}

/// Paid once the running paid total reaches the cumulative scheduled amount
/// through this installment; otherwise overdue only when a past due date exists.
pub fn derive_status(
    total_paid: f64,
    cumulative_scheduled: f64,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> InstallmentStatus {
    if total_paid + PAID_EPSILON >= cumulative_scheduled {
        return InstallmentStatus::Paid;
    }
    match due_date {
        Some(due) if due < today => InstallmentStatus::Overdue,
        _ => InstallmentStatus::Pending,
    }
}
