use super::allocation::InstallmentAllocation;
use crate::currency::round_cents;

/// Default amount for the next payment: whatever is left on the first
/// installment that is not yet paid, or zero when everything is settled.
pub fn next_payment_suggestion(allocations: &[InstallmentAllocation]) -> f64 {
    allocations
        .iter()
        .find(|row| !row.status.is_paid())
        .map(|row| round_cents(row.amount_remaining))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Installment;
    use crate::schedule::allocation::reconcile;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn thirds() -> Vec<Installment> {
        vec![
            Installment::new(1, 333.33, None),
            Installment::new(2, 333.33, None),
            Installment::new(3, 333.34, None),
        ]
    }

    #[test]
    fn suggests_first_installment_before_any_payment() {
        let rows = reconcile(&thirds(), 0.0, today());
        assert_eq!(next_payment_suggestion(&rows), 333.33);
    }

    #[test]
    fn suggests_balance_of_partially_covered_installment() {
        let rows = reconcile(&thirds(), 700.0, today());
        assert_eq!(next_payment_suggestion(&rows), 300.0);
    }

    #[test]
    fn settled_or_empty_schedules_suggest_zero() {
        let rows = reconcile(&thirds(), 1000.0, today());
        assert_eq!(next_payment_suggestion(&rows), 0.0);
        assert_eq!(next_payment_suggestion(&[]), 0.0);
    }
}
