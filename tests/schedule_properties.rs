use chrono::NaiveDate;
use event_budget::{
    domain::Installment,
    schedule::{
        add_installment, allocate_amounts, even_split, reconcile, remove_installment,
        validate_payment, InstallmentStatus, InvalidAmountReason, ValidationError,
    },
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn installments_for(total: f64, count: usize) -> Vec<Installment> {
    even_split(total, count)
        .into_iter()
        .enumerate()
        .map(|(position, amount)| {
            Installment::new(
                position as u32 + 1,
                amount,
                Some(date(2025, position as u32 % 12 + 1, 10)),
            )
        })
        .collect()
}

#[test]
fn split_parts_add_back_to_the_total() {
    for total in [0.0, 0.01, 1.0, 99.99, 1000.0, 1234.56, 98765.43] {
        for count in 1..=24 {
            let parts = even_split(total, count);
            assert_eq!(parts.len(), count);
            let sum: f64 = parts.iter().sum();
            assert!(
                (sum - total).abs() < 1e-9,
                "{total} over {count} summed to {sum}"
            );
        }
    }
}

#[test]
fn split_is_even_except_for_the_last_part() {
    for (total, count) in [(1000.0, 3), (100.0, 7), (1234.56, 5), (50.0, 6), (0.05, 2)] {
        let parts = even_split(total, count);
        let expected = (total / count as f64 * 100.0).floor() / 100.0;
        for part in &parts[..count - 1] {
            assert_eq!(*part, expected, "{total} over {count}");
        }
    }
}

#[test]
fn coverage_grows_with_payments_and_fills_in_order() {
    let amounts = even_split(1000.0, 4);
    let mut previous = allocate_amounts(&amounts, 0.0);
    let mut paid = 0.0;
    while paid <= 1000.0 {
        let coverage = allocate_amounts(&amounts, paid);
        for (now, before) in coverage.iter().zip(&previous) {
            assert!(now.amount_covered >= before.amount_covered);
        }
        for window in coverage.windows(2) {
            if window[0].amount_remaining > 0.0 {
                assert_eq!(window[1].amount_covered, 0.0, "paid {paid}");
            }
        }
        previous = coverage;
        paid += 37.5;
    }
}

#[test]
fn paid_rows_have_nothing_remaining() {
    let installments = installments_for(1000.0, 5);
    for paid in [0.0, 199.99, 200.0, 450.0, 999.99, 1000.0] {
        for row in reconcile(&installments, paid, date(2025, 3, 15)) {
            match row.status {
                InstallmentStatus::Paid => assert_eq!(row.amount_remaining, 0.0),
                InstallmentStatus::Overdue | InstallmentStatus::Pending => {
                    assert!(row.amount_remaining > 0.0)
                }
            }
        }
    }
}

#[test]
fn removing_down_to_one_restores_the_total() {
    let mut installments = installments_for(1000.0, 4);
    while installments.len() > 1 {
        installments = remove_installment(&installments, 0, 1000.0);
    }
    assert_eq!(installments.len(), 1);
    assert_eq!(installments[0].amount, 1000.0);
    assert_eq!(installments[0].sequence_number, Some(1));
}

#[test]
fn overpayment_boundary() {
    let remaining = 640.25;
    let err = validate_payment(Some(remaining + 1.0), Some(date(2025, 1, 1)), remaining)
        .unwrap_err();
    assert!(matches!(err, ValidationError::OverpaymentExceeded { .. }));

    let accepted = validate_payment(Some(remaining), Some(date(2025, 1, 1)), remaining).unwrap();
    assert_eq!(accepted.amount, remaining);

    assert_eq!(
        validate_payment(Some(0.0), Some(date(2025, 1, 1)), remaining).unwrap_err(),
        ValidationError::InvalidAmount(InvalidAmountReason::NotPositive)
    );
    assert_eq!(
        validate_payment(Some(10.0), None, remaining).unwrap_err(),
        ValidationError::InvalidAmount(InvalidAmountReason::MissingDate)
    );
}

#[test]
fn three_way_split_after_two_payments() {
    let installments = installments_for(1000.0, 3);
    let rows = reconcile(&installments, 700.0, date(2025, 1, 1));
    assert_eq!(rows[0].status, InstallmentStatus::Paid);
    assert_eq!(rows[1].status, InstallmentStatus::Paid);
    assert_eq!(rows[2].status, InstallmentStatus::Pending);
    assert_eq!(rows[2].amount_covered, 33.34);
    assert_eq!(rows[2].amount_remaining, 300.0);
}

#[test]
fn fourth_installment_resplits_evenly() {
    let installments = installments_for(1000.0, 3);
    let next = add_installment(&installments, 1000.0, date(2025, 1, 1));
    let amounts: Vec<f64> = next.iter().map(|item| item.amount).collect();
    assert_eq!(amounts, vec![250.0; 4]);
    assert_eq!(next[3].due_date, Some(date(2025, 4, 10)));
}

#[test]
fn first_suggestion_is_the_first_installment() {
    let installments = installments_for(1000.0, 3);
    let rows = reconcile(&installments, 0.0, date(2025, 1, 1));
    assert_eq!(
        event_budget::schedule::next_payment_suggestion(&rows),
        333.33
    );
}
