//! Keeps installment amounts consistent with the item total when the number
//! of installments changes.

use chrono::{Months, NaiveDate};

use super::allocation::order_installments;
use super::split::even_split;
use crate::currency::round_cents;
use crate::domain::Installment;

/// Shifts `date` by whole calendar months, clamping to the last day of
/// shorter months (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Copies `installments` into waterfall order and numbers them 1..N.
pub fn in_schedule_order(installments: &[Installment]) -> Vec<Installment> {
    let mut ordered: Vec<Installment> = order_installments(installments)
        .into_iter()
        .cloned()
        .collect();
    renumber(&mut ordered);
    ordered
}

/// Appends an installment due one month after the last one in waterfall order
/// and re-splits the total evenly, discarding manual amount edits.
pub fn add_installment(
    installments: &[Installment],
    total: f64,
    today: NaiveDate,
) -> Vec<Installment> {
    let mut next = in_schedule_order(installments);
    let due_date = next
        .last()
        .and_then(|previous| previous.due_date)
        .map(|previous| add_months(previous, 1))
        .unwrap_or(today);

    next.push(Installment::new(0, 0.0, Some(due_date)));

    let amounts = even_split(total, next.len());
    for (installment, amount) in next.iter_mut().zip(amounts) {
        installment.amount = amount;
    }
    renumber(&mut next);
    next
}

/// Drops the installment at waterfall position `index`. Remaining amounts are
/// left alone unless a single installment is left, which then takes the full
/// total.
pub fn remove_installment(
    installments: &[Installment],
    index: usize,
    total: f64,
) -> Vec<Installment> {
    let mut next = in_schedule_order(installments);
    if index < next.len() {
        next.remove(index);
    }
    renumber(&mut next);
    enforce_single_identity(next, total)
}

/// A lone installment always carries the whole total.
pub fn enforce_single_identity(mut installments: Vec<Installment>, total: f64) -> Vec<Installment> {
    if let [only] = installments.as_mut_slice() {
        only.amount = round_cents(total.max(0.0));
    }
    installments
}

fn renumber(installments: &mut [Installment]) {
    for (position, installment) in installments.iter_mut().enumerate() {
        installment.sequence_number = Some(position as u32 + 1);
    }
}
