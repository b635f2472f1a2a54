use chrono::NaiveDate;
use thiserror::Error;

use super::OVERPAYMENT_TOLERANCE;
use crate::currency::round_cents;
use crate::domain::NewPayment;

/// Reasons a proposed payment is refused before it reaches storage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidAmount(InvalidAmountReason),
    #[error("payment exceeds the remaining balance of {remaining:.2} by {excess:.2}")]
    OverpaymentExceeded { excess: f64, remaining: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidAmountReason {
    #[error("payment amount must be a positive number")]
    NotPositive,
    #[error("payment amount rounds to zero cents")]
    BelowOneCent,
    #[error("payment date is required")]
    MissingDate,
}

/// Checks a proposed payment against the item's global remaining balance.
///
/// `remaining` is `item total - total paid so far`; the per-installment
/// breakdown plays no part here. Amounts are rounded to cents on success.
pub fn validate_payment(
    amount: Option<f64>,
    payment_date: Option<NaiveDate>,
    remaining: f64,
) -> Result<NewPayment, ValidationError> {
    let amount = match amount {
        Some(value) if value.is_finite() && value > 0.0 => round_cents(value),
        _ => {
            return Err(ValidationError::InvalidAmount(
                InvalidAmountReason::NotPositive,
            ))
        }
    };
    if amount <= 0.0 {
        return Err(ValidationError::InvalidAmount(
            InvalidAmountReason::BelowOneCent,
        ));
    }
    let payment_date = payment_date.ok_or(ValidationError::InvalidAmount(
        InvalidAmountReason::MissingDate,
    ))?;
    if amount > remaining + OVERPAYMENT_TOLERANCE {
        return Err(ValidationError::OverpaymentExceeded {
            excess: round_cents(amount - remaining),
            remaining: round_cents(remaining),
        });
    }
    Ok(NewPayment::new(amount, payment_date))
}
