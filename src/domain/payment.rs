use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A recorded payment against a budget item. Never edited, only deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub amount: f64,
    pub payment_date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Payment {
    pub fn from_new(payment: NewPayment, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: payment.amount,
            payment_date: payment.payment_date,
            recorded_at,
            note: payment.note,
        }
    }
}

impl Displayable for Payment {
    fn display_label(&self) -> String {
        format!("{:.2} on {}", self.amount, self.payment_date)
    }
}

/// Write shape handed to the persistence collaborator when appending a payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPayment {
    pub amount: f64,
    pub payment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewPayment {
    pub fn new(amount: f64, payment_date: NaiveDate) -> Self {
        Self {
            amount,
            payment_date,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Sum of all recorded payment amounts.
pub fn total_paid(payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|payment| payment.amount.is_finite())
        .map(|payment| payment.amount)
        .sum()
}
