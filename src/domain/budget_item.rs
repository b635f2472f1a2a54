use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::round_cents;
use crate::domain::common::*;

/// A planned expense whose total has to be fully scheduled across installments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub unit_cost: f64,
    pub quantity: u32,
}

impl BudgetItem {
    pub fn new(name: impl Into<String>, unit_cost: f64, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            unit_cost: sanitize_cost(unit_cost),
            quantity,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Authoritative amount: unit cost times quantity, rounded to cents.
    pub fn total_amount(&self) -> f64 {
        round_cents(sanitize_cost(self.unit_cost) * self.quantity as f64)
    }
}

/// Negative or non-finite costs collapse to zero.
pub(crate) fn sanitize_cost(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

impl Displayable for BudgetItem {
    fn display_label(&self) -> String {
        format!("{} ({} x {:.2})", self.name, self.quantity, self.unit_cost)
    }
}
