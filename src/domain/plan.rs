use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    budget_item::BudgetItem,
    installment::Installment,
    payment::{self, Payment},
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// A budget item together with its installment schedule and payment ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetPlan {
    #[serde(default = "BudgetPlan::schema_version_default")]
    pub schema_version: u8,
    pub item: BudgetItem,
    #[serde(default)]
    pub installments: Vec<Installment>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetPlan {
    /// Starts a plan with a single installment due `today` covering the full total.
    pub fn new(item: BudgetItem, today: NaiveDate, now: DateTime<Utc>) -> Self {
        let first = Installment::new(1, item.total_amount(), Some(today));
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            item,
            installments: vec![first],
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn id(&self) -> Uuid {
        self.item.id
    }

    pub fn name(&self) -> &str {
        &self.item.name
    }

    pub fn total_amount(&self) -> f64 {
        self.item.total_amount()
    }

    pub fn total_paid(&self) -> f64 {
        payment::total_paid(&self.payments)
    }

    /// Global outstanding balance, independent of the installment breakdown.
    pub fn remaining_balance(&self) -> f64 {
        self.total_amount() - self.total_paid()
    }

    pub fn payment(&self, id: Uuid) -> Option<&Payment> {
        self.payments.iter().find(|payment| payment.id == id)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            id: self.id(),
            name: self.item.name.clone(),
            total_amount: self.total_amount(),
            total_paid: self.total_paid(),
            installment_count: self.installments.len(),
            updated_at: self.updated_at,
        }
    }
}

/// Listing row for stored plans.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSummary {
    pub id: Uuid,
    pub name: String,
    pub total_amount: f64,
    pub total_paid: f64,
    pub installment_count: usize,
    pub updated_at: DateTime<Utc>,
}
