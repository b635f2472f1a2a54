use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// One scheduled partial payment of a budget item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Installment {
    pub id: Uuid,
    /// 1-based position within the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u32>,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl Installment {
    pub fn new(sequence_number: u32, amount: f64, due_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence_number: Some(sequence_number),
            amount,
            due_date,
            priority: Priority::default(),
            assignee: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }
}

impl Displayable for Installment {
    fn display_label(&self) -> String {
        let number = self
            .sequence_number
            .map(|n| format!("#{}", n))
            .unwrap_or_else(|| "#?".into());
        match self.due_date {
            Some(date) => format!("{} {:.2} due {}", number, self.amount, date),
            None => format!("{} {:.2}", number, self.amount),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(label)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority `{}`", other)),
        }
    }
}

/// Field-level edits applied to a single installment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallmentPatch {
    pub amount: Option<f64>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub assignee: Option<Option<String>>,
}

impl InstallmentPatch {
    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn due_date(due_date: Option<NaiveDate>) -> Self {
        Self {
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn assignee(assignee: Option<String>) -> Self {
        Self {
            assignee: Some(assignee),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, installment: &mut Installment) {
        if let Some(amount) = self.amount {
            installment.amount = amount;
        }
        if let Some(due_date) = self.due_date {
            installment.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            installment.priority = priority;
        }
        if let Some(assignee) = &self.assignee {
            installment.assignee = assignee.clone();
        }
    }
}
