//! Immutable-update state container for a single budget plan.
//!
//! Every change to a plan is a named [`PlanAction`]. [`reduce`] never touches
//! its input: it returns a new plan and checks the plan invariants before
//! handing it back.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::currency::round_cents;
use crate::domain::{budget_item::sanitize_cost, BudgetPlan, InstallmentPatch, Payment};
use crate::errors::{PlanError, Result};
use crate::schedule::{
    add_installment, build_schedule, enforce_single_identity, in_schedule_order,
    remove_installment, validate_payment, PaymentSchedule, OVERPAYMENT_TOLERANCE,
};

/// Discrete transitions a plan can go through.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanAction {
    Rename {
        name: String,
    },
    SetDescription {
        description: Option<String>,
    },
    SetUnitCost {
        unit_cost: f64,
    },
    SetQuantity {
        quantity: u32,
    },
    AddInstallment,
    RemoveInstallment {
        index: usize,
    },
    EditInstallment {
        index: usize,
        patch: InstallmentPatch,
    },
    RecordPayment {
        amount: Option<f64>,
        payment_date: Option<NaiveDate>,
        note: Option<String>,
    },
    DeletePayment {
        id: Uuid,
    },
}

impl PlanAction {
    pub fn label(&self) -> &'static str {
        match self {
            PlanAction::Rename { .. } => "rename",
            PlanAction::SetDescription { .. } => "set-description",
            PlanAction::SetUnitCost { .. } => "set-unit-cost",
            PlanAction::SetQuantity { .. } => "set-quantity",
            PlanAction::AddInstallment => "add-installment",
            PlanAction::RemoveInstallment { .. } => "remove-installment",
            PlanAction::EditInstallment { .. } => "edit-installment",
            PlanAction::RecordPayment { .. } => "record-payment",
            PlanAction::DeletePayment { .. } => "delete-payment",
        }
    }

    /// Whether the transition only changes the installment list.
    pub fn touches_installments_only(&self) -> bool {
        matches!(
            self,
            PlanAction::AddInstallment
                | PlanAction::RemoveInstallment { .. }
                | PlanAction::EditInstallment { .. }
        )
    }
}

/// Holds the current plan and replaces it wholesale on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStore {
    plan: BudgetPlan,
}

impl PlanStore {
    /// Installments are put into waterfall order before the invariants run.
    pub fn new(mut plan: BudgetPlan) -> Result<Self> {
        plan.installments = in_schedule_order(&plan.installments);
        check_invariants(&plan)?;
        Ok(Self { plan })
    }

    pub fn plan(&self) -> &BudgetPlan {
        &self.plan
    }

    pub fn into_plan(self) -> BudgetPlan {
        self.plan
    }

    /// Applies `action`; on error the store keeps its previous plan.
    pub fn dispatch(&mut self, action: PlanAction, clock: &dyn Clock) -> Result<&BudgetPlan> {
        let next = reduce(&self.plan, &action, clock)?;
        self.plan = next;
        Ok(&self.plan)
    }

    pub fn schedule(&self, clock: &dyn Clock) -> PaymentSchedule {
        build_schedule(&self.plan, clock.today())
    }
}

/// Computes the plan that results from applying `action` to `plan`.
pub fn reduce(plan: &BudgetPlan, action: &PlanAction, clock: &dyn Clock) -> Result<BudgetPlan> {
    let mut next = plan.clone();
    next.installments = in_schedule_order(&plan.installments);
    let total = plan.total_amount();

    match action {
        PlanAction::Rename { name } => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(PlanError::InvalidInput("plan name cannot be empty".into()));
            }
            next.item.name = trimmed.to_string();
        }
        PlanAction::SetDescription { description } => {
            next.item.description = description
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
        }
        PlanAction::SetUnitCost { unit_cost } => {
            next.item.unit_cost = sanitize_cost(*unit_cost);
            let new_total = next.total_amount();
            next.installments = enforce_single_identity(next.installments, new_total);
        }
        PlanAction::SetQuantity { quantity } => {
            next.item.quantity = *quantity;
            let new_total = next.total_amount();
            next.installments = enforce_single_identity(next.installments, new_total);
        }
        PlanAction::AddInstallment => {
            next.installments = add_installment(&next.installments, total, clock.today());
        }
        PlanAction::RemoveInstallment { index } => {
            ensure_index(plan, *index)?;
            if plan.installments.len() == 1 {
                return Err(PlanError::InvalidInput(
                    "a plan needs at least one installment".into(),
                ));
            }
            next.installments = remove_installment(&next.installments, *index, total);
        }
        PlanAction::EditInstallment { index, patch } => {
            ensure_index(plan, *index)?;
            if let Some(amount) = patch.amount {
                if !amount.is_finite() || amount < 0.0 {
                    return Err(PlanError::InvalidInput(format!(
                        "installment amount must be zero or more, got {}",
                        amount
                    )));
                }
            }
            let mut patch = patch.clone();
            patch.amount = patch.amount.map(round_cents);
            patch.apply_to(&mut next.installments[*index]);
            next.installments = enforce_single_identity(next.installments, total);
        }
        PlanAction::RecordPayment {
            amount,
            payment_date,
            note,
        } => {
            let mut payment = validate_payment(*amount, *payment_date, plan.remaining_balance())?;
            payment.note = note.clone();
            next.payments.push(Payment::from_new(payment, clock.now()));
        }
        PlanAction::DeletePayment { id } => {
            let before = next.payments.len();
            next.payments.retain(|payment| payment.id != *id);
            if next.payments.len() == before {
                return Err(PlanError::PaymentNotFound(*id));
            }
        }
    }

    next.touch(clock.now());
    check_invariants(&next)?;
    tracing::debug!(plan = %next.item.id, action = action.label(), "plan transition applied");
    Ok(next)
}

/// Structural rules every stored plan satisfies.
pub fn check_invariants(plan: &BudgetPlan) -> Result<()> {
    if let [only] = plan.installments.as_slice() {
        if (only.amount - plan.total_amount()).abs() > OVERPAYMENT_TOLERANCE {
            return Err(PlanError::InvalidInput(format!(
                "single installment of {:.2} must equal the total of {:.2}",
                only.amount,
                plan.total_amount()
            )));
        }
    }
    if let Some(bad) = plan
        .installments
        .iter()
        .find(|installment| !installment.amount.is_finite() || installment.amount < 0.0)
    {
        return Err(PlanError::InvalidInput(format!(
            "installment {} has an invalid amount",
            bad.id
        )));
    }
    for (position, installment) in plan.installments.iter().enumerate() {
        if installment.sequence_number != Some(position as u32 + 1) {
            return Err(PlanError::InvalidInput(format!(
                "installment at position {} is numbered {:?}",
                position + 1,
                installment.sequence_number
            )));
        }
    }
    Ok(())
}

fn ensure_index(plan: &BudgetPlan, index: usize) -> Result<()> {
    if index < plan.installments.len() {
        Ok(())
    } else {
        Err(PlanError::InstallmentNotFound(format!(
            "#{} (plan has {})",
            index + 1,
            plan.installments.len()
        )))
    }
}
