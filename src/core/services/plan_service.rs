use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::store::{reduce, PlanAction, PlanStore};
use crate::domain::{BudgetItem, BudgetPlan, Displayable, Payment, PlanSummary};
use crate::errors::PlanError;
use crate::schedule::{build_schedule, schedule_warnings, validate_payment, PaymentSchedule};
use crate::storage::PlanRepository;

use super::{ServiceError, ServiceResult};

/// Reads plans through the repository, applies transitions and writes them back.
pub struct PlanService {
    storage: Box<dyn PlanRepository>,
    clock: Arc<dyn Clock>,
}

impl PlanService {
    pub fn new(storage: Box<dyn PlanRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn create_plan(&self, name: &str, unit_cost: f64, quantity: u32) -> ServiceResult<BudgetPlan> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("Plan name cannot be empty".into()));
        }
        if !unit_cost.is_finite() || unit_cost < 0.0 {
            return Err(ServiceError::Invalid(format!(
                "Unit cost must be zero or more, got {}",
                unit_cost
            )));
        }
        self.ensure_unique_name(None, name)?;
        let plan = BudgetPlan::new(
            BudgetItem::new(name, unit_cost, quantity),
            self.clock.today(),
            self.clock.now(),
        );
        PlanStore::new(plan.clone())?;
        self.storage.create_plan(&plan)?;
        tracing::info!(plan = %plan.id(), item = %plan.item.display_label(), "plan created");
        Ok(plan)
    }

    pub fn load(&self, id: Uuid) -> ServiceResult<BudgetPlan> {
        Ok(self.storage.read_budget_item(id)?)
    }

    /// Resolves a plan by id or, failing that, by name.
    pub fn find(&self, reference: &str) -> ServiceResult<BudgetPlan> {
        let reference = reference.trim();
        if let Ok(id) = Uuid::parse_str(reference) {
            return self.load(id);
        }
        match self.storage.find_by_name(reference)? {
            Some(id) => self.load(id),
            None => Err(PlanError::PlanNotFound(reference.to_string()).into()),
        }
    }

    pub fn list(&self) -> ServiceResult<Vec<PlanSummary>> {
        Ok(self.storage.list_plans()?)
    }

    pub fn schedule(&self, id: Uuid) -> ServiceResult<PaymentSchedule> {
        let plan = self.load(id)?;
        Ok(build_schedule(&plan, self.clock.today()))
    }

    pub fn warnings(&self, id: Uuid) -> ServiceResult<Vec<String>> {
        let plan = self.load(id)?;
        Ok(schedule_warnings(&plan))
    }

    /// Applies one transition and persists the result.
    ///
    /// Installment-only transitions go through `write_installments`; payments go
    /// through the dedicated append/delete calls; anything else rewrites the plan.
    pub fn apply(&self, id: Uuid, action: PlanAction) -> ServiceResult<BudgetPlan> {
        match action {
            PlanAction::RecordPayment {
                amount,
                payment_date,
                note,
            } => {
                self.record_payment(id, amount, payment_date, note)?;
                return self.load(id);
            }
            PlanAction::DeletePayment { id: payment_id } => {
                self.delete_payment(id, payment_id)?;
                return self.load(id);
            }
            _ => {}
        }

        if let PlanAction::Rename { name } = &action {
            self.ensure_unique_name(Some(id), name)?;
        }

        let current = self.load(id)?;
        let next = reduce(&current, &action, self.clock.as_ref())?;
        if action.touches_installments_only() {
            self.storage.write_installments(id, &next.installments)?;
        } else {
            self.storage.save_plan(&next)?;
        }
        tracing::info!(plan = %id, action = action.label(), "plan updated");
        Ok(next)
    }

    /// Validates against the global remaining balance before anything is written.
    pub fn record_payment(
        &self,
        id: Uuid,
        amount: Option<f64>,
        payment_date: Option<NaiveDate>,
        note: Option<String>,
    ) -> ServiceResult<Payment> {
        let plan = self.load(id)?;
        let mut payment = match validate_payment(amount, payment_date, plan.remaining_balance()) {
            Ok(payment) => payment,
            Err(err) => {
                tracing::warn!(plan = %id, error = %err, "payment rejected");
                return Err(PlanError::from(err).into());
            }
        };
        payment.note = note
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let stored = self
            .storage
            .append_payment(id, Payment::from_new(payment, self.clock.now()))?;
        tracing::info!(plan = %id, payment = %stored.display_label(), "payment recorded");
        Ok(stored)
    }

    pub fn delete_payment(&self, id: Uuid, payment_id: Uuid) -> ServiceResult<Payment> {
        let plan = self.load(id)?;
        if plan.payment(payment_id).is_none() {
            return Err(PlanError::PaymentNotFound(payment_id).into());
        }
        let removed = self.storage.delete_payment(payment_id)?;
        tracing::info!(plan = %id, payment = %removed.display_label(), "payment deleted");
        Ok(removed)
    }

    fn ensure_unique_name(&self, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        match self.storage.find_by_name(candidate)? {
            Some(existing) if exclude.map_or(true, |id| id != existing) => Err(
                ServiceError::Invalid(format!("Plan `{}` already exists", candidate.trim())),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::domain::InstallmentPatch;
    use crate::schedule::{InstallmentStatus, ValidationError};
    use crate::storage::MemoryStorage;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    fn service() -> PlanService {
        PlanService::new(
            Box::new(MemoryStorage::new()),
            Arc::new(FixedClock::new(today())),
        )
    }

    #[test]
    fn create_plan_starts_with_one_installment_due_today() {
        let service = service();
        let plan = service.create_plan("Venue", 1000.0, 1).unwrap();
        assert_eq!(plan.installments.len(), 1);
        assert_eq!(plan.installments[0].amount, 1000.0);
        assert_eq!(plan.installments[0].due_date, Some(today()));
        assert_eq!(service.find("venue").unwrap().id(), plan.id());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let service = service();
        service.create_plan("Venue", 1000.0, 1).unwrap();
        let err = service.create_plan(" VENUE ", 10.0, 1).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn waterfall_after_two_payments() {
        let service = service();
        let id = service.create_plan("Venue", 1000.0, 1).unwrap().id();
        service.apply(id, PlanAction::AddInstallment).unwrap();
        service.apply(id, PlanAction::AddInstallment).unwrap();
        service
            .record_payment(id, Some(400.0), Some(today()), None)
            .unwrap();
        service
            .record_payment(id, Some(300.0), Some(today()), Some("second".into()))
            .unwrap();

        let schedule = service.schedule(id).unwrap();
        let statuses: Vec<_> = schedule.rows.iter().map(|row| row.status).collect();
        assert_eq!(statuses[0], InstallmentStatus::Paid);
        assert_eq!(statuses[1], InstallmentStatus::Paid);
        assert_eq!(schedule.rows[2].amount_covered, 33.34);
        assert_eq!(schedule.rows[2].amount_remaining, 300.0);
        assert_eq!(schedule.next_suggested_payment, 300.0);
    }

    #[test]
    fn overpayment_is_not_written() {
        let service = service();
        let id = service.create_plan("Venue", 1000.0, 1).unwrap().id();
        let err = service
            .record_payment(id, Some(1000.01), Some(today()), None)
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Plan(PlanError::Validation(
                ValidationError::OverpaymentExceeded { .. }
            ))
        ));
        assert!(service.load(id).unwrap().payments.is_empty());
    }

    #[test]
    fn edits_persist_through_the_repository() {
        let service = service();
        let id = service.create_plan("Cake", 300.0, 1).unwrap().id();
        service.apply(id, PlanAction::AddInstallment).unwrap();
        service
            .apply(
                id,
                PlanAction::EditInstallment {
                    index: 0,
                    patch: InstallmentPatch::amount(100.0),
                },
            )
            .unwrap();
        let stored = service.load(id).unwrap();
        assert_eq!(stored.installments[0].amount, 100.0);
        assert_eq!(stored.installments[1].amount, 150.0);
        assert!(!service.warnings(id).unwrap().is_empty());
    }

    #[test]
    fn payments_can_be_deleted_through_apply() {
        let service = service();
        let id = service.create_plan("Band", 800.0, 1).unwrap().id();
        let payment = service
            .record_payment(id, Some(200.0), Some(today()), None)
            .unwrap();
        let plan = service
            .apply(id, PlanAction::DeletePayment { id: payment.id })
            .unwrap();
        assert!(plan.payments.is_empty());
        assert!(service.delete_payment(id, payment.id).is_err());
    }

    #[test]
    fn renaming_to_an_existing_name_fails() {
        let service = service();
        service.create_plan("Band", 800.0, 1).unwrap();
        let id = service.create_plan("DJ", 400.0, 1).unwrap().id();
        assert!(service
            .apply(id, PlanAction::Rename { name: "band".into() })
            .is_err());
        service
            .apply(id, PlanAction::Rename { name: "dj".into() })
            .unwrap();
        assert_eq!(service.load(id).unwrap().name(), "dj");
    }

    #[test]
    fn unknown_plans_report_not_found() {
        let service = service();
        let err = service.find("nothing").unwrap_err();
        assert!(matches!(err, ServiceError::Plan(PlanError::PlanNotFound(_))));
    }

    #[test]
    fn recorded_payments_are_stamped_by_the_service_clock() {
        let service = service();
        let id = service.create_plan("Venue", 1000.0, 1).unwrap().id();
        let stored = service
            .record_payment(id, Some(150.0), Some(today()), None)
            .unwrap();
        let expected = FixedClock::new(today()).now();
        assert_eq!(stored.recorded_at, expected);

        let plan = service.load(id).unwrap();
        assert_eq!(plan.payments[0].recorded_at, expected);
        assert_eq!(plan.updated_at, expected);
    }
}
