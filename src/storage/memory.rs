use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{BudgetPlan, Installment, Payment, PlanSummary};
use crate::errors::PlanError;

use super::{PlanRepository, Result};

/// Process-local repository, used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    plans: RwLock<HashMap<Uuid, BudgetPlan>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|plans| plans.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, BudgetPlan>>> {
        self.plans
            .read()
            .map_err(|_| PlanError::Storage("plan store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, BudgetPlan>>> {
        self.plans
            .write()
            .map_err(|_| PlanError::Storage("plan store lock poisoned".into()))
    }
}

impl PlanRepository for MemoryStorage {
    fn read_budget_item(&self, id: Uuid) -> Result<BudgetPlan> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or_else(|| PlanError::PlanNotFound(id.to_string()))
    }

    fn write_installments(&self, id: Uuid, installments: &[Installment]) -> Result<()> {
        let mut plans = self.write()?;
        let plan = plans
            .get_mut(&id)
            .ok_or_else(|| PlanError::PlanNotFound(id.to_string()))?;
        plan.installments = installments.to_vec();
        plan.touch(Utc::now());
        Ok(())
    }

    fn append_payment(&self, id: Uuid, payment: Payment) -> Result<Payment> {
        let mut plans = self.write()?;
        let plan = plans
            .get_mut(&id)
            .ok_or_else(|| PlanError::PlanNotFound(id.to_string()))?;
        plan.touch(payment.recorded_at);
        plan.payments.push(payment.clone());
        Ok(payment)
    }

    fn delete_payment(&self, payment_id: Uuid) -> Result<Payment> {
        let mut plans = self.write()?;
        for plan in plans.values_mut() {
            if let Some(position) = plan.payments.iter().position(|p| p.id == payment_id) {
                let removed = plan.payments.remove(position);
                plan.touch(Utc::now());
                return Ok(removed);
            }
        }
        Err(PlanError::PaymentNotFound(payment_id))
    }

    fn create_plan(&self, plan: &BudgetPlan) -> Result<()> {
        let mut plans = self.write()?;
        if plans.contains_key(&plan.id()) {
            return Err(PlanError::Storage(format!(
                "plan {} already exists",
                plan.id()
            )));
        }
        plans.insert(plan.id(), plan.clone());
        Ok(())
    }

    fn save_plan(&self, plan: &BudgetPlan) -> Result<()> {
        self.write()?.insert(plan.id(), plan.clone());
        Ok(())
    }

    fn list_plans(&self) -> Result<Vec<PlanSummary>> {
        let mut summaries: Vec<PlanSummary> =
            self.read()?.values().map(BudgetPlan::summary).collect();
        summaries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BudgetItem, NewPayment};
    use chrono::{NaiveDate, TimeZone};

    fn plan(name: &str) -> BudgetPlan {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        BudgetPlan::new(BudgetItem::new(name, 100.0, 1), today, Utc::now())
    }

    #[test]
    fn find_by_name_ignores_case() {
        let storage = MemoryStorage::new();
        let venue = plan("Venue");
        storage.create_plan(&venue).unwrap();
        storage.create_plan(&plan("Catering")).unwrap();
        assert_eq!(storage.find_by_name(" venue ").unwrap(), Some(venue.id()));
        assert_eq!(storage.find_by_name("music").unwrap(), None);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn listing_is_sorted_by_name() {
        let storage = MemoryStorage::new();
        storage.create_plan(&plan("venue")).unwrap();
        storage.create_plan(&plan("Attire")).unwrap();
        let names: Vec<_> = storage
            .list_plans()
            .unwrap()
            .into_iter()
            .map(|summary| summary.name)
            .collect();
        assert_eq!(names, vec!["Attire", "venue"]);
    }

    #[test]
    fn write_installments_requires_existing_plan() {
        let storage = MemoryStorage::new();
        let err = storage.write_installments(Uuid::new_v4(), &[]).unwrap_err();
        assert!(matches!(err, PlanError::PlanNotFound(_)));
    }

    #[test]
    fn appended_payments_keep_the_callers_timestamp() {
        let storage = MemoryStorage::new();
        let venue = plan("Venue");
        storage.create_plan(&venue).unwrap();
        let recorded_at = Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap();
        let payment = Payment::from_new(
            NewPayment::new(40.0, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()),
            recorded_at,
        );

        let stored = storage.append_payment(venue.id(), payment).unwrap();
        assert_eq!(stored.recorded_at, recorded_at);
        let plan = storage.read_budget_item(venue.id()).unwrap();
        assert_eq!(plan.payments[0].recorded_at, recorded_at);
        assert_eq!(plan.updated_at, recorded_at);
    }
}
