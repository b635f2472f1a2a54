pub mod json_backend;
pub mod memory;

use uuid::Uuid;

use crate::domain::{BudgetPlan, Installment, Payment, PlanSummary};
use crate::errors::PlanError;

pub type Result<T> = std::result::Result<T, PlanError>;

/// Persistence collaborator for budget plans.
///
/// The schedule logic never calls this itself; services read a plan, compute
/// the next state, and write back through the narrowest method that fits.
pub trait PlanRepository: Send + Sync {
    /// Reads the item total, installments and payments of one plan.
    fn read_budget_item(&self, id: Uuid) -> Result<BudgetPlan>;
    fn write_installments(&self, id: Uuid, installments: &[Installment]) -> Result<()>;
    /// Stores `payment` as given; the caller stamps `recorded_at`.
    fn append_payment(&self, id: Uuid, payment: Payment) -> Result<Payment>;
    fn delete_payment(&self, payment_id: Uuid) -> Result<Payment>;

    fn create_plan(&self, plan: &BudgetPlan) -> Result<()>;
    fn save_plan(&self, plan: &BudgetPlan) -> Result<()>;
    fn list_plans(&self) -> Result<Vec<PlanSummary>>;

    /// Case-insensitive lookup by item name.
    fn find_by_name(&self, name: &str) -> Result<Option<Uuid>> {
        let needle = name.trim().to_lowercase();
        Ok(self
            .list_plans()?
            .into_iter()
            .find(|summary| summary.name.trim().to_lowercase() == needle)
            .map(|summary| summary.id))
    }
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
