pub mod budget_item;
pub mod common;
pub mod installment;
pub mod payment;
pub mod plan;

pub use budget_item::BudgetItem;
pub use common::Displayable;
pub use installment::{Installment, InstallmentPatch, Priority};
pub use payment::{NewPayment, Payment};
pub use plan::{BudgetPlan, PlanSummary, CURRENT_SCHEMA_VERSION};
