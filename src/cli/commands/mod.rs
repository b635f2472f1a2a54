pub mod config;
pub mod installment;
pub mod payment;
pub mod plan;
pub mod schedule;
pub mod system;

use crate::cli::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in system::definitions()
        .into_iter()
        .chain(plan::definitions())
        .chain(installment::definitions())
        .chain(payment::definitions())
        .chain(schedule::definitions())
        .chain(config::definitions())
    {
        registry.register(entry);
    }
}
