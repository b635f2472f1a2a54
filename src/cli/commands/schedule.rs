use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "schedule",
        "Show installment coverage and status for the loaded plan",
        "schedule",
        cmd_schedule,
    )]
}

fn cmd_schedule(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let id = context.require_plan()?;
    let plan = context.service.load(id)?;
    let schedule = context.service.schedule(id)?;

    output_section(format!("Schedule: {} (as of {})", plan.name(), schedule.as_of));
    let rows: Vec<Vec<String>> = schedule
        .rows
        .iter()
        .map(|row| {
            let installment = plan
                .installments
                .iter()
                .find(|installment| installment.id == row.installment_id);
            vec![
                row.sequence_number
                    .map(|number| number.to_string())
                    .unwrap_or_else(|| "-".into()),
                context.date(row.due_date),
                context.money(row.amount),
                context.money(row.amount_covered),
                context.money(row.amount_remaining),
                row.status.to_string(),
                installment
                    .map(|installment| installment.priority.to_string())
                    .unwrap_or_default(),
                installment
                    .and_then(|installment| installment.assignee.clone())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    render_table(
        &[
            "#", "Due", "Amount", "Covered", "Remaining", "Status", "Priority", "Assignee",
        ],
        &rows,
    );

    io::print_info(format!("Total     : {}", context.money(schedule.total_amount)));
    io::print_info(format!("Paid      : {}", context.money(schedule.total_paid)));
    io::print_info(format!(
        "Remaining : {}",
        context.money(schedule.remaining_balance)
    ));
    io::print_info(format!("Progress  : {:.1}%", schedule.progress_pct));
    if schedule.overdue_count > 0 {
        io::print_warning(format!(
            "{} installment(s) overdue.",
            schedule.overdue_count
        ));
    }
    if schedule.is_settled() {
        io::print_success("Fully paid.");
    } else {
        io::print_info(format!(
            "Next suggested payment: {}",
            context.money(schedule.next_suggested_payment)
        ));
    }
    for warning in context.service.warnings(id)? {
        io::print_warning(warning);
    }
    Ok(())
}
