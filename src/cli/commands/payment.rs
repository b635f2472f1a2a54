use crate::cli::core::{
    parse_amount, parse_date, parse_position, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::domain::Payment;

const USAGE: &str = "payment <suggest|record [amount] [YYYY-MM-DD] [note]|list|delete <n>>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "payment",
        "Record, list and delete payments against the loaded plan",
        USAGE,
        cmd_payment,
    )
    .with_subcommands(&["suggest", "record", "list", "delete"])]
}

fn cmd_payment(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", USAGE)));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "suggest" => handle_suggest(context),
        "record" => handle_record(context, rest),
        "list" => handle_list(context),
        "delete" => handle_delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown payment subcommand `{}`. Available: suggest, record, list, delete",
            other
        ))),
    }
}

fn handle_suggest(context: &mut ShellContext) -> CommandResult {
    let id = context.require_plan()?;
    let schedule = context.service.schedule(id)?;
    if schedule.is_settled() {
        io::print_info("Everything is paid; no payment is due.");
    } else {
        io::print_info(format!(
            "Suggested next payment: {}",
            context.money(schedule.next_suggested_payment)
        ));
    }
    Ok(())
}

/// Amount defaults to the suggestion and the date to today.
fn handle_record(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.require_plan()?;
    let amount = match args.first() {
        Some(raw) => parse_amount(raw)?,
        None => context.service.schedule(id)?.next_suggested_payment,
    };
    let payment_date = match args.get(1) {
        Some(raw) => parse_date(raw)?,
        None => context.today(),
    };
    let note = (args.len() > 2).then(|| args[2..].join(" "));

    let payment = context
        .service
        .record_payment(id, Some(amount), Some(payment_date), note)?;
    io::print_success(format!(
        "Recorded {} on {}.",
        context.money(payment.amount),
        context.date(Some(payment.payment_date))
    ));
    let schedule = context.service.schedule(id)?;
    io::print_info(format!(
        "Remaining balance: {}",
        context.money(schedule.remaining_balance)
    ));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let plan = context.current_plan()?;
    if plan.payments.is_empty() {
        io::print_info("No payments recorded.");
        return Ok(());
    }
    output_section(format!("Payments: {}", plan.name()));
    let rows: Vec<Vec<String>> = ordered(&plan.payments)
        .iter()
        .enumerate()
        .map(|(position, payment)| {
            vec![
                (position + 1).to_string(),
                context.date(Some(payment.payment_date)),
                context.money(payment.amount),
                payment.note.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_table(&["#", "Date", "Amount", "Note"], &rows);
    io::print_info(format!("Total paid: {}", context.money(plan.total_paid())));
    Ok(())
}

fn handle_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [position] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: payment delete <n>".into(),
        ));
    };
    let index = parse_position(position)?;
    let plan = context.current_plan()?;
    let payments = ordered(&plan.payments);
    let Some(payment) = payments.get(index) else {
        return Err(CommandError::InvalidArguments(format!(
            "no payment #{} (plan has {})",
            index + 1,
            payments.len()
        )));
    };
    let prompt = format!(
        "Delete payment of {} on {}?",
        context.money(payment.amount),
        context.date(Some(payment.payment_date))
    );
    if !context.confirm(&prompt)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = context.service.delete_payment(plan.id(), payment.id)?;
    io::print_success(format!("Deleted payment of {}.", context.money(removed.amount)));
    Ok(())
}

/// Payments by date, then by the time they were recorded.
fn ordered(payments: &[Payment]) -> Vec<&Payment> {
    let mut ordered: Vec<&Payment> = payments.iter().collect();
    ordered.sort_by(|a, b| {
        a.payment_date
            .cmp(&b.payment_date)
            .then_with(|| a.recorded_at.cmp(&b.recorded_at))
    });
    ordered
}
