use crate::cli::core::{
    is_none_keyword, parse_amount, parse_date, parse_position, CommandError, CommandResult,
    ShellContext,
};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::core::store::PlanAction;
use crate::domain::{BudgetPlan, Displayable, InstallmentPatch, Priority};

const USAGE: &str = "installment <add|remove <n>|amount <n> <amount>|due <n> <YYYY-MM-DD|none>|priority <n> <low|medium|high>|assignee <n> <name|none>>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "installment",
        "Add, remove and edit installments of the loaded plan",
        USAGE,
        cmd_installment,
    )
    .with_subcommands(&["add", "remove", "amount", "due", "priority", "assignee"])]
}

fn cmd_installment(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", USAGE)));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context),
        "remove" => handle_remove(context, rest),
        "amount" => handle_edit(context, rest, "amount <n> <amount>", |value| {
            Ok(InstallmentPatch::amount(parse_amount(value)?))
        }),
        "due" => handle_edit(context, rest, "due <n> <YYYY-MM-DD|none>", |value| {
            if is_none_keyword(value) {
                Ok(InstallmentPatch::due_date(None))
            } else {
                Ok(InstallmentPatch::due_date(Some(parse_date(value)?)))
            }
        }),
        "priority" => handle_edit(context, rest, "priority <n> <low|medium|high>", |value| {
            value
                .parse::<Priority>()
                .map(InstallmentPatch::priority)
                .map_err(CommandError::InvalidArguments)
        }),
        "assignee" => handle_edit(context, rest, "assignee <n> <name|none>", |value| {
            if is_none_keyword(value) {
                Ok(InstallmentPatch::assignee(None))
            } else {
                Ok(InstallmentPatch::assignee(Some(value.to_string())))
            }
        }),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown installment subcommand `{}`. Available: add, remove, amount, due, priority, assignee",
            other
        ))),
    }
}

fn handle_add(context: &mut ShellContext) -> CommandResult {
    let plan = context.apply(PlanAction::AddInstallment)?;
    io::print_success(format!(
        "Added installment #{}; the total is split evenly again.",
        plan.installments.len()
    ));
    print_installments(context, &plan);
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [position] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: installment remove <n>".into(),
        ));
    };
    let index = parse_position(position)?;
    let plan = context.current_plan()?;
    let label = plan
        .installments
        .get(index)
        .map(Displayable::display_label)
        .unwrap_or_else(|| format!("#{}", index + 1));
    if !context.confirm(&format!("Remove installment {}?", label))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let plan = context.apply(PlanAction::RemoveInstallment { index })?;
    io::print_success(format!("Removed installment #{}.", index + 1));
    print_installments(context, &plan);
    Ok(())
}

fn handle_edit(
    context: &mut ShellContext,
    args: &[&str],
    usage: &str,
    build: impl FnOnce(&str) -> Result<InstallmentPatch, CommandError>,
) -> CommandResult {
    let [position, value @ ..] = args else {
        return Err(CommandError::InvalidArguments(format!(
            "usage: installment {}",
            usage
        )));
    };
    if value.is_empty() {
        return Err(CommandError::InvalidArguments(format!(
            "usage: installment {}",
            usage
        )));
    }
    let index = parse_position(position)?;
    let patch = build(&value.join(" "))?;
    let plan = context.apply(PlanAction::EditInstallment { index, patch })?;
    io::print_success(format!("Installment #{} updated.", index + 1));
    print_installments(context, &plan);
    Ok(())
}

fn print_installments(context: &ShellContext, plan: &BudgetPlan) {
    for installment in &plan.installments {
        let mut line = format!(
            "  #{:<3} {:>14}  due {}  {}",
            installment.sequence_number.unwrap_or_default(),
            context.money(installment.amount),
            context.date(installment.due_date),
            installment.priority
        );
        if let Some(assignee) = &installment.assignee {
            line.push_str(&format!("  ({})", assignee));
        }
        io::print_info(line);
    }
}
