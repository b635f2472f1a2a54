//! `plan` command: create, open and edit the budget item itself.

use crate::cli::core::{is_none_keyword, parse_amount, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::core::store::PlanAction;
use crate::schedule::schedule_warnings;

const USAGE: &str =
    "plan <new|list|load|show|cost|quantity|rename|describe|backup|backups|restore> [args]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "plan",
        "Create, load and edit budget plans",
        USAGE,
        cmd_plan,
    )
    .with_subcommands(&[
        "new", "list", "load", "show", "cost", "quantity", "rename", "describe", "backup",
        "backups", "restore",
    ])]
}

fn cmd_plan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {}", USAGE)));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "new" => handle_new(context, rest),
        "list" => handle_list(context),
        "load" => handle_load(context, rest),
        "show" => handle_show(context),
        "cost" => handle_cost(context, rest),
        "quantity" => handle_quantity(context, rest),
        "rename" => handle_rename(context, rest),
        "describe" => handle_describe(context, rest),
        "backup" => handle_backup(context, rest),
        "backups" => handle_backups(context),
        "restore" => handle_restore(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown plan subcommand `{}`. Available: new, list, load, show, cost, quantity, rename, describe, backup, backups, restore",
            other
        ))),
    }
}

fn handle_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (name, cost, quantity) = match args {
        [name, cost] => (*name, *cost, "1"),
        [name, cost, quantity] => (*name, *cost, *quantity),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: plan new <name> <unit_cost> [quantity]".into(),
            ))
        }
    };
    let unit_cost = parse_amount(cost)?;
    let quantity = parse_quantity(quantity)?;
    let plan = context.service.create_plan(name, unit_cost, quantity)?;
    context.set_active_plan(&plan)?;
    io::print_success(format!(
        "Plan `{}` created with a total of {}.",
        plan.name(),
        context.money(plan.total_amount())
    ));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    let plans = context.service.list()?;
    if plans.is_empty() {
        io::print_info("No plans saved yet.");
        return Ok(());
    }
    output_section("Plans");
    let rows: Vec<Vec<String>> = plans
        .iter()
        .map(|summary| {
            let marker = if context.active_plan == Some(summary.id) {
                "*"
            } else {
                ""
            };
            vec![
                marker.to_string(),
                summary.name.clone(),
                context.money(summary.total_amount),
                context.money(summary.total_paid),
                summary.installment_count.to_string(),
            ]
        })
        .collect();
    render_table(&["", "Name", "Total", "Paid", "Installments"], &rows);
    Ok(())
}

fn handle_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: plan load <name>".into(),
        ));
    }
    let plan = context.service.find(&args.join(" "))?;
    context.set_active_plan(&plan)?;
    io::print_success(format!("Plan `{}` loaded.", plan.name()));
    for warning in schedule_warnings(&plan) {
        io::print_warning(warning);
    }
    Ok(())
}

fn handle_show(context: &mut ShellContext) -> CommandResult {
    let plan = context.current_plan()?;
    output_section(format!("Plan: {}", plan.name()));
    if let Some(description) = &plan.item.description {
        io::print_info(format!("  Description : {}", description));
    }
    io::print_info(format!("  Unit cost   : {}", context.money(plan.item.unit_cost)));
    io::print_info(format!("  Quantity    : {}", plan.item.quantity));
    io::print_info(format!("  Total       : {}", context.money(plan.total_amount())));
    io::print_info(format!("  Paid        : {}", context.money(plan.total_paid())));
    io::print_info(format!(
        "  Remaining   : {}",
        context.money(plan.remaining_balance())
    ));
    io::print_info(format!("  Installments: {}", plan.installments.len()));
    io::print_info(format!("  Payments    : {}", plan.payments.len()));
    for warning in schedule_warnings(&plan) {
        io::print_warning(warning);
    }
    Ok(())
}

fn handle_cost(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [cost] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: plan cost <unit_cost>".into(),
        ));
    };
    let unit_cost = parse_amount(cost)?;
    if unit_cost < 0.0 {
        return Err(CommandError::InvalidArguments(
            "unit cost must be zero or more".into(),
        ));
    }
    let plan = context.apply(PlanAction::SetUnitCost { unit_cost })?;
    io::print_success(format!("Total is now {}.", context.money(plan.total_amount())));
    Ok(())
}

fn handle_quantity(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [quantity] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: plan quantity <n>".into(),
        ));
    };
    let quantity = parse_quantity(quantity)?;
    let plan = context.apply(PlanAction::SetQuantity { quantity })?;
    io::print_success(format!("Total is now {}.", context.money(plan.total_amount())));
    Ok(())
}

fn handle_rename(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: plan rename <name>".into(),
        ));
    }
    let plan = context.apply(PlanAction::Rename {
        name: args.join(" "),
    })?;
    context.set_active_plan(&plan)?;
    io::print_success(format!("Plan renamed to `{}`.", plan.name()));
    Ok(())
}

fn handle_describe(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let text = args.join(" ");
    let description = if args.is_empty() || is_none_keyword(&text) {
        None
    } else {
        Some(text)
    };
    context.apply(PlanAction::SetDescription { description })?;
    io::print_success("Description updated.");
    Ok(())
}

fn handle_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.require_plan()?;
    let note = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };
    let name = context.storage.backup(id, note.as_deref())?;
    io::print_success(format!("Backup `{}` written.", name));
    Ok(())
}

fn handle_backups(context: &mut ShellContext) -> CommandResult {
    let id = context.require_plan()?;
    let backups = context.storage.list_backups(id)?;
    if backups.is_empty() {
        io::print_info("No backups for this plan.");
        return Ok(());
    }
    output_section("Plan backups");
    for (position, name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", position + 1, name));
    }
    Ok(())
}

fn handle_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.require_plan()?;
    let [reference] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: plan restore <backup name|number>".into(),
        ));
    };
    let backups = context.storage.list_backups(id)?;
    let name = match reference.parse::<usize>() {
        Ok(position) if position >= 1 && position <= backups.len() => {
            backups[position - 1].clone()
        }
        _ => reference.to_string(),
    };
    if !context.confirm(&format!("Replace the current plan with `{}`?", name))? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let plan = context.storage.restore(id, &name)?;
    io::print_success(format!("Plan `{}` restored from `{}`.", plan.name(), name));
    Ok(())
}

fn parse_quantity(input: &str) -> Result<u32, CommandError> {
    input.trim().parse::<u32>().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid quantity `{}`", input))
    })
}
