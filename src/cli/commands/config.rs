use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "config [show|set <key> <value>|backup [note]|backups|restore <name|number>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and manage preferences",
        USAGE,
        cmd_config,
    )
    .with_subcommands(&["show", "set", "backup", "backups", "restore"])]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(
                    "usage: config set <locale|currency|screen_reader_mode|high_contrast_mode> <value>"
                        .into(),
                ));
            }
            let value = args[2..].join(" ");
            context.config.set(args[1], &value)?;
            context.persist_config()?;
            io::apply_config(&context.config, context.mode() == CliMode::Script);
            io::print_success(format!("`{}` updated.", args[1]));
            Ok(())
        }
        "backup" => {
            let note = (args.len() > 1).then(|| args[1..].join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            io::print_success(format!("Configuration backup saved: {}", name));
            Ok(())
        }
        "backups" => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                io::print_warning("No configuration backups found.");
                return Ok(());
            }
            output_section("Configuration backups");
            for (position, name) in backups.iter().enumerate() {
                io::print_info(format!("  {:>2}. {}", position + 1, name));
            }
            Ok(())
        }
        "restore" => {
            let Some(reference) = args.get(1) else {
                return Err(CommandError::InvalidArguments(
                    "usage: config restore <name|number>".into(),
                ));
            };
            restore(context, reference)
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config subcommand `{}`. Usage: {}",
            other, USAGE
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output_section("Configuration");
    io::print_info(format!("  Locale            : {}", config.locale));
    io::print_info(format!("  Currency          : {}", config.currency));
    io::print_info(format!(
        "  Screen reader     : {}",
        on_off(config.screen_reader_mode)
    ));
    io::print_info(format!(
        "  High contrast     : {}",
        on_off(config.high_contrast_mode)
    ));
    io::print_info(format!(
        "  Last opened plan  : {}",
        config.last_opened_plan.as_deref().unwrap_or("(none)")
    ));
    io::print_info(format!(
        "  Stored at         : {}",
        context.config_manager.path().display()
    ));
    Ok(())
}

/// Accepts a list position or any unique part of a backup name.
fn restore(context: &mut ShellContext, reference: &str) -> CommandResult {
    let backups = context.config_manager.list_backups()?;
    if backups.is_empty() {
        return Err(CommandError::InvalidArguments(
            "no configuration backups available".into(),
        ));
    }
    let target = match reference.parse::<usize>() {
        Ok(position) => backups
            .get(position.saturating_sub(1))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "configuration backup {} out of range",
                    reference
                ))
            })?,
        Err(_) => backups
            .iter()
            .find(|candidate| candidate.contains(reference))
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no configuration backup matches `{}`",
                    reference
                ))
            })?,
    };

    context.config = context.config_manager.restore(&target)?;
    io::apply_config(&context.config, context.mode() == CliMode::Script);
    io::print_success(format!("Configuration restored from {}.", target));
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
