//! Shell context, dispatch and error types shared by every command.

use std::{collections::BTreeMap, env, io, sync::Arc};

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::{
        clock::{Clock, FixedClock, SystemClock},
        services::{PlanService, ServiceError},
        store::PlanAction,
        utils::PathResolver,
    },
    currency::{format_currency_value, format_date, CurrencyCode},
    domain::BudgetPlan,
    errors::PlanError,
    storage::JsonStorage,
};

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};

pub const SCRIPT_ENV: &str = "EVENT_BUDGET_CLI_SCRIPT";
pub const TODAY_ENV: &str = "EVENT_BUDGET_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub service: PlanService,
    pub storage: JsonStorage,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub active_plan: Option<Uuid>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let base = PathResolver::base_dir();
        let storage = JsonStorage::new(Some(base.clone()), None)?;
        let service = PlanService::new(Box::new(storage.clone()), clock_from_env()?);
        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;

        if mode == CliMode::Script {
            colored::control::set_override(false);
        }
        cli_io::apply_config(&config, mode == CliMode::Script);

        let mut context = ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            service,
            storage,
            config_manager,
            config,
            active_plan: None,
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(reference) = self.config.last_opened_plan.clone() else {
            return;
        };
        if let Ok(plan) = self.service.find(&reference) {
            cli_io::print_success(format!("Loaded last plan `{}`.", plan.name()));
            self.active_plan = Some(plan.id());
        }
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn completion_table(&self) -> BTreeMap<&'static str, Vec<&'static str>> {
        self.registry.completion_table()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        match self.current_plan() {
            Ok(plan) => format!("event_budget({})> ", plan.name()),
            Err(_) => "event_budget> ".to_string(),
        }
    }

    pub(crate) fn require_plan(&self) -> Result<Uuid, CommandError> {
        self.active_plan.ok_or(CommandError::PlanNotLoaded)
    }

    pub(crate) fn current_plan(&self) -> Result<BudgetPlan, CommandError> {
        let id = self.require_plan()?;
        Ok(self.service.load(id)?)
    }

    /// Runs `action` against the active plan and returns the stored result.
    pub(crate) fn apply(&mut self, action: PlanAction) -> Result<BudgetPlan, CommandError> {
        let id = self.require_plan()?;
        Ok(self.service.apply(id, action)?)
    }

    pub(crate) fn set_active_plan(&mut self, plan: &BudgetPlan) -> CommandResult {
        self.active_plan = Some(plan.id());
        self.config.last_opened_plan = Some(plan.name().to_string());
        self.persist_config()
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format_currency_value(
            amount,
            &CurrencyCode::new(self.config.currency.as_str()),
            &self.config.locale_config(),
            &self.config.format_options(),
        )
    }

    pub(crate) fn date(&self, date: Option<NaiveDate>) -> String {
        date.map(|date| format_date(&self.config.locale_config(), date))
            .unwrap_or_else(|| "-".to_string())
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.service.clock().today()
    }

    /// Script mode never prompts; destructive commands go ahead.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::PlanNotLoaded => {
                cli_io::print_error("No plan loaded. Use `plan new` or `plan load` first.");
            }
            other => cli_io::print_error(other),
        }
        Ok(())
    }
}

fn clock_from_env() -> Result<Arc<dyn Clock>, CliError> {
    match env::var(TODAY_ENV) {
        Ok(raw) if !raw.trim().is_empty() => {
            let today = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                CliError::Input(format!("{} must be YYYY-MM-DD, got `{}`", TODAY_ENV, raw))
            })?;
            Ok(Arc::new(FixedClock::new(today)))
        }
        _ => Ok(Arc::new(SystemClock)),
    }
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{}`", input)))
}

/// One-based position as typed by the user, converted to an index.
pub(crate) fn parse_position(input: &str) -> Result<usize, CommandError> {
    match input.trim().trim_start_matches('#').parse::<usize>() {
        Ok(position) if position > 0 => Ok(position - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "invalid position `{}` (numbers start at 1)",
            input
        ))),
    }
}

/// `none` clears an optional value.
pub(crate) fn is_none_keyword(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "none" | "-" | "clear")
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No plan loaded. Use `plan new` or `plan load` first.")]
    PlanNotLoaded,
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Plan(err) => CommandError::Plan(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
        }
    }
}

/// Top-level failure of the shell binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}
