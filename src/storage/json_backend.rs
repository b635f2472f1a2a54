use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    fs,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::{
    core::utils::{ensure_dir, sanitize_note, write_atomic, write_file, PathResolver},
    domain::{BudgetPlan, Installment, Payment, PlanSummary},
    errors::PlanError,
};

use super::{PlanRepository, Result};

const PLAN_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DEFAULT_RETENTION: usize = 5;

/// One pretty-printed JSON document per plan, with rolling backups.
#[derive(Clone)]
pub struct JsonStorage {
    root: PathBuf,
    plans_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let plans_dir = PathResolver::plans_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&plans_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            plans_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn plan_path(&self, id: Uuid) -> PathBuf {
        self.plans_dir.join(format!("{}.{}", id, PLAN_EXTENSION))
    }

    fn backup_dir(&self, id: Uuid) -> PathBuf {
        self.backups_dir.join(id.to_string())
    }

    pub fn backup_path(&self, id: Uuid, backup_name: &str) -> PathBuf {
        self.backup_dir(id).join(backup_name)
    }

    /// Writes a labelled snapshot of the stored plan without changing it.
    pub fn backup(&self, id: Uuid, note: Option<&str>) -> Result<String> {
        let plan = self.read_budget_item(id)?;
        let dir = self.backup_dir(id);
        ensure_dir(&dir)?;
        let mut stem = format!("{}_{}", id, Utc::now().format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(label) = sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let name = format!("{}.{}", stem, PLAN_EXTENSION);
        write_file(&dir.join(&name), &serde_json::to_string_pretty(&plan)?)?;
        self.prune_backups(id)?;
        Ok(name)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self, id: Uuid) -> Result<Vec<String>> {
        let dir = self.backup_dir(id);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PLAN_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| {
            parse_backup_timestamp(b)
                .cmp(&parse_backup_timestamp(a))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    /// Replaces the stored plan with a backup; the current file is backed up first.
    pub fn restore(&self, id: Uuid, backup_name: &str) -> Result<BudgetPlan> {
        let source = self.backup_path(id, backup_name);
        if !source.exists() {
            return Err(PlanError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let plan = load_plan_from_path(&source)?;
        if plan.id() != id {
            return Err(PlanError::Storage(format!(
                "backup `{}` belongs to another plan",
                backup_name
            )));
        }
        self.write_plan(&plan)?;
        Ok(plan)
    }

    fn write_plan(&self, plan: &BudgetPlan) -> Result<()> {
        let path = self.plan_path(plan.id());
        self.backup_existing_file(plan.id(), &path)?;
        save_plan_to_path(plan, &path)
    }

    fn backup_existing_file(&self, id: Uuid, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(id);
        ensure_dir(&dir)?;
        let name = format!(
            "{}_{}.{}",
            id,
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT),
            PLAN_EXTENSION
        );
        fs::copy(path, dir.join(name))?;
        self.prune_backups(id)
    }

    fn prune_backups(&self, id: Uuid) -> Result<()> {
        let backups = self.list_backups(id)?;
        for stale in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backup_path(id, stale));
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<BudgetPlan>> {
        let mut plans = Vec::new();
        for entry in fs::read_dir(&self.plans_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PLAN_EXTENSION) {
                continue;
            }
            match load_plan_from_path(&path) {
                Ok(plan) => plans.push(plan),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable plan file")
                }
            }
        }
        Ok(plans)
    }
}

impl PlanRepository for JsonStorage {
    fn read_budget_item(&self, id: Uuid) -> Result<BudgetPlan> {
        let path = self.plan_path(id);
        if !path.exists() {
            return Err(PlanError::PlanNotFound(id.to_string()));
        }
        load_plan_from_path(&path)
    }

    fn write_installments(&self, id: Uuid, installments: &[Installment]) -> Result<()> {
        let mut plan = self.read_budget_item(id)?;
        plan.installments = installments.to_vec();
        plan.touch(Utc::now());
        self.write_plan(&plan)
    }

    fn append_payment(&self, id: Uuid, payment: Payment) -> Result<Payment> {
        let mut plan = self.read_budget_item(id)?;
        plan.touch(payment.recorded_at);
        plan.payments.push(payment.clone());
        self.write_plan(&plan)?;
        Ok(payment)
    }

    fn delete_payment(&self, payment_id: Uuid) -> Result<Payment> {
        for mut plan in self.load_all()? {
            if let Some(position) = plan.payments.iter().position(|p| p.id == payment_id) {
                let removed = plan.payments.remove(position);
                plan.touch(Utc::now());
                self.write_plan(&plan)?;
                return Ok(removed);
            }
        }
        Err(PlanError::PaymentNotFound(payment_id))
    }

    fn create_plan(&self, plan: &BudgetPlan) -> Result<()> {
        let path = self.plan_path(plan.id());
        if path.exists() {
            return Err(PlanError::Storage(format!(
                "plan {} already exists",
                plan.id()
            )));
        }
        save_plan_to_path(plan, &path)
    }

    fn save_plan(&self, plan: &BudgetPlan) -> Result<()> {
        self.write_plan(plan)
    }

    fn list_plans(&self) -> Result<Vec<PlanSummary>> {
        let mut summaries: Vec<PlanSummary> =
            self.load_all()?.iter().map(BudgetPlan::summary).collect();
        summaries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(summaries)
    }
}

pub fn save_plan_to_path(plan: &BudgetPlan, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(plan)?;
    write_atomic(path, &json)
}

pub fn load_plan_from_path(path: &Path) -> Result<BudgetPlan> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", PLAN_EXTENSION))?;
    let mut parts = stem.split('_').skip(1);
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    if !is_digits(date_part, 8) || !is_digits(time_part, 6) {
        return None;
    }
    let raw = format!("{}{}", date_part, time_part);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}
