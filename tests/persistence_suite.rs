use assert_fs::prelude::*;
use assert_fs::TempDir;
use chrono::{NaiveDate, Utc};
use event_budget::{
    core::utils::tmp_path,
    domain::{BudgetItem, BudgetPlan, NewPayment, Payment, CURRENT_SCHEMA_VERSION},
    errors::PlanError,
    storage::{json_backend::load_plan_from_path, JsonStorage, PlanRepository},
};
use std::fs;

fn sample_plan(name: &str) -> BudgetPlan {
    let today = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    BudgetPlan::new(BudgetItem::new(name, 250.0, 4), today, Utc::now())
}

fn payment(amount: f64) -> Payment {
    Payment::from_new(
        NewPayment::new(amount, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap()),
        Utc::now(),
    )
}

#[test]
fn plan_files_live_under_the_plans_directory() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), None).unwrap();
    let plan = sample_plan("Venue");
    storage.create_plan(&plan).unwrap();

    temp.child("plans")
        .child(format!("{}.json", plan.id()))
        .assert(predicates::path::exists());
    temp.child("backups").assert(predicates::path::is_dir());
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(2)).unwrap();
    let plan = sample_plan("Reliable");
    storage.create_plan(&plan).unwrap();
    let path = storage.plan_path(plan.id());
    let original = fs::read_to_string(&path).unwrap();

    // A directory at the staging path makes the write fail.
    let staging = tmp_path(&path);
    fs::create_dir_all(&staging).unwrap();

    let result = storage.append_payment(plan.id(), payment(100.0));
    assert!(matches!(result, Err(PlanError::Storage(_))));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);

    fs::remove_dir_all(&staging).unwrap();
}

#[test]
fn every_overwrite_keeps_a_bounded_backup_trail() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(2)).unwrap();
    let plan = sample_plan("Trail");
    storage.create_plan(&plan).unwrap();
    assert!(storage.list_backups(plan.id()).unwrap().is_empty());

    storage.backup(plan.id(), Some("one")).unwrap();
    storage.backup(plan.id(), Some("two")).unwrap();
    storage.append_payment(plan.id(), payment(10.0)).unwrap();
    storage.append_payment(plan.id(), payment(20.0)).unwrap();

    assert_eq!(storage.list_backups(plan.id()).unwrap().len(), 2);
    assert_eq!(storage.read_budget_item(plan.id()).unwrap().payments.len(), 2);
}

#[test]
fn restore_brings_back_an_earlier_state() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(5)).unwrap();
    let plan = sample_plan("Flowers");
    storage.create_plan(&plan).unwrap();
    let snapshot = storage.backup(plan.id(), Some("before payments")).unwrap();
    assert!(snapshot.ends_with("_before-payments.json"));

    storage.append_payment(plan.id(), payment(300.0)).unwrap();
    assert_eq!(storage.read_budget_item(plan.id()).unwrap().payments.len(), 1);

    let restored = storage.restore(plan.id(), &snapshot).unwrap();
    assert!(restored.payments.is_empty());
    assert!(storage
        .read_budget_item(plan.id())
        .unwrap()
        .payments
        .is_empty());
    assert!(storage.restore(plan.id(), "missing.json").is_err());
}

#[test]
fn unreadable_files_are_skipped_when_listing() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), None).unwrap();
    storage.create_plan(&sample_plan("Cake")).unwrap();
    temp.child("plans")
        .child("broken.json")
        .write_str("{ not json")
        .unwrap();

    let plans = storage.list_plans().unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].name, "Cake");
}

#[test]
fn missing_schema_version_defaults_to_current() {
    let temp = TempDir::new().unwrap();
    let plan = sample_plan("Legacy");
    let mut value = serde_json::to_value(&plan).unwrap();
    value.as_object_mut().unwrap().remove("schema_version");
    let file = temp.child("legacy.json");
    file.write_str(&value.to_string()).unwrap();

    let loaded = load_plan_from_path(file.path()).unwrap();
    assert_eq!(loaded.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(loaded.item, plan.item);
}
