mod common;

use common::{setup_test_env, today};
use event_budget::{
    core::{services::ServiceError, store::PlanAction},
    domain::{Displayable, InstallmentPatch, Priority},
    errors::PlanError,
    schedule::{InstallmentStatus, ValidationError},
};

#[test]
fn plan_lifecycle_through_json_storage() {
    let (service, _config, _base) = setup_test_env();
    let plan = service.create_plan("Photographer", 500.0, 2).unwrap();
    let id = plan.id();

    service.apply(id, PlanAction::AddInstallment).unwrap();
    service.apply(id, PlanAction::AddInstallment).unwrap();
    let stored = service.load(id).unwrap();
    let amounts: Vec<f64> = stored.installments.iter().map(|i| i.amount).collect();
    assert_eq!(amounts, vec![333.33, 333.33, 333.34]);

    service
        .record_payment(id, Some(400.0), Some(today()), None)
        .unwrap();
    service
        .record_payment(id, Some(300.0), Some(today()), None)
        .unwrap();

    let schedule = service.schedule(id).unwrap();
    assert_eq!(schedule.total_paid, 700.0);
    assert_eq!(schedule.remaining_balance, 300.0);
    assert_eq!(schedule.rows[0].status, InstallmentStatus::Paid);
    assert_eq!(schedule.rows[1].status, InstallmentStatus::Paid);
    assert_eq!(schedule.rows[2].amount_covered, 33.34);
    assert_eq!(schedule.next_suggested_payment, 300.0);
}

#[test]
fn rejected_payment_leaves_the_file_untouched() {
    let (service, _config, _base) = setup_test_env();
    let id = service.create_plan("Venue", 1000.0, 1).unwrap().id();
    let err = service
        .record_payment(id, Some(1000.01), Some(today()), None)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Plan(PlanError::Validation(ValidationError::OverpaymentExceeded { .. }))
    ));
    assert!(service.load(id).unwrap().payments.is_empty());

    service
        .record_payment(id, Some(1000.0), Some(today()), None)
        .unwrap();
    assert!(service.schedule(id).unwrap().is_settled());
}

#[test]
fn quantity_change_keeps_a_single_installment_in_sync() {
    let (service, _config, _base) = setup_test_env();
    let id = service.create_plan("Chairs", 12.5, 80).unwrap().id();
    let plan = service
        .apply(id, PlanAction::SetQuantity { quantity: 100 })
        .unwrap();
    assert_eq!(plan.installments.len(), 1);
    assert_eq!(plan.installments[0].amount, 1250.0);
    assert_eq!(service.load(id).unwrap().installments[0].amount, 1250.0);
}

#[test]
fn installment_metadata_survives_reload() {
    let (service, _config, _base) = setup_test_env();
    let id = service.create_plan("Catering", 2400.0, 1).unwrap().id();
    service.apply(id, PlanAction::AddInstallment).unwrap();
    service
        .apply(
            id,
            PlanAction::EditInstallment {
                index: 1,
                patch: InstallmentPatch::priority(Priority::High),
            },
        )
        .unwrap();
    service
        .apply(
            id,
            PlanAction::EditInstallment {
                index: 1,
                patch: InstallmentPatch::assignee(Some("Ana".into())),
            },
        )
        .unwrap();

    let stored = service.load(id).unwrap();
    let second = &stored.installments[1];
    assert_eq!(second.priority, Priority::High);
    assert_eq!(second.assignee.as_deref(), Some("Ana"));
    assert_eq!(second.display_label(), "#2 1200.00 due 2025-02-15");
}

#[test]
fn plans_are_listed_and_found_by_name() {
    let (service, _config, _base) = setup_test_env();
    service.create_plan("Venue", 1000.0, 1).unwrap();
    service.create_plan("Attire", 300.0, 2).unwrap();
    let names: Vec<String> = service
        .list()
        .unwrap()
        .into_iter()
        .map(|summary| summary.name)
        .collect();
    assert_eq!(names, vec!["Attire", "Venue"]);
    assert_eq!(service.find("attire").unwrap().total_amount(), 600.0);
}

#[test]
fn deleting_a_payment_reopens_the_balance() {
    let (service, _config, _base) = setup_test_env();
    let id = service.create_plan("Band", 800.0, 1).unwrap().id();
    let payment = service
        .record_payment(id, Some(800.0), Some(today()), Some("full".into()))
        .unwrap();
    assert!(service.schedule(id).unwrap().is_settled());

    service.delete_payment(id, payment.id).unwrap();
    let schedule = service.schedule(id).unwrap();
    assert_eq!(schedule.remaining_balance, 800.0);
    assert_eq!(schedule.next_suggested_payment, 800.0);
}
