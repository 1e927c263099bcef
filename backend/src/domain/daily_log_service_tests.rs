//! Tests for the daily log service.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::*;
use crate::domain::ports::MockDailyLogRepository;
use crate::domain::{DailyLogDraft, DailyLogUpdate, ErrorCode, SalesFigures, Username};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, day).expect("valid date")
}

fn factory(raw: &str) -> FactoryId {
    FactoryId::new(raw).expect("valid factory")
}

fn employee(name: &str, factory_id: &str) -> Principal {
    Principal::try_new(
        Username::new(name).expect("valid username"),
        Role::FactoryEmployee,
        Some(factory(factory_id)),
    )
    .expect("valid principal")
}

fn headquarters(name: &str) -> Principal {
    Principal::try_new(
        Username::new(name).expect("valid username"),
        Role::Headquarters,
        None,
    )
    .expect("valid principal")
}

fn draft(factory_id: &str, day: u32) -> DailyLogDraft {
    DailyLogDraft {
        factory_id: factory(factory_id),
        date: date(day),
        production: BTreeMap::from([("Flour".into(), 120.0)]),
        sales: BTreeMap::from([(
            "Flour".into(),
            SalesFigures {
                amount: 100.0,
                unit_price: 2.5,
            },
        )]),
        downtime_hours: 0.5,
        downtime_reason: "shift change".into(),
        stock: BTreeMap::from([("Flour".into(), 60.0)]),
    }
}

fn stored_log(factory_id: &str, day: u32, creator: &str, report_id: Option<&str>) -> DailyLog {
    DailyLog {
        id: Uuid::new_v4(),
        report_id: report_id.map(Into::into),
        factory_id: factory(factory_id),
        date: date(day),
        production: BTreeMap::new(),
        sales: BTreeMap::new(),
        downtime_hours: 0.0,
        downtime_reason: String::new(),
        stock: BTreeMap::new(),
        created_by: Username::new(creator).expect("valid username"),
        created_at: Utc::now(),
    }
}

fn make_service(repo: MockDailyLogRepository) -> DailyLogService {
    DailyLogService::new(Arc::new(repo), FactoryCatalog::builtin())
}

#[tokio::test]
async fn create_on_empty_collection_allocates_the_floor() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_find_by_factory_and_date()
        .times(1)
        .returning(|_, _| Ok(None));
    repo.expect_max_conforming_report_number()
        .times(1)
        .returning(|| Ok(None));
    repo.expect_insert()
        .times(1)
        .withf(|log| log.report_id.as_deref() == Some("RPT-10000"))
        .returning(|_| Ok(()));

    let service = make_service(repo);
    let principal = employee("alice", "wakene_food");
    let created = service
        .create(&principal, draft("wakene_food", 1))
        .await
        .expect("create succeeds");

    assert_eq!(created.report_id.as_deref(), Some("RPT-10000"));
    assert_eq!(created.created_by.as_str(), "alice");
    assert_eq!(created.factory_id.as_str(), "wakene_food");
}

#[tokio::test]
async fn create_continues_from_the_stored_max() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_find_by_factory_and_date()
        .returning(|_, _| Ok(None));
    repo.expect_max_conforming_report_number()
        .returning(|| Ok(Some(10_041)));
    repo.expect_insert()
        .withf(|log| log.report_id.as_deref() == Some("RPT-10042"))
        .returning(|_| Ok(()));

    let service = make_service(repo);
    let created = service
        .create(&headquarters("hq"), draft("amen_water", 2))
        .await
        .expect("create succeeds");
    assert_eq!(created.report_id.as_deref(), Some("RPT-10042"));
}

#[tokio::test]
async fn create_rejects_duplicate_factory_date() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_find_by_factory_and_date()
        .returning(|_, _| Ok(Some(stored_log("wakene_food", 1, "bob", Some("RPT-10000")))));
    repo.expect_insert().times(0);

    let service = make_service(repo);
    let error = service
        .create(&employee("alice", "wakene_food"), draft("wakene_food", 1))
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn employee_cannot_create_for_another_factory() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_find_by_factory_and_date().times(0);
    repo.expect_insert().times(0);

    let service = make_service(repo);
    let error = service
        .create(&employee("alice", "wakene_food"), draft("amen_water", 1))
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn create_rejects_unknown_factories() {
    let repo = MockDailyLogRepository::new();
    let service = make_service(repo);
    let error = service
        .create(&headquarters("hq"), draft("ghost_plant", 1))
        .await
        .expect_err("invalid");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn create_retries_when_the_report_number_is_contended() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_find_by_factory_and_date()
        .returning(|_, _| Ok(None));
    let observed_max = AtomicU32::new(10_000);
    repo.expect_max_conforming_report_number()
        .times(2)
        .returning(move || Ok(Some(observed_max.fetch_add(1, Ordering::SeqCst))));
    let attempts = AtomicU32::new(0);
    repo.expect_insert().times(2).returning(move |log| {
        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(DailyLogRepositoryError::duplicate_report_id(
                log.report_id.clone().unwrap_or_default(),
            ))
        } else {
            Ok(())
        }
    });

    let service = make_service(repo);
    let created = service
        .create(&headquarters("hq"), draft("mintu_plast", 3))
        .await
        .expect("second attempt succeeds");
    assert_eq!(created.report_id.as_deref(), Some("RPT-10002"));
}

#[tokio::test]
async fn list_pins_an_employee_to_their_own_factory() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_query()
        .times(1)
        .withf(|scope| {
            scope.factory_id.as_ref().map(FactoryId::as_str) == Some("wakene_food")
        })
        .returning(|_| Ok(vec![stored_log("wakene_food", 1, "alice", Some("RPT-10000"))]));

    let service = make_service(repo);
    // The employee asks for another factory; the scope rule overrides it.
    let request = ScopeRequest {
        factory_id: Some(factory("amen_water")),
        ..ScopeRequest::default()
    };
    let logs = service
        .list(&employee("alice", "wakene_food"), request)
        .await
        .expect("list succeeds");
    assert!(logs.iter().all(|log| log.factory_id.as_str() == "wakene_food"));
}

#[tokio::test]
async fn get_refuses_records_outside_an_employees_factory() {
    let mut repo = MockDailyLogRepository::new();
    let foreign = stored_log("amen_water", 1, "bob", Some("RPT-10000"));
    let id = foreign.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(foreign.clone())));

    let service = make_service(repo);
    let error = service
        .get(&employee("alice", "wakene_food"), id)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn headquarters_cannot_update_someone_elses_record() {
    let mut repo = MockDailyLogRepository::new();
    let record = stored_log("wakene_food", 1, "alice", Some("RPT-10000"));
    let id = record.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    repo.expect_update().times(0);

    let service = make_service(repo);
    let error = service
        .update(&headquarters("hq"), id, DailyLogUpdate::default())
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_rejects_a_colliding_date_change() {
    let mut repo = MockDailyLogRepository::new();
    let record = stored_log("wakene_food", 1, "alice", Some("RPT-10000"));
    let id = record.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    repo.expect_find_by_factory_and_date()
        .withf(|_, target| *target == date(2))
        .returning(|_, _| Ok(Some(stored_log("wakene_food", 2, "bob", Some("RPT-10001")))));
    repo.expect_update().times(0);

    let service = make_service(repo);
    let patch = DailyLogUpdate {
        date: Some(date(2)),
        ..DailyLogUpdate::default()
    };
    let error = service
        .update(&employee("alice", "wakene_food"), id, patch)
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn update_preserves_the_report_identifier() {
    let mut repo = MockDailyLogRepository::new();
    let record = stored_log("wakene_food", 1, "alice", Some("RPT-10007"));
    let id = record.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    repo.expect_update()
        .times(1)
        .withf(|log| log.report_id.as_deref() == Some("RPT-10007"))
        .returning(|_| Ok(true));

    let service = make_service(repo);
    let patch = DailyLogUpdate {
        downtime_hours: Some(3.0),
        ..DailyLogUpdate::default()
    };
    let updated = service
        .update(&employee("alice", "wakene_food"), id, patch)
        .await
        .expect("update succeeds");
    assert_eq!(updated.downtime_hours, 3.0);
    assert_eq!(updated.report_id.as_deref(), Some("RPT-10007"));
}

#[tokio::test]
async fn employee_cannot_move_a_record_to_another_factory() {
    let mut repo = MockDailyLogRepository::new();
    let record = stored_log("wakene_food", 1, "alice", Some("RPT-10000"));
    let id = record.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    repo.expect_find_by_factory_and_date().times(0);
    repo.expect_update().times(0);

    let service = make_service(repo);
    let patch = DailyLogUpdate {
        factory_id: Some(factory("amen_water")),
        ..DailyLogUpdate::default()
    };
    let error = service
        .update(&employee("alice", "wakene_food"), id, patch)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_rejects_an_unknown_target_factory() {
    let mut repo = MockDailyLogRepository::new();
    let record = stored_log("wakene_food", 1, "hq", Some("RPT-10000"));
    let id = record.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    repo.expect_update().times(0);

    let service = make_service(repo);
    let patch = DailyLogUpdate {
        factory_id: Some(factory("ghost_plant")),
        ..DailyLogUpdate::default()
    };
    let error = service
        .update(&headquarters("hq"), id, patch)
        .await
        .expect_err("invalid");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn update_moving_the_factory_rechecks_date_uniqueness() {
    let mut repo = MockDailyLogRepository::new();
    let record = stored_log("wakene_food", 1, "hq", Some("RPT-10000"));
    let id = record.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    repo.expect_find_by_factory_and_date()
        .withf(|target, day| target.as_str() == "amen_water" && *day == date(1))
        .returning(|_, _| Ok(Some(stored_log("amen_water", 1, "bob", Some("RPT-10001")))));
    repo.expect_update().times(0);

    let service = make_service(repo);
    let patch = DailyLogUpdate {
        factory_id: Some(factory("amen_water")),
        ..DailyLogUpdate::default()
    };
    let error = service
        .update(&headquarters("hq"), id, patch)
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn delete_requires_the_record_to_exist() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = make_service(repo);
    let error = service
        .delete(&headquarters("hq"), Uuid::new_v4())
        .await
        .expect_err("not found");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn delete_is_creator_only() {
    let mut repo = MockDailyLogRepository::new();
    let record = stored_log("wakene_food", 1, "alice", Some("RPT-10000"));
    let id = record.id;
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(record.clone())));
    repo.expect_delete().times(0);

    let service = make_service(repo);
    let error = service
        .delete(&headquarters("hq"), id)
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn renumbering_is_restricted_to_headquarters() {
    let repo = MockDailyLogRepository::new();
    let service = make_service(repo);
    let error = service
        .renumber_unconforming(&employee("alice", "wakene_food"))
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn renumbering_assigns_sequential_numbers_in_creation_order() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_max_conforming_report_number()
        .returning(|| Ok(Some(10_004)));
    let legacy_uuid = stored_log(
        "wakene_food",
        1,
        "alice",
        Some("b2c3d4e5-f6a7-8901-bcde-f23456789012"),
    );
    let legacy_missing = stored_log("amen_water", 2, "bob", None);
    repo.expect_unconforming_in_creation_order()
        .returning(move || Ok(vec![legacy_uuid.clone(), legacy_missing.clone()]));
    let assigned = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&assigned);
    repo.expect_update().times(2).returning(move |log| {
        sink.lock()
            .expect("sink lock")
            .push(log.report_id.clone().unwrap_or_default());
        Ok(true)
    });

    let service = make_service(repo);
    let updated = service
        .renumber_unconforming(&headquarters("hq"))
        .await
        .expect("renumber succeeds");

    assert_eq!(updated, 2);
    assert_eq!(
        *assigned.lock().expect("sink lock"),
        vec!["RPT-10005".to_owned(), "RPT-10006".to_owned()]
    );
}

#[tokio::test]
async fn renumbering_skips_failures_without_aborting() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_max_conforming_report_number()
        .returning(|| Ok(None));
    let first = stored_log("wakene_food", 1, "alice", None);
    let second = stored_log("amen_water", 2, "bob", None);
    repo.expect_unconforming_in_creation_order()
        .returning(move || Ok(vec![first.clone(), second.clone()]));
    let attempts = AtomicU32::new(0);
    let assigned = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&assigned);
    repo.expect_update().times(2).returning(move |log| {
        if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(DailyLogRepositoryError::query("transient write failure"))
        } else {
            sink.lock()
                .expect("sink lock")
                .push(log.report_id.clone().unwrap_or_default());
            Ok(true)
        }
    });

    let service = make_service(repo);
    let updated = service
        .renumber_unconforming(&headquarters("hq"))
        .await
        .expect("run continues");

    // The failed record's number was never spent: the survivor gets it.
    assert_eq!(updated, 1);
    assert_eq!(
        *assigned.lock().expect("sink lock"),
        vec!["RPT-10000".to_owned()]
    );
}

#[tokio::test]
async fn renumbering_twice_with_nothing_pending_updates_zero() {
    let mut repo = MockDailyLogRepository::new();
    repo.expect_max_conforming_report_number()
        .returning(|| Ok(Some(10_006)));
    repo.expect_unconforming_in_creation_order()
        .returning(|| Ok(Vec::new()));
    repo.expect_update().times(0);

    let service = make_service(repo);
    let updated = service
        .renumber_unconforming(&headquarters("hq"))
        .await
        .expect("renumber succeeds");
    assert_eq!(updated, 0);
}
