mod common;

use common::{
    insert_charge, insert_unit, insert_vehicle, seed_reference_data, OTHER_OWNER_ID, OWNER_ID,
};
use tollway_core::db::open_db_in_memory;
use tollway_core::{RepoError, SqliteTollRepository, TollRepository, TollService, UnitStatus};

#[test]
fn unit_status_reads_persisted_status() {
    let conn = open_db_in_memory().unwrap();
    seed_reference_data(&conn);
    insert_vehicle(&conn, 100, OWNER_ID, "WDB9634031L123456");
    insert_unit(&conn, 1, 100, "active");
    insert_unit(&conn, 2, 100, "inactive");
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    assert_eq!(repo.unit_status(1).unwrap(), Some(UnitStatus::Active));
    assert_eq!(repo.unit_status(2).unwrap(), Some(UnitStatus::Inactive));
}

#[test]
fn unit_status_of_unknown_unit_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    assert_eq!(repo.unit_status(12345).unwrap(), None);
}

#[test]
fn update_unit_status_changes_only_target_unit() {
    let conn = open_db_in_memory().unwrap();
    seed_reference_data(&conn);
    insert_vehicle(&conn, 100, OWNER_ID, "WDB9634031L123456");
    insert_unit(&conn, 1, 100, "active");
    insert_unit(&conn, 2, 100, "active");
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    repo.update_unit_status(1, UnitStatus::Inactive).unwrap();

    assert_eq!(repo.unit_status(1).unwrap(), Some(UnitStatus::Inactive));
    assert_eq!(repo.unit_status(2).unwrap(), Some(UnitStatus::Active));
}

#[test]
fn update_unit_status_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    seed_reference_data(&conn);
    insert_vehicle(&conn, 100, OWNER_ID, "WDB9634031L123456");
    insert_unit(&conn, 1, 100, "inactive");
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    repo.update_unit_status(1, UnitStatus::Inactive).unwrap();
    repo.update_unit_status(1, UnitStatus::Inactive).unwrap();

    assert_eq!(repo.unit_status(1).unwrap(), Some(UnitStatus::Inactive));
}

#[test]
fn update_missing_unit_returns_unit_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = TollService::new(SqliteTollRepository::try_new(&conn).unwrap());

    let err = service
        .update_unit_status(77, UnitStatus::Active)
        .unwrap_err();
    assert!(matches!(err, RepoError::UnitNotFound(77)));
}

#[test]
fn corrupted_status_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    seed_reference_data(&conn);
    insert_vehicle(&conn, 100, OWNER_ID, "WDB9634031L123456");
    insert_unit(&conn, 1, 100, "active");
    // Write a status outside the CHECK list.
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE on_board_units SET status = 'defect' WHERE unit_id = 1;
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    let err = repo.unit_status(1).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("defect")));
}

#[test]
fn user_for_charge_follows_unit_and_vehicle() {
    let conn = open_db_in_memory().unwrap();
    seed_reference_data(&conn);
    insert_vehicle(&conn, 100, OWNER_ID, "WDB9634031L123456");
    insert_vehicle(&conn, 200, OTHER_OWNER_ID, "YV2RT40A8LB654321");
    insert_unit(&conn, 1, 100, "active");
    insert_unit(&conn, 2, 200, "active");
    insert_charge(&conn, 9001, 1, 1203);
    insert_charge(&conn, 9002, 2, 1187);
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    assert_eq!(repo.user_for_charge(9001).unwrap(), Some(OWNER_ID));
    assert_eq!(repo.user_for_charge(9002).unwrap(), Some(OTHER_OWNER_ID));
}

#[test]
fn user_for_unknown_charge_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    assert_eq!(repo.user_for_charge(1).unwrap(), None);
}

#[test]
fn units_for_vehicle_are_listed_by_id() {
    let conn = open_db_in_memory().unwrap();
    seed_reference_data(&conn);
    insert_vehicle(&conn, 100, OWNER_ID, "WDB9634031L123456");
    insert_vehicle(&conn, 200, OWNER_ID, "YV2RT40A8LB654321");
    insert_unit(&conn, 30, 100, "inactive");
    insert_unit(&conn, 10, 100, "active");
    insert_unit(&conn, 20, 200, "active");
    let repo = SqliteTollRepository::try_new(&conn).unwrap();

    let units = repo.list_units_for_vehicle(100).unwrap();
    let ids: Vec<i64> = units.iter().map(|unit| unit.unit_id).collect();
    assert_eq!(ids, vec![10, 30]);
    assert_eq!(units[1].status, UnitStatus::Inactive);
    assert!(units.iter().all(|unit| unit.removed_at.is_none()));
}
