use super::MissionLogRepository;
use crate::domain::mission_log::{MissionLogPatch, NewMissionLog};
use crate::domain::types::MoverState;
use crate::repository::contracts::MissionLogStore;
use crate::repository::error::RepositoryError;
use crate::repository::query::ListOptions;
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = MissionLogRepository::new(setup_test_db());

    let entry = repo
        .create(&NewMissionLog::new("mover-1", MoverState::Loading))
        .unwrap();

    let found = repo.find_by_id(&entry.id).unwrap().unwrap();
    assert_eq!(found.mover_id, "mover-1");
    assert_eq!(found.activity, MoverState::Loading);
    assert_eq!(found.timestamp, entry.timestamp);
}

#[test]
fn test_find_by_id_not_found() {
    let repo = MissionLogRepository::new(setup_test_db());
    assert!(repo.find_by_id("nope").unwrap().is_none());
}

#[test]
fn test_filter_by_mover_and_activity() {
    let repo = MissionLogRepository::new(setup_test_db());

    repo.create(&NewMissionLog::new("m1", MoverState::Loading)).unwrap();
    repo.create(&NewMissionLog::new("m1", MoverState::OnMission)).unwrap();
    repo.create(&NewMissionLog::new("m2", MoverState::Loading)).unwrap();
    repo.create(&NewMissionLog::new("m1", MoverState::Resting)).unwrap();

    let filter = json!({"moverId": "m1"}).as_object().cloned().unwrap();
    let page = repo.find_many(&filter, &ListOptions::default()).unwrap();
    let activities: Vec<_> = page.results.iter().map(|e| e.activity).collect();
    assert_eq!(page.total, 3);
    assert_eq!(
        activities,
        vec![MoverState::Loading, MoverState::OnMission, MoverState::Resting]
    );

    let filter = json!({"activity": "loading"}).as_object().cloned().unwrap();
    let page = repo.find_many(&filter, &ListOptions::default()).unwrap();
    assert_eq!(page.total, 2);

    // moverId 为精确匹配
    let filter = json!({"moverId": "m"}).as_object().cloned().unwrap();
    let page = repo.find_many(&filter, &ListOptions::default()).unwrap();
    assert_eq!(page.total, 0);
}

#[test]
fn test_timestamp_prefix_filter() {
    let repo = MissionLogRepository::new(setup_test_db());
    let entry = repo
        .create(&NewMissionLog::new("m1", MoverState::Loading))
        .unwrap();

    let day = entry.timestamp.format("%Y-%m-%d").to_string();
    let filter = json!({"timestamp": day}).as_object().cloned().unwrap();
    let page = repo.find_many(&filter, &ListOptions::default()).unwrap();
    assert_eq!(page.total, 1);

    let filter = json!({"timestamp": 20260101}).as_object().cloned().unwrap();
    assert!(matches!(
        repo.find_many(&filter, &ListOptions::default()),
        Err(RepositoryError::InvalidQuery(_))
    ));
}

#[test]
fn test_correct_keeps_timestamp() {
    let repo = MissionLogRepository::new(setup_test_db());
    let entry = repo
        .create(&NewMissionLog::new("m1", MoverState::Loading))
        .unwrap();

    let patch = MissionLogPatch {
        mover_id: None,
        activity: Some(MoverState::OnMission),
    };
    let corrected = repo.update_by_id(&entry.id, &patch).unwrap().unwrap();

    assert_eq!(corrected.activity, MoverState::OnMission);
    assert_eq!(corrected.mover_id, "m1");
    assert_eq!(corrected.timestamp, entry.timestamp);

    assert!(repo.update_by_id("nope", &patch).unwrap().is_none());
}

#[test]
fn test_delete() {
    let repo = MissionLogRepository::new(setup_test_db());
    let entry = repo
        .create(&NewMissionLog::new("m1", MoverState::Resting))
        .unwrap();

    assert_eq!(repo.delete_by_id(&entry.id).unwrap(), Some(entry.clone()));
    assert!(repo.delete_by_id(&entry.id).unwrap().is_none());
}
