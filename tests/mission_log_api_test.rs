// ==========================================
// MissionLogApi 集成测试
// ==========================================
// 覆盖: 引擎自动写入、手工写入/纠错、过滤
// ==========================================

mod helpers;

use helpers::api_test_helper::*;
use magic_mover::api::ListRequest;
use magic_mover::domain::MoverState;
use serde_json::json;

#[test]
fn test_lifecycle_writes_one_log_per_transition() {
    let env = ApiTestEnv::new().unwrap();
    let mover = env.create_mover("Atlas", 100.0);
    let item = env.create_item("Brick", 10.0);

    env.run_missions(&mover.id, &item.id, 2);
    // 每次装载都记录一条 loading 日志（包括已处于 loading 时）
    env.mover_api.load_cargo(&mover.id, &item.id).unwrap();
    env.mover_api.load_cargo(&mover.id, &item.id).unwrap();

    let logs = env
        .mission_log_api
        .list_mission_logs(
            &json!({ "moverId": mover.id }),
            &ListRequest::page(1, 50).with_sort("timestamp"),
        )
        .unwrap();
    assert_eq!(logs.total, 8);

    let by_activity = |activity: MoverState| {
        env.mission_log_api
            .list_mission_logs(
                &json!({ "moverId": mover.id, "activity": activity.as_str() }),
                &ListRequest::default(),
            )
            .unwrap()
            .total
    };
    assert_eq!(by_activity(MoverState::Loading), 4);
    assert_eq!(by_activity(MoverState::OnMission), 2);
    assert_eq!(by_activity(MoverState::Resting), 2);

    let mover = env.mover_api.get_mover(&mover.id).unwrap();
    assert_eq!(mover.mission_count, by_activity(MoverState::OnMission));
}

#[test]
fn test_failed_operations_write_no_logs() {
    let env = ApiTestEnv::new().unwrap();
    let mover = env.create_mover("Atlas", 5.0);
    let heavy = env.create_item("Boulder", 50.0);

    let _ = env.mover_api.start_mission(&mover.id);
    let _ = env.mover_api.end_mission(&mover.id);
    let _ = env.mover_api.load_cargo(&mover.id, &heavy.id);
    let _ = env.mover_api.load_cargo(&mover.id, "missing");

    let logs = env
        .mission_log_api
        .list_mission_logs(&json!({ "moverId": mover.id }), &ListRequest::default())
        .unwrap();
    assert_eq!(logs.total, 0);
}

#[test]
fn test_manual_log_create_correct_delete() {
    let env = ApiTestEnv::new().unwrap();

    let entry = env
        .mission_log_api
        .create_mission_log(&json!({ "moverId": "m-1", "activity": "loading" }))
        .unwrap();
    assert_eq!(entry.mover_id, "m-1");
    assert_eq!(entry.activity, MoverState::Loading);
    assert_eq!(env.mission_log_api.get_mission_log(&entry.id).unwrap(), entry);

    let corrected = env
        .mission_log_api
        .update_mission_log(&entry.id, &json!({ "activity": "on-mission" }))
        .unwrap();
    assert_eq!(corrected.activity, MoverState::OnMission);
    assert_eq!(corrected.mover_id, "m-1");
    assert_eq!(corrected.timestamp, entry.timestamp);

    let deleted = env.mission_log_api.delete_mission_log(&entry.id).unwrap();
    assert_eq!(deleted, corrected);
    assert_not_found_error(env.mission_log_api.get_mission_log(&entry.id));
}

#[test]
fn test_mission_log_validation_messages() {
    let env = ApiTestEnv::new().unwrap();

    let cases = vec![
        (json!({ "activity": "loading" }), "\"moverId\" is required"),
        (json!({ "moverId": "m-1" }), "\"activity\" is required"),
        (
            json!({ "moverId": "m-1", "activity": "flying" }),
            "\"activity\" must be one of [resting, loading, on-mission]",
        ),
        (
            json!({ "moverId": 7, "activity": "loading" }),
            "\"moverId\" must be a string",
        ),
    ];

    for (payload, expected) in cases {
        let message = assert_validation_error(env.mission_log_api.create_mission_log(&payload));
        assert_eq!(message, expected, "payload: {}", payload);
    }
}

#[test]
fn test_filter_by_timestamp_prefix() {
    let env = ApiTestEnv::new().unwrap();
    let entry = env
        .mission_log_api
        .create_mission_log(&json!({ "moverId": "m-1", "activity": "resting" }))
        .unwrap();

    let day = entry.timestamp.format("%Y-%m-%d").to_string();
    let hits = env
        .mission_log_api
        .list_mission_logs(&json!({ "timestamp": day }), &ListRequest::default())
        .unwrap();
    assert_eq!(hits.total, 1);

    let misses = env
        .mission_log_api
        .list_mission_logs(&json!({ "timestamp": "1999-01-01" }), &ListRequest::default())
        .unwrap();
    assert_eq!(misses.total, 0);

    assert_invalid_query(
        env.mission_log_api
            .list_mission_logs(&json!({ "activity": "dancing" }), &ListRequest::default()),
    );
}
