use playtally_core::{HarvestState, Histogram};
use playtally_engine::{build_report, write_report};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn finished_state() -> HarvestState {
    HarvestState {
        item_id: 13,
        display_name: "Catan".to_string(),
        current_page: 3,
        histogram: Histogram::from_dense(vec![1, 0, 2, 1]),
        started_at: "2024-01-01T00:00:00+00:00".to_string(),
        finished_at: Some("2024-01-01T00:05:00+00:00".to_string()),
    }
}

#[test]
fn report_lists_every_player_count_with_share() {
    let report = build_report(&finished_state().view());

    assert_eq!(report["item_id"], json!(13));
    assert_eq!(report["finished"], json!(true));
    assert_eq!(report["total_plays"], json!(4));
    assert_eq!(
        report["player_counts"],
        json!([
            {"players": 0, "plays": 1, "share_percent": 25.0},
            {"players": 1, "plays": 0, "share_percent": 0.0},
            {"players": 2, "plays": 2, "share_percent": 50.0},
            {"players": 3, "plays": 1, "share_percent": 25.0},
        ])
    );
}

#[test]
fn unfinished_report_has_null_finish_time() {
    let mut state = finished_state();
    state.finished_at = None;
    let report = build_report(&state.view());
    assert_eq!(report["finished"], json!(false));
    assert!(report["finished_at"].is_null());
}

#[test]
fn report_file_is_written_with_missing_parent() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("reports").join("13.json");

    let written = write_report(&finished_state().view(), &target).unwrap();

    assert_eq!(written, target);
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(parsed["name"], json!("Catan"));
}
