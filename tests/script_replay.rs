use tilekit::{Config, Script, ScriptRunner};

fn replay(json: &str) -> tilekit::ScriptReport {
    let script: Script = serde_json::from_str(json).unwrap();
    ScriptRunner::new(&Config::default()).run(&script)
}

#[test]
fn test_drops_snap_to_targets_and_complete() {
    let report = replay(
        r#"{
            "crop": { "x": 0, "y": 0, "width": 200, "height": 200 },
            "actions": [
                { "action": "initialize" },
                { "action": "drop", "tile": "tile-0", "x": 4, "y": -3 },
                { "action": "drop", "tile": "tile-1", "x": 108, "y": 12 },
                { "action": "drop", "tile": "tile-2", "x": -6, "y": 111 },
                { "action": "drop", "tile": "tile-3", "x": 93, "y": 94 }
            ]
        }"#,
    );

    assert!(report.rejected.is_empty());
    let positions: Vec<(&str, f64, f64)> = report
        .placements
        .iter()
        .map(|p| (p.id.as_str(), p.x, p.y))
        .collect();
    assert_eq!(
        positions,
        vec![
            ("tile-0", 0.0, 0.0),
            ("tile-1", 100.0, 0.0),
            ("tile-2", 0.0, 100.0),
            ("tile-3", 100.0, 100.0),
        ]
    );
    assert!(report.statistics.is_complete);
    assert!(report.validation.is_valid());
}

#[test]
fn test_screen_drops_follow_the_viewport() {
    // Zoomed 2x about the top-left corner: screen (210, 190) is canvas (105, 95).
    let report = replay(
        r#"{
            "crop": { "x": 0, "y": 0, "width": 300, "height": 300 },
            "actions": [
                { "action": "initialize" },
                { "action": "set_scale", "scale": 2, "anchor": { "x": 0, "y": 0 } },
                { "action": "drop_at_screen", "tile": "tile-4", "x": 210, "y": 190 }
            ]
        }"#,
    );

    assert_eq!(report.transform.scale, 2.0);
    assert_eq!(report.transform.translate_x, 0.0);
    assert_eq!(report.placements.len(), 1);
    assert_eq!(report.placements[0].x, 100.0);
    assert_eq!(report.placements[0].y, 100.0);
}

#[test]
fn test_rejected_actions_are_reported() {
    let report = replay(
        r#"{
            "actions": [
                { "action": "drop", "tile": "tile-0", "x": 0, "y": 0 },
                { "action": "undo" },
                { "action": "initialize" },
                { "action": "remove", "tile": "tile-0" },
                { "action": "place_next", "tile": "tile-0" },
                { "action": "place_next", "tile": "nope" }
            ]
        }"#,
    );

    assert_eq!(report.rejected, vec![0, 1, 3, 5]);
    assert_eq!(report.placements.len(), 1);
}

#[test]
fn test_undo_redo_and_reset_through_script() {
    let report = replay(
        r#"{
            "crop": { "x": 0, "y": 0, "width": 300, "height": 100 },
            "actions": [
                { "action": "initialize" },
                { "action": "place_next", "tile": "tile-0" },
                { "action": "place_next", "tile": "tile-1" },
                { "action": "undo" },
                { "action": "redo" },
                { "action": "reset" },
                { "action": "undo" }
            ]
        }"#,
    );

    assert!(report.rejected.is_empty());
    let ids: Vec<&str> = report.placements.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["tile-0", "tile-1"]);
    assert!(report.events.iter().any(|e| e.contains("tile-1")));
}

#[test]
fn test_crop_edit_resizes_in_canvas_units() {
    // At 2x, a 100 px screen drag of the east handle widens the crop by 50.
    let report = replay(
        r#"{
            "image": { "width": 1000, "height": 1000 },
            "crop": { "x": 0, "y": 0, "width": 200, "height": 200 },
            "actions": [
                { "action": "set_scale", "scale": 2, "anchor": { "x": 0, "y": 0 } },
                { "action": "edit_crop", "handle": "e", "from": { "x": 400, "y": 200 }, "to": { "x": 500, "y": 200 } }
            ]
        }"#,
    );

    assert!(report.rejected.is_empty());
    assert_eq!(report.crop.width, 250.0);
    assert_eq!(report.crop.height, 200.0);
}

#[test]
fn test_invalid_script_settings_are_reported() {
    let report = replay(
        r#"{
            "crop": { "x": 0, "y": 0, "width": -10, "height": 200 },
            "tiles": { "width": 50, "height": 50 },
            "snap": { "enable_snapping": true, "grid_size": 0, "snap_threshold": 20 },
            "actions": [ { "action": "initialize" } ]
        }"#,
    );

    assert_eq!(report.rejected_settings, vec!["snap", "crop"]);
    assert_eq!(report.crop, Config::default().crop);
    assert_eq!(report.tile_settings.width, 50.0);
    assert!(report.rejected.is_empty());
}

#[test]
fn test_oversized_initialize_is_rejected() {
    let report = replay(
        r#"{
            "crop": { "x": 0, "y": 0, "width": 100000, "height": 100000 },
            "tiles": { "width": 1, "height": 1 },
            "actions": [ { "action": "initialize" } ]
        }"#,
    );

    assert!(report.rejected_settings.is_empty());
    assert_eq!(report.rejected, vec![0]);
    assert_eq!(report.statistics.placement.total_tiles, 0);
}
