use approx::assert_relative_eq;
use image::{Rgba, RgbaImage};
use roi_select::replay::StepOutcome;
use roi_select::{replay, ReplayConfig, ReplayError, Roi};
use std::path::Path;

const RED: Rgba<u8> = Rgba([220, 30, 30, 255]);
const BLUE: Rgba<u8> = Rgba([30, 30, 220, 255]);

fn write_split_png(path: &Path) {
    let img = RgbaImage::from_fn(1000, 1000, |x, _| if x < 500 { RED } else { BLUE });
    img.save(path).expect("write png");
}

fn assert_close(actual: &Rgba<u8>, expected: Rgba<u8>) {
    for (a, e) in actual.0.iter().zip(expected.0.iter()) {
        assert!(a.abs_diff(*e) <= 3, "{actual:?} != {expected:?}");
    }
}

fn probeta_config(image: &Path, events: &str) -> ReplayConfig {
    // 580x800 screen minus the sample modal chrome leaves a 500x500 canvas.
    let json = format!(
        r#"{{"image_path": {path:?}, "screen": [580, 800], "flow": "probeta", "events": {events}}}"#,
        path = image.to_string_lossy()
    );
    serde_json::from_str(&json).expect("config")
}

#[test]
fn zoomed_selection_maps_to_source_and_renders() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("sample.png");
    write_split_png(&png);

    let cfg = probeta_config(
        &png,
        r#"["toggle_zoom",
            {"down": [100, 100]}, {"move": [300, 300]}, {"up": [300, 300]},
            {"down": [0, 0]}, {"move": [200, 200]}, {"up": [200, 200]},
            "confirm"]"#,
    );
    let outcome = replay(&cfg).unwrap();
    let report = &outcome.report;

    assert_relative_eq!(report.viewport.scale, 0.5, epsilon = 1e-12);
    assert_relative_eq!(report.viewport.canvas_w, 500.0, epsilon = 1e-9);
    assert_eq!(report.source_size, [1000, 1000]);
    match &report.steps[3].outcome {
        StepOutcome::Zoomed { source, .. } => assert_eq!(*source, Roi::new(200, 200, 400, 400)),
        other => panic!("expected zoom, got {other:?}"),
    }
    assert_eq!(report.confirmed, Some(Roi::new(200, 200, 160, 160)));
    assert!(report.notices.is_empty());
    assert!(report.redraws > 0);

    let canvas = outcome.canvas.expect("rendered canvas");
    assert_eq!(canvas.dimensions(), (500, 500));
    // Zoomed onto source x 200..600: the colour boundary sits at canvas x 375.
    assert_close(canvas.get_pixel(100, 400), RED);
    assert_close(canvas.get_pixel(450, 400), BLUE);
}

#[test]
fn reset_zoom_returns_to_direct_selection() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("sample.png");
    write_split_png(&png);

    let cfg = probeta_config(
        &png,
        r#"["toggle_zoom",
            {"down": [100, 100]}, {"up": [300, 300]},
            "toggle_zoom",
            {"down": [100, 100]}, {"up": [300, 300]},
            "confirm"]"#,
    );
    let report = replay(&cfg).unwrap().report;
    assert!(report.zoom.is_none());
    assert_eq!(report.confirmed, Some(Roi::new(200, 200, 400, 400)));
}

#[test]
fn touch_drag_commits_with_last_touch_position() {
    let cfg: ReplayConfig = serde_json::from_str(
        r#"{"image_size": [4000, 3000], "screen": [880, 800],
            "events": [{"touch_start": [[100, 100], [700, 700]]},
                       {"touch_move": [[300, 250]]},
                       "touch_end", "confirm"]}"#,
    )
    .unwrap();
    let report = replay(&cfg).unwrap().report;
    assert_eq!(report.confirmed, Some(Roi::new(500, 500, 1000, 750)));
}

#[test]
fn unreadable_image_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = probeta_config(&dir.path().join("missing.png"), "[]");
    assert!(matches!(replay(&cfg), Err(ReplayError::Image(_))));
}

#[test]
fn config_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    let cfg: ReplayConfig =
        serde_json::from_str(r#"{"image_size": [10, 10], "events": ["cancel"]}"#).unwrap();
    cfg.write_json(&path).unwrap();
    let back = ReplayConfig::load_json(&path).unwrap();
    assert_eq!(back.events, cfg.events);
    assert_eq!(back.output_path(), Path::new("roi_replay_report.json"));
}
