use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn bin() -> Command {
    Command::cargo_bin("roi-select").expect("binary")
}

#[test]
fn fit_prints_viewport() {
    bin()
        .args([
            "fit",
            "--width",
            "4000",
            "--height",
            "3000",
            "--screen-width",
            "880",
            "--screen-height",
            "800",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"scale\": 0.2"))
        .stdout(predicate::str::contains("\"surface\""));
}

#[test]
fn fit_rejects_empty_image() {
    bin()
        .args(["fit", "--width", "0", "--height", "3000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidDimensions"));
}

#[test]
fn replay_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("replay.json");
    let out = dir.path().join("report.json");
    fs::write(
        &cfg,
        r#"{"image_size": [4000, 3000], "screen": [880, 800], "flow": "table",
            "events": [{"down": [100, 100]}, {"move": [300, 250]}, {"up": [300, 250]}, "confirm"]}"#,
    )
    .unwrap();

    bin()
        .arg("replay")
        .arg(&cfg)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("confirmed roi [500, 500, 1000, 750]"));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["confirmed"]["w"], 1000);
    assert_eq!(report["backend_roi"], serde_json::json!([500, 500, 1000, 750]));
}

#[test]
fn replay_renders_canvas_png() {
    let dir = tempfile::tempdir().unwrap();
    let png = dir.path().join("photo.png");
    image::RgbaImage::from_pixel(400, 300, image::Rgba([90, 160, 40, 255]))
        .save(&png)
        .unwrap();
    let cfg = dir.path().join("replay.json");
    let config = serde_json::json!({
        "image_path": png,
        "screen": [480, 500],
        "events": [{"down": [10, 10]}, {"up": [60, 50]}],
        "output_path": dir.path().join("report.json"),
        "overlay_path": dir.path().join("out/canvas.png"),
    });
    fs::write(&cfg, config.to_string()).unwrap();

    bin()
        .arg("replay")
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains("no roi confirmed"));

    let canvas = image::open(dir.path().join("out/canvas.png")).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (400, 300));
}

#[test]
fn replay_missing_config_fails() {
    bin()
        .args(["replay", "does-not-exist.json"])
        .assert()
        .failure();
}

#[test]
fn bundled_zoom_replay_confirms_composed_roi() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/probeta_zoom_replay.json");
    bin()
        .arg("replay")
        .arg(cfg)
        .arg("--out")
        .arg(dir.path().join("report.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("confirmed roi [200, 200, 160, 160]"));
}

#[test]
fn bundled_table_replay_logs_at_requested_level() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/table_replay.json");
    bin()
        .args(["--log-level", "info", "replay"])
        .arg(cfg)
        .arg("--out")
        .arg(dir.path().join("report.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("confirmed roi [500, 500, 1000, 750]"))
        .stderr(predicate::str::contains("INFO roi_select_core] session"));
}
