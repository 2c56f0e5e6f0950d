use assert_cmd::Command;
use predicates::prelude::*;
use sheet_count::image_io::{load_frame, save_frame};
use sheet_count::{RgbFrame, SheetCountReport};
use std::path::{Path, PathBuf};

fn write_banded(dir: &Path, name: &str, rows: &[usize]) -> PathBuf {
    let mut frame = RgbFrame::filled(600, 400, [20, 20, 20]).unwrap();
    for &y in rows {
        frame.fill_rect(50, y, 550, y + 1, [200, 200, 200]);
    }
    let path = dir.join(name);
    save_frame(&frame, &path).unwrap();
    path
}

fn sheet_count() -> Command {
    Command::cargo_bin("sheet-count").unwrap()
}

#[test]
fn image_command_prints_count_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_banded(dir.path(), "stack.png", &[100, 200, 300]);
    let annotated = dir.path().join("annotated.png");
    let report = dir.path().join("report.json");

    sheet_count()
        .arg("image")
        .arg(&input)
        .arg("--annotated")
        .arg(&annotated)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("sheets: 3"));

    let out = load_frame(&annotated).unwrap();
    assert_eq!((out.width(), out.height()), (600, 400));
    assert_eq!(out.pixel(300, 99), [0, 255, 255]);

    let report = SheetCountReport::load_json(&report).unwrap();
    assert_eq!(report.max_sheet_count, Some(3));
    assert_eq!(report.frames.len(), 1);
}

#[test]
fn frames_command_reports_maximum() {
    let dir = tempfile::tempdir().unwrap();
    let f0 = write_banded(dir.path(), "f0.png", &[80]);
    let f1 = write_banded(dir.path(), "f1.png", &[80, 180]);
    let f2 = write_banded(dir.path(), "f2.png", &[80]);
    let best = dir.path().join("best.png");
    let report = dir.path().join("report.json");

    sheet_count()
        .arg("frames")
        .args([&f0, &f1, &f2])
        .arg("--best-frame")
        .arg(&best)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("max sheets: 2"))
        .stdout(predicate::str::contains("frames: 3"));

    assert!(best.exists());
    let report = SheetCountReport::load_json(&report).unwrap();
    assert_eq!(report.best_frame_index, Some(1));
    let counts: Vec<usize> = report.frames.iter().map(|f| f.sheet_count).collect();
    assert_eq!(counts, vec![1, 2, 1]);
}

#[test]
fn frames_command_fails_when_nothing_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("broken.png");
    std::fs::write(&bogus, b"garbage").unwrap();

    sheet_count()
        .arg("frames")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no frame could be decoded"));
}

#[test]
fn missing_image_is_an_error() {
    sheet_count()
        .args(["image", "does-not-exist.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn config_overrides_params() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_banded(dir.path(), "stack.png", &[100, 200]);
    let config = dir.path().join("config.json");
    // line support above the frame width: nothing can be found
    std::fs::write(
        &config,
        r#"{ "inputs": [], "params": { "hough": { "min_line_length": 700 } } }"#,
    )
    .unwrap();

    sheet_count()
        .arg("image")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("sheets: 0"));
}

#[test]
fn report_indexes_follow_decoded_frames() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("a_broken.png");
    std::fs::write(&bogus, b"garbage").unwrap();
    let good = write_banded(dir.path(), "b_stack.png", &[80, 180]);
    let report = dir.path().join("report.json");

    sheet_count()
        .arg("frames")
        .arg(&bogus)
        .arg(&good)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("frames: 1"))
        .stdout(predicate::str::contains("skipped: 1"));

    let report = SheetCountReport::load_json(&report).unwrap();
    assert_eq!(report.best_frame_index, Some(0));
    assert_eq!(report.inputs.len(), 1);
    assert_eq!(report.frames.len(), 1);
    assert!(report.frames[0]
        .source
        .as_deref()
        .is_some_and(|s| s.ends_with("b_stack.png")));
    assert!(report
        .best_frame_source()
        .is_some_and(|s| s.ends_with("b_stack.png")));
    assert_eq!(report.skipped, vec![bogus.display().to_string()]);
}

#[test]
fn config_run_writes_report_to_configured_path() {
    let dir = tempfile::tempdir().unwrap();
    let f0 = write_banded(dir.path(), "f0.png", &[80]);
    let f1 = write_banded(dir.path(), "f1.png", &[80, 180]);
    let report = dir.path().join("from_config.json");
    let config = dir.path().join("config.json");
    let cfg = serde_json::json!({
        "inputs": [f0.display().to_string(), f1.display().to_string()],
        "report_path": report.display().to_string(),
    });
    std::fs::write(&config, cfg.to_string()).unwrap();

    sheet_count()
        .arg("frames")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("max sheets: 2"));

    let report = SheetCountReport::load_json(&report).unwrap();
    assert_eq!(report.best_frame_index, Some(1));
    assert_eq!(report.frames_processed, 2);
}

#[test]
fn config_with_invalid_params_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_banded(dir.path(), "stack.png", &[100]);
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{ "inputs": [], "params": { "cluster": { "eps": -1.0 } } }"#,
    )
    .unwrap();

    sheet_count()
        .arg("image")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("eps"));
}
