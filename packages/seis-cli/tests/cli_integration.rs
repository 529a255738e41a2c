use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use predicates::prelude::*;
use seis_rs::{Stream, Trace, TraceStats};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn seisutil() -> Command {
    Command::cargo_bin("seisutil").unwrap()
}

/// 30 s at 100 Hz: quiet record, a ramp to 1.0 after 10 s, then decay
fn record(station: &str, offset: f64) -> Trace {
    let data = (0..3000)
        .map(|k| {
            let t = k as f64 * 0.01;
            let a = if t < 10.0 {
                0.001 * (1.3 * k as f64).sin()
            } else if t < 12.0 {
                (t - 10.0) / 2.0
            } else if t < 20.0 {
                1.0 - (t - 12.0) / 8.0
            } else {
                0.0
            };
            a + offset
        })
        .collect();
    let start = Utc.with_ymd_and_hms(2014, 8, 24, 10, 20, 34).unwrap();
    Trace::new(TraceStats::new("NC", station, "HNE", start, 0.01), data)
}

fn write_stream(dir: &Path, name: &str, traces: Vec<Trace>) -> PathBuf {
    let path = dir.join(name);
    seis_rs::io::save(&path, &Stream::new(traces), false).unwrap();
    path
}

fn read_stream(path: &Path) -> Stream {
    seis_rs::io::load(path).unwrap()
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    seisutil()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    seisutil()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("seisutil"));
}

#[test]
fn test_help_flag() {
    seisutil()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("wavelet denoising"));
}

// =============================================================================
// WAVELETS SUBCOMMAND
// =============================================================================

#[test]
fn test_wavelets_table() {
    seisutil()
        .arg("wavelets")
        .assert()
        .success()
        .stdout(predicate::str::contains("haar"))
        .stdout(predicate::str::contains("db4"))
        .stdout(predicate::str::contains("(default)"));
}

#[test]
fn test_wavelets_json() {
    let output = seisutil().arg("wavelets").arg("--json").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.get("name").unwrap().as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["haar", "db2", "db4", "sym4", "coif1"]);
}

// =============================================================================
// VALIDATE SUBCOMMAND
// =============================================================================

#[test]
fn test_validate_nonexistent_file() {
    seisutil()
        .args(["validate", "--file", "/nonexistent/stream.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_validate_valid_stream() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0)]);
    seisutil()
        .args(["validate", "--file", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (1 traces)"));
}

#[test]
fn test_validate_json_reports_short_trace() {
    let tmp = TempDir::new().unwrap();
    let short = record("C020", 0.0).with_data(vec![0.0; 5]);
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0), short]);

    let output = seisutil()
        .args(["validate", "--json", "--file", path.to_str().unwrap()])
        .assert()
        .code(2);
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let traces = parsed["traces"].as_array().unwrap();
    assert_eq!(traces.len(), 2);
    assert!(traces[0]["error"].is_null());
    assert_eq!(traces[0]["max_level"], 8);
    assert!(traces[1]["error"].is_string());
}

// =============================================================================
// DENOISE SUBCOMMAND
// =============================================================================

#[test]
fn test_denoise_missing_input() {
    seisutil()
        .arg("denoise")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be specified"));
}

#[test]
fn test_denoise_unknown_wavelet() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0)]);
    seisutil()
        .args(["denoise", "--file", path.to_str().unwrap(), "--wavelet", "morlet"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown wavelet"));
}

#[test]
fn test_denoise_store_noise_needs_output_dir() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0)]);
    seisutil()
        .args(["denoise", "--store-noise", "--file", path.to_str().unwrap()])
        .assert()
        .code(2);
}

#[test]
fn test_denoise_single_file_to_output() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0), record("C020", 0.0)]);
    let out = tmp.path().join("clean.json");

    seisutil()
        .args(["denoise", "--quiet", "--file", path.to_str().unwrap()])
        .args(["--wavelet", "sym4", "-o", out.to_str().unwrap()])
        .assert()
        .success();

    let stream = read_stream(&out);
    assert_eq!(stream.len(), 2);
    for trace in &stream {
        assert_eq!(trace.npts(), 3000);
        assert!(trace.stats.snr.is_some());
    }
}

#[test]
fn test_denoise_glob_with_noise_companions() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir_all(&input).unwrap();
    write_stream(&input, "a.json", vec![record("C010", 0.0)]);
    write_stream(&input, "b.json", vec![record("C020", 0.0)]);
    let out_dir = tmp.path().join("out");

    let pattern = format!("{}/*.json", input.to_str().unwrap());
    seisutil()
        .args(["denoise", "--glob", pattern.as_str(), "--store-noise"])
        .args(["--output-dir", out_dir.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("2/2 files succeeded"));

    let original = read_stream(&input.join("a.json"));
    let signal = read_stream(&out_dir.join("a_denoised.json"));
    let noise = read_stream(&out_dir.join("a_noise.json"));
    for ((s, n), x) in signal.traces[0]
        .data
        .iter()
        .zip(&noise.traces[0].data)
        .zip(&original.traces[0].data)
    {
        assert!((s + n - x).abs() < 1e-8);
    }
    assert!(out_dir.join("b_denoised.json").exists());
}

#[test]
fn test_denoise_bad_trace_policy() {
    let tmp = TempDir::new().unwrap();
    let short = record("C020", 0.0).with_data(vec![1.0; 4]);
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0), short]);
    let out = tmp.path().join("clean.json");

    seisutil()
        .args(["denoise", "--file", path.to_str().unwrap(), "-o", out.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Denoising failed"));
    assert!(!out.exists());

    seisutil()
        .args(["denoise", "--continue-on-error", "--file", path.to_str().unwrap()])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Skipped NC.C020..HNE"));
    let stream = read_stream(&out);
    assert_eq!(stream.traces[1].data, vec![1.0; 4]);
}

#[test]
fn test_denoise_settings_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0)]);
    let settings = tmp.path().join("settings.json");
    fs::write(&settings, r#"{"denoise": {"wavelet": "haar", "level": 4}}"#).unwrap();

    seisutil()
        .args(["denoise", "--quiet", "--file", path.to_str().unwrap()])
        .args(["--settings", settings.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"traces\""));
}

#[test]
fn test_denoise_stdout_honours_compact() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.0)]);

    let pretty = seisutil()
        .args(["denoise", "--quiet", "--file", path.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let pretty = String::from_utf8(pretty).unwrap();
    assert!(pretty.trim_end().lines().count() > 1);
    assert!(pretty.contains("\n  \"traces\""));

    let compact = seisutil()
        .args(["denoise", "--quiet", "--compact", "--file", path.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let compact = String::from_utf8(compact).unwrap();
    assert_eq!(compact.trim_end().lines().count(), 1);

    let from_pretty: Stream = serde_json::from_str(&pretty).unwrap();
    let from_compact: Stream = serde_json::from_str(&compact).unwrap();
    assert_eq!(from_pretty.traces[0].data, from_compact.traces[0].data);
}

// =============================================================================
// BASELINE SUBCOMMAND
// =============================================================================

#[test]
fn test_baseline_requires_origin() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.002)]);
    seisutil()
        .args(["baseline", "--file", path.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("origin time is required"));
}

#[test]
fn test_baseline_corrects_stream() {
    let tmp = TempDir::new().unwrap();
    let path = write_stream(tmp.path(), "s.json", vec![record("C010", 0.002)]);
    let out = tmp.path().join("corrected.json");

    seisutil()
        .args(["baseline", "--file", path.to_str().unwrap()])
        .args(["--origin-time", "2014-08-24T10:20:44Z", "--tail-window", "5"])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success();

    let stream = read_stream(&out);
    let pre_mean = stream.traces[0].data[..1000].iter().sum::<f64>() / 1000.0;
    assert!(pre_mean.abs() < 1e-6);
}

// =============================================================================
// CONVERT SUBCOMMAND
// =============================================================================

#[test]
fn test_convert_specfem_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("STATIONS"), "NORTH NC 38.0 -122.2 120.0 0.0\n").unwrap();
    for component in ['E', 'N', 'Z'] {
        let mut text = String::new();
        for k in 0..20 {
            writeln!(text, "{:.3} {:.5e}", -1.0 + k as f64 * 0.1, 0.5).unwrap();
        }
        fs::write(tmp.path().join(format!("NORTH.NC.HX{}.semv", component)), text).unwrap();
    }
    let out = tmp.path().join("stream.json");

    seisutil()
        .args(["convert", "--stations", tmp.path().join("STATIONS").to_str().unwrap()])
        .args(["--data-dir", tmp.path().to_str().unwrap()])
        .args(["--origin-time", "2014-08-24T10:20:44Z"])
        .args(["--epicenter", "-122.2,37.8", "--utm-zone", "10"])
        .args(["-o", out.to_str().unwrap()])
        .assert()
        .success();

    let stream = read_stream(&out);
    assert_eq!(stream.len(), 3);
    let stats = &stream.traces[0].stats;
    assert_eq!(stats.channel, "HXE");
    assert_eq!(
        stats.starttime,
        Utc.with_ymd_and_hms(2014, 8, 24, 10, 20, 43).unwrap()
    );
    assert_eq!(stream.traces[0].npts(), 20);
    let baz = stats.back_azimuth.unwrap();
    assert!((baz - 180.0).abs() < 1.0, "back-azimuth {}", baz);
    assert!(stats.distance.unwrap() > 20_000.0);
}

#[test]
fn test_convert_epicenter_without_zone() {
    seisutil()
        .args(["convert", "--stations", "STATIONS", "--data-dir", "."])
        .args(["--origin-time", "2014-08-24T10:20:44Z", "--epicenter", "-122.2,37.8"])
        .env_remove("SEIS_UTM_ZONE")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must be given together"));
}

#[test]
fn test_convert_unknown_data_type() {
    seisutil()
        .args(["convert", "--stations", "STATIONS", "--data-dir", "."])
        .args(["--origin-time", "2014-08-24T10:20:44Z", "--data-type", "pressure"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown data type"));
}
