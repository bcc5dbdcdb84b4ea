use std::fs;
use std::path::PathBuf;

use ratebound::{MebibytesPerSecondBound, ThrottleConfig};
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn loads_toml_throttles() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "throttle.toml",
        r#"
stream_throughput_outbound = "24MiB/s"
inter_dc_stream_throughput_outbound = "10240KiB/s"
compaction_throughput = "64MiB/s"
"#,
    );
    let cfg = ThrottleConfig::load(&path).unwrap();
    assert_eq!(
        cfg.stream_throughput().unwrap().to_mebibytes_per_second_as_i32(),
        24
    );
    // 10240KiB/s and 10MiB/s are the same quantity.
    assert_eq!(
        cfg.inter_dc_stream_throughput().unwrap(),
        "10MiB/s".parse::<MebibytesPerSecondBound>().unwrap()
    );
    assert_eq!(cfg.compaction_throughput().to_string(), "64MiB/s");
    assert!(cfg.entire_sstable_stream_throughput().is_unthrottled());
}

#[test]
fn loads_json_throttles() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "throttle.json",
        r#"{"stream_throughput_outbound": "24MiB/s"}"#,
    );
    let cfg = ThrottleConfig::load(&path).unwrap();
    assert_eq!(cfg.stream_throughput().unwrap().to_string(), "24MiB/s");
}

#[test]
fn legacy_megabit_key_resolves_through_conversion() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "throttle.toml",
        "stream_throughput_outbound_megabits_per_sec = 200\n",
    );
    let cfg = ThrottleConfig::load(&path).unwrap();
    assert_eq!(cfg.stream_throughput().unwrap().to_string(), "24MiB/s");
}

#[test]
fn conflicting_spellings_fail_to_load() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "throttle.toml",
        "stream_throughput_outbound = \"24MiB/s\"\n\
         stream_throughput_outbound_megabits_per_sec = 200\n",
    );
    let err = ThrottleConfig::load(&path).unwrap_err();
    assert!(format!("{err:?}").contains("mutually exclusive"));
}

#[test]
fn bad_rate_text_fails_with_the_offending_input() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "throttle.toml",
        "compaction_throughput = \"-10B/s\"\n",
    );
    let err = ThrottleConfig::load(&path).unwrap_err();
    assert!(format!("{err:?}").contains("Invalid data rate: -10B/s"));
}

#[test]
fn over_ceiling_rate_fails_with_ceiling_and_unit() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "throttle.toml",
        "stream_throughput_outbound = \"2147483648MiB/s\"\n",
    );
    let err = ThrottleConfig::load(&path).unwrap_err();
    let rendered = format!("{err:?}");
    assert!(rendered.contains("2147483648MiB/s"));
    assert!(rendered.contains("2147483646 in mebibytes_per_second"));
}

#[test]
fn missing_file_names_the_path() {
    let err = ThrottleConfig::load("/nonexistent/throttle.toml").unwrap_err();
    assert!(format!("{err:?}").contains("/nonexistent/throttle.toml"));
}
