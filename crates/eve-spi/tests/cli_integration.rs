//! Integration tests for the eve-spi CLI.

use env_logger as _;
use eve_decoder as _;
use log as _;
use serde_json as _;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("eve-spi")
}

fn create_temp_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const FT81X_CAPTURE: &str = "\
# RST_PULSE
enable,0
result,0,8,68,00
result,8,16,00,00
result,16,24,00,00
disable,30

# READ REG_ID
enable,40
result,40,48,00,00
result,48,56,30,00
result,56,64,20,00
result,64,72,00,00
result,72,80,00,7C
disable,90

# lone byte, dropped
enable,100
result,100,108,41,00
disable,110
";

const BT82X_CAPTURE: &str = "\
enable,0
result,0,8,00,00
result,8,16,00,00
result,16,24,00,00
result,24,32,00,00
result,32,40,00,00
disable,50
";

#[test]
fn decode_prints_one_line_per_frame() {
    let temp_dir = tempfile::tempdir().unwrap();
    let capture = create_temp_file(temp_dir.path(), "ft81x.txt", FT81X_CAPTURE);

    let output = Command::new(binary_path())
        .args(["decode", capture.to_str().unwrap()])
        .output()
        .expect("failed to run eve-spi");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "0..24 RST_PULSE",
            "40..80 READ REG_ID from 0x302000 = 0x7C",
        ]
    );
}

#[test]
fn decode_honours_chip_selection() {
    let temp_dir = tempfile::tempdir().unwrap();
    let capture = create_temp_file(temp_dir.path(), "bt82x.txt", BT82X_CAPTURE);

    let output = Command::new(binary_path())
        .args(["decode", capture.to_str().unwrap(), "--chip", "bt82x"])
        .output()
        .expect("failed to run eve-spi");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "0..40 ACTIVE");
}

#[test]
fn decode_json_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let capture = create_temp_file(temp_dir.path(), "ft81x.txt", FT81X_CAPTURE);

    let output = Command::new(binary_path())
        .args(["decode", capture.to_str().unwrap(), "--json"])
        .output()
        .expect("failed to run eve-spi");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"label\":\"RST_PULSE\""));
    assert!(lines[0].contains("\"type\":\"command\""));
    assert!(lines[1].contains("\"address\":3153920"));
    assert!(lines[1].contains("\"data\":\"0x7C\""));
}

#[test]
fn decode_reports_malformed_listing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let capture = create_temp_file(temp_dir.path(), "bad.txt", "enable,0\nresult,1,2,zz,00\n");

    let output = Command::new(binary_path())
        .args(["decode", capture.to_str().unwrap()])
        .output()
        .expect("failed to run eve-spi");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"));
    assert!(stderr.contains("invalid byte"));
}

#[test]
fn decode_reports_missing_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.txt");

    let output = Command::new(binary_path())
        .args(["decode", missing.to_str().unwrap()])
        .output()
        .expect("failed to run eve-spi");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn tables_lists_generation_symbols() {
    let output = Command::new(binary_path())
        .args(["tables", "--chip", "bt82x"])
        .output()
        .expect("failed to run eve-spi");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0x7F80044C  REG_BOOT_STATUS"));
    assert!(stdout.contains("0x492E2E2E  Coprocessor is running"));
}

#[test]
fn tables_skips_empty_boot_status_for_ft81x() {
    let output = Command::new(binary_path())
        .args(["tables"])
        .output()
        .expect("failed to run eve-spi");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0x00302578  REG_CMDB_WRITE"));
    assert!(!stdout.contains("Coprocessor is running"));
}

#[test]
fn help_prints_usage() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run eve-spi");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: eve-spi"));
}

#[test]
fn unknown_command_fails() {
    let output = Command::new(binary_path())
        .arg("encode")
        .output()
        .expect("failed to run eve-spi");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown command"));
}
