#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::Command;

use pipeport::frame::alaw;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "ppcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn pipeport() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pipeport"));
    cmd.arg("--log-level").arg("error");
    cmd
}

#[test]
fn info_reports_alaw_geometry_as_json() {
    let output = pipeport()
        .args(["--format", "json", "info", "--rate", "8000", "--codec", "alaw"])
        .output()
        .expect("info should run");
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("info should print JSON");
    assert_eq!(value["codec"], "PCMA");
    assert_eq!(value["samples_per_frame"], 160);
    assert_eq!(value["transport_frame_bytes"], 160);
    assert_eq!(value["pipeline_frame_bytes"], 320);
}

#[test]
fn info_rejects_three_channels_as_usage_error() {
    let output = pipeport()
        .args(["info", "--channels", "3"])
        .output()
        .expect("info should run");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn transcode_alaw_file_to_linear_file() {
    let dir = unique_temp_dir("transcode");
    let input = dir.join("in.pcma");
    let output_path = dir.join("out.l16");

    let samples: Vec<i16> = (0..320).map(|i| (i as i16) * 50 - 8000).collect();
    let codes: Vec<u8> = samples.iter().map(|&s| alaw::linear_to_alaw(s)).collect();
    std::fs::write(&input, &codes).expect("input should be writable");
    std::fs::write(&output_path, b"").expect("output should be creatable");

    let output = pipeport()
        .args(["--format", "json", "transcode"])
        .arg(&input)
        .arg(&output_path)
        .args(["--from", "alaw", "--to", "linear"])
        .output()
        .expect("transcode should run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("summary should be JSON");
    assert_eq!(summary["frames"], 2);
    assert_eq!(summary["end_of_stream"], true);
    assert_eq!(summary["bytes_written"], 640);

    let written = std::fs::read(&output_path).expect("output should be readable");
    assert_eq!(written.len(), 640);
    for (chunk, &code) in written.chunks_exact(2).zip(&codes) {
        let sample = i16::from_ne_bytes([chunk[0], chunk[1]]);
        assert_eq!(sample, alaw::alaw_to_linear(code));
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn transcode_missing_output_is_transport_error() {
    let dir = unique_temp_dir("missing-out");
    let input = dir.join("in.pcma");
    std::fs::write(&input, [0xD5u8; 160]).expect("input should be writable");

    let output = pipeport()
        .arg("transcode")
        .arg(&input)
        .arg(dir.join("absent.l16"))
        .output()
        .expect("transcode should run");
    assert_eq!(output.status.code(), Some(3));
    assert!(!dir.join("absent.l16").exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn mkfifo_creates_named_pipe() {
    use std::os::unix::fs::FileTypeExt;

    let dir = unique_temp_dir("mkfifo");
    let path = dir.join("audio.fifo");

    let output = pipeport()
        .args(["--format", "json", "mkfifo"])
        .arg(&path)
        .output()
        .expect("mkfifo should run");
    assert!(output.status.success());
    let meta = std::fs::metadata(&path).expect("fifo should exist");
    assert!(meta.file_type().is_fifo());

    let again = pipeport()
        .arg("mkfifo")
        .arg(&path)
        .output()
        .expect("mkfifo should run");
    assert_eq!(again.status.code(), Some(3));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = pipeport().arg("version").output().expect("version should run");
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert_eq!(text.trim(), format!("pipeport {}", env!("CARGO_PKG_VERSION")));
}
