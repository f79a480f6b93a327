/*!
 * Integration tests for application lifecycle and the command line
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use captionkit::app_config::Config;
use captionkit::app_controller::Controller;
use captionkit::converter::FixedGate;
use crate::common;

fn run_cli(config_dir: &Path, args: &[&str]) -> Result<Output> {
    let config = common::config_path(config_dir);
    let output = Command::new(env!("CARGO_BIN_EXE_captionkit"))
        .arg("--config")
        .arg(&config)
        .args(["--log-level", "error"])
        .args(args)
        .stdin(Stdio::null())
        .output()?;
    Ok(output)
}

/// Test that the controller refuses an invalid configuration
#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.batch.concurrent_workers = 0;
    assert!(Controller::with_config(config).is_err());
}

/// Test that a config loaded from disk drives the conversion
#[test]
fn test_controller_withLoadedConfig_shouldApplyHeaderPolicy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config_path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{"conversion": {"header_policy": "padded"}}"#,
    )?;
    let srt = common::create_test_srt(temp_dir.path(), "movie.srt")?;
    let vtt = temp_dir.path().join("movie.vtt");

    let controller = Controller::with_config(Config::load_or_create(&config_path)?)?;
    controller.convert(&srt, &vtt, None, false, &mut FixedGate(false))?;

    assert!(fs::read_to_string(&vtt)?.starts_with("WEBVTT\n\n\n\n00:00:01.000"));
    Ok(())
}

/// Test a successful conversion through the binary
#[test]
fn test_cli_convert_shouldExitZeroAndCreateConfig() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_srt(temp_dir.path(), "movie.srt")?;
    let vtt = temp_dir.path().join("movie.vtt");

    let output = run_cli(temp_dir.path(), &["convert", srt.to_str().unwrap(), vtt.to_str().unwrap()])?;

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&vtt)?, common::SAMPLE_VTT);
    assert!(common::config_path(temp_dir.path()).exists());
    Ok(())
}

/// Test that a wrong output extension exits non-zero
#[test]
fn test_cli_convert_wrongExtension_shouldExitOne() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_srt(temp_dir.path(), "movie.srt")?;
    let txt = temp_dir.path().join("movie.txt");

    let output = run_cli(temp_dir.path(), &["convert", srt.to_str().unwrap(), txt.to_str().unwrap()])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("movie.txt"));
    assert!(!txt.exists());
    Ok(())
}

/// Test that an unanswered prompt declines and writes nothing
#[test]
fn test_cli_convert_divergenceWithoutAnswer_shouldExitOneWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_file(temp_dir.path(), "gapped.srt", common::GAPPED_SRT)?;
    let vtt = temp_dir.path().join("gapped.vtt");

    let output = run_cli(temp_dir.path(), &["convert", srt.to_str().unwrap(), vtt.to_str().unwrap()])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(!vtt.exists());

    let output = run_cli(temp_dir.path(), &["convert", "--yes", srt.to_str().unwrap(), vtt.to_str().unwrap()])?;
    assert!(output.status.success());
    assert!(vtt.exists());
    Ok(())
}

/// Test that --strict rejects an SRT cue without an index line
#[test]
fn test_cli_convert_strictWithMissingIndex_shouldExitOneWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt = common::create_test_file(temp_dir.path(), "unnumbered.srt", "00:00:01,000 --> 00:00:02,000\nHello\n\n")?;
    let vtt = temp_dir.path().join("unnumbered.vtt");

    let output = run_cli(temp_dir.path(), &["convert", "--strict", "--yes", srt.to_str().unwrap(), vtt.to_str().unwrap()])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no index line"));
    assert!(!vtt.exists());

    let output = run_cli(temp_dir.path(), &["convert", "--yes", srt.to_str().unwrap(), vtt.to_str().unwrap()])?;
    assert!(output.status.success());
    assert!(vtt.exists());
    Ok(())
}

/// Test that check exits non-zero on divergence and zero otherwise
#[test]
fn test_cli_check_shouldReflectVerification() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let gapped = common::create_test_file(temp_dir.path(), "gapped.srt", common::GAPPED_SRT)?;
    let clean = common::create_test_vtt(temp_dir.path(), "clean.vtt")?;

    assert_eq!(run_cli(temp_dir.path(), &["check", gapped.to_str().unwrap()])?.status.code(), Some(1));
    assert!(run_cli(temp_dir.path(), &["check", clean.to_str().unwrap()])?.status.success());
    Ok(())
}

/// Test that shell completions are generated
#[test]
fn test_cli_completions_shouldPrintScript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = run_cli(temp_dir.path(), &["completions", "bash"])?;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("captionkit"));
    Ok(())
}
