//! CLI end-to-end tests
//!
//! Tests for the thumbforge command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the thumbforge binary
#[allow(deprecated)]
fn thumbforge_cmd() -> Command {
    Command::cargo_bin("thumbforge").unwrap()
}

/// Create an album folder holding the given files.
fn album(root: &Path, name: &str, files: &[&str]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for file in files {
        fs::write(dir.join(file), b"media").unwrap();
    }
    dir
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = thumbforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = thumbforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("thumbforge"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = thumbforge_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("thumbforge"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = thumbforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_generate_help() {
    let mut cmd = thumbforge_cmd();
    cmd.args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--parallelism"))
        .stdout(predicate::str::contains("--library"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = thumbforge_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"))
        .stdout(predicate::str::contains("magick"));
}

#[test]
fn test_cli_catalog_lists_jobs() {
    let temp = tempdir().unwrap();
    let holiday = album(temp.path(), "holiday", &["b.mp4", "a.jpg"]);
    let out = temp.path().join("thumbs");

    let mut cmd = thumbforge_cmd();
    cmd.arg("catalog")
        .arg(&holiday)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Jobs: 1"))
        .stdout(predicate::str::contains("[image]"))
        .stdout(predicate::str::contains("holiday_thumb.webp"));

    // Catalog never converts anything.
    assert!(!out.exists());
}

#[test]
fn test_cli_catalog_json() {
    let temp = tempdir().unwrap();
    let clips = album(temp.path(), "clips", &["clip.MOV"]);
    let empty = album(temp.path(), "empty", &[]);

    let output = thumbforge_cmd()
        .arg("catalog")
        .arg(&clips)
        .arg(&empty)
        .arg("--json")
        .output()
        .unwrap();

    // An entry error makes the exit code non-zero, but the report is still printed.
    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(report["jobs"][0]["kind"], "video");
    assert_eq!(report["jobs"][0]["album"], "clips");
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);
    assert_eq!(
        report["errors"][0]["location"],
        empty.display().to_string()
    );
    assert!(report["errors"][0]["error"]
        .as_str()
        .unwrap()
        .contains("no eligible media file"));
}

#[test]
fn test_cli_catalog_library() {
    let temp = tempdir().unwrap();
    let library = temp.path().join("library");
    album(&library, "one", &["1.png"]);
    album(&library, "two", &["2.webm"]);

    let mut cmd = thumbforge_cmd();
    cmd.arg("catalog")
        .arg("--library")
        .arg(&library)
        .assert()
        .success()
        .stdout(predicate::str::contains("Jobs: 2"))
        .stdout(predicate::str::contains("one_thumb.webp"))
        .stdout(predicate::str::contains("two_thumb.webp"));
}

#[test]
fn test_cli_catalog_without_locations_fails() {
    let mut cmd = thumbforge_cmd();
    cmd.arg("catalog")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No album folders"));
}

#[test]
fn test_cli_catalog_missing_location_is_reported() {
    let temp = tempdir().unwrap();

    let mut cmd = thumbforge_cmd();
    cmd.arg("catalog")
        .arg(temp.path().join("nope"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("location does not exist"));
}

#[test]
fn test_cli_generate_zero_parallelism_fails() {
    let temp = tempdir().unwrap();
    let holiday = album(temp.path(), "holiday", &["a.jpg"]);
    let out = temp.path().join("thumbs");

    let mut cmd = thumbforge_cmd();
    cmd.arg("generate")
        .arg(&holiday)
        .arg("-o")
        .arg(&out)
        .args(["-j", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parallelism"));

    assert!(!out.exists());
}

#[test]
fn test_cli_generate_missing_config_file_fails() {
    let temp = tempdir().unwrap();
    let holiday = album(temp.path(), "holiday", &["a.jpg"]);

    let mut cmd = thumbforge_cmd();
    cmd.current_dir(temp.path())
        .arg("--config")
        .arg(temp.path().join("absent.json"))
        .arg("generate")
        .arg(&holiday)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));

    assert!(!temp.path().join("thumbnails").exists());
}

#[test]
fn test_cli_validate_config() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.json");
    fs::write(
        &config_path,
        r#"{ "thumbnails": { "height": 200 }, "pipeline": { "parallelism": 4 } }"#,
    )
    .unwrap();

    let mut cmd = thumbforge_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_cli_validate_reports_warnings() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.json");
    fs::write(&config_path, r#"{ "pipeline": { "parallelism": 0 } }"#).unwrap();

    let mut cmd = thumbforge_cmd();
    cmd.args(["--config"])
        .arg(&config_path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("warnings"));
}

#[test]
fn test_cli_validate_rejects_malformed_config() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.json");
    fs::write(&config_path, "{ not json").unwrap();

    let mut cmd = thumbforge_cmd();
    cmd.arg("validate")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config parse error"));
}

#[test]
fn test_cli_validate_missing_file_fails() {
    let temp = tempdir().unwrap();

    let mut cmd = thumbforge_cmd();
    cmd.arg("validate")
        .arg(temp.path().join("absent.json"))
        .assert()
        .failure();
}

#[cfg(unix)]
mod with_fake_tools {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write a config whose tools are shell scripts writing their last argument.
    fn fake_tools_config(dir: &Path) -> PathBuf {
        let script = dir.join("fake-tool");
        fs::write(
            &script,
            "#!/bin/sh\nfor last; do :; done\nprintf 'thumb' > \"$last\"\n",
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let config = serde_json::json!({
            "tools": { "ffmpeg_path": script, "magick_path": script },
            "thumbnails": { "output_dir": dir.join("thumbs") },
        });
        let path = dir.join("config.json");
        fs::write(&path, config.to_string()).unwrap();
        path
    }

    #[test]
    fn test_cli_generate_writes_thumbnails() {
        let temp = tempdir().unwrap();
        let config = fake_tools_config(temp.path());
        let photos = album(temp.path(), "photos", &["p.jpg"]);
        let clips = album(temp.path(), "clips", &["c.mp4"]);

        let mut cmd = thumbforge_cmd();
        cmd.arg("--config")
            .arg(&config)
            .arg("generate")
            .arg(&photos)
            .arg(&clips)
            .args(["-j", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 succeeded, 0 failed"));

        let thumbs = temp.path().join("thumbs");
        assert_eq!(fs::read(thumbs.join("photos_thumb.webp")).unwrap(), b"thumb");
        assert_eq!(fs::read(thumbs.join("clips_thumb.webp")).unwrap(), b"thumb");
    }

    #[test]
    fn test_cli_generate_json_and_skip_existing() {
        let temp = tempdir().unwrap();
        let config = fake_tools_config(temp.path());
        let photos = album(temp.path(), "photos", &["p.jpg"]);

        thumbforge_cmd()
            .arg("--config")
            .arg(&config)
            .arg("generate")
            .arg(&photos)
            .assert()
            .success();

        let output = thumbforge_cmd()
            .arg("--config")
            .arg(&config)
            .arg("generate")
            .arg(&photos)
            .arg("--skip-existing")
            .arg("--json")
            .output()
            .unwrap();

        assert!(output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["run"]["summary"]["total"], 0);
        assert_eq!(report["up_to_date"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_cli_generate_rejects_negative_parallelism_in_config() {
        let temp = tempdir().unwrap();
        let marker = temp.path().join("spawned");
        let script = temp.path().join("fake-tool");
        fs::write(
            &script,
            format!("#!/bin/sh\ntouch '{}'\n", marker.display()),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let config = temp.path().join("config.json");
        let json = serde_json::json!({
            "tools": { "ffmpeg_path": script, "magick_path": script },
            "thumbnails": { "output_dir": temp.path().join("thumbs") },
            "pipeline": { "parallelism": -1 },
        });
        fs::write(&config, json.to_string()).unwrap();
        let photos = album(temp.path(), "photos", &["p.jpg"]);

        let mut cmd = thumbforge_cmd();
        cmd.current_dir(temp.path())
            .arg("--config")
            .arg(&config)
            .arg("generate")
            .arg(&photos)
            .assert()
            .failure()
            .stderr(predicate::str::contains("config parse error"))
            .stderr(predicate::str::contains("Starting pipeline run").not());

        assert!(!marker.exists());
        assert!(!temp.path().join("thumbs").exists());
        assert!(!temp.path().join("thumbnails").exists());
    }

    #[test]
    fn test_cli_generate_partial_failure_exits_nonzero() {
        let temp = tempdir().unwrap();
        let config = fake_tools_config(temp.path());
        let photos = album(temp.path(), "photos", &["p.jpg"]);
        let empty = album(temp.path(), "empty", &[]);

        let mut cmd = thumbforge_cmd();
        cmd.arg("--config")
            .arg(&config)
            .arg("generate")
            .arg(&photos)
            .arg(&empty)
            .assert()
            .failure()
            .stdout(predicate::str::contains("1 succeeded"))
            .stdout(predicate::str::contains("skipped"));

        assert!(temp.path().join("thumbs/photos_thumb.webp").exists());
    }
}
