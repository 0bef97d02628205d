//! Integration tests for the verify CLI

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

struct Fixture {
    config_dir: TempDir,
    model_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let config_dir = TempDir::new().expect("config dir");
        std::fs::write(config_dir.path().join("config.toml"), "").expect("write config");
        Self {
            config_dir,
            model_dir: TempDir::new().expect("model dir"),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) {
        let path = self.model_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, contents).expect("write file");
    }

    fn manifest(&self, lines: &[(&str, &str)]) {
        let body: String = lines
            .iter()
            .map(|(digest, path)| format!("{digest}  {path}\n"))
            .collect();
        self.write("CHECKSUMS.sha256", body.as_bytes());
    }

    fn run(&self, args: &[&str]) -> Output {
        self.run_on(self.model_dir.path(), args)
    }

    fn run_on(&self, dir: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_verify"))
            .arg("--config")
            .arg(self.config_dir.path().join("config.toml"))
            .args(["--color", "never"])
            .args(args)
            .arg(dir)
            .env_remove("SOV_OUTPUT")
            .env_remove("SOV_COLOR")
            .env_remove("SOV_VERIFY_ALGORITHM")
            .env_remove("SOV_VERIFY_CHUNK_SIZE")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute verify")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_verify"))
        .arg("--help")
        .output()
        .expect("Failed to execute verify");

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("--generate"));
    assert!(stdout.contains("MODEL_DIR"));
}

#[test]
fn test_missing_argument_is_usage_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_verify"))
        .output()
        .expect("Failed to execute verify");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("MODEL_DIR"));
}

#[test]
fn test_all_files_pass() {
    let fixture = Fixture::new();
    fixture.write("weights.bin", b"abc");
    fixture.manifest(&[(ABC_SHA256, "weights.bin")]);

    let output = fixture.run(&[]);
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(0), "{stdout}");
    assert!(stdout.contains("  Model directory : "));
    assert!(stdout.contains("  Total size      : 0.00 GB"));
    assert!(stdout.contains("  Checking : weights.bin... OK (0.00 GB)"));
    assert!(stdout.contains("  Passed: 1  Failed: 0  Missing: 0"));
    assert!(stdout.contains("  All files verified. Safe to serve."));
}

#[test]
fn test_missing_file_fails() {
    let fixture = Fixture::new();
    fixture.manifest(&[(ABC_SHA256, "weights.bin")]);

    let output = fixture.run(&[]);
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("  MISSING  : weights.bin"));
    assert!(stdout.contains("  Passed: 0  Failed: 0  Missing: 1"));
    assert!(stdout.contains("  Verification FAILED. Do NOT serve this model."));
    assert!(stdout.contains("     Re-download and try again."));
}

#[test]
fn test_mismatch_prints_both_digests() {
    let fixture = Fixture::new();
    fixture.write("weights.bin", b"abd");
    fixture.manifest(&[(ABC_SHA256, "weights.bin")]);

    let output = fixture.run(&[]);
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("  Checking : weights.bin... FAILED!"));
    assert!(stdout.contains(&format!("    Expected : {ABC_SHA256}")));
    assert!(stdout.contains("    Got      : "));
    assert!(stdout.contains("  Passed: 0  Failed: 1  Missing: 0"));
}

#[test]
fn test_escaping_entry_is_skipped() {
    let fixture = Fixture::new();
    fixture.write("weights.bin", b"abc");
    fixture.manifest(&[
        (ABC_SHA256, "weights.bin"),
        (ABC_SHA256, "../secret.txt"),
    ]);

    let output = fixture.run(&[]);
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("  SKIPPED  : ../secret.txt (path escapes model directory)"));
    assert!(stdout.contains("  Passed: 1  Failed: 1  Missing: 0"));
}

#[test]
fn test_failing_run_keeps_stderr_free_of_logs() {
    let fixture = Fixture::new();
    fixture.write("weights.bin", b"abd");
    fixture.write("config.json", b"abc");
    std::fs::create_dir(fixture.model_dir.path().join("shards")).expect("create dir");
    fixture.write(
        "CHECKSUMS.sha256",
        format!(
            "{ABC_SHA256}  config.json\n\
             not a manifest line\n\
             {ABC_SHA256}  weights.bin\n\
             {ABC_SHA256}  tokenizer.json\n\
             {ABC_SHA256}  ../secret.txt\n\
             {ABC_SHA256}  shards\n"
        )
        .as_bytes(),
    );

    let output = fixture.run(&[]);
    let stdout = stdout(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "{stdout}");
    assert!(stdout.contains("  Checking : weights.bin... FAILED!\n"));
    assert!(stdout.contains("  MISSING  : tokenizer.json"));
    assert!(stdout.contains("  Passed: 1  Failed: 3  Missing: 1"));

    assert_eq!(
        stderr
            .matches("Warning: ignored 1 malformed manifest line(s)")
            .count(),
        1,
        "{stderr}"
    );
    for noise in ["WARN", "INFO", "sov_guard", "sov_verify", "sovereign"] {
        assert!(!stderr.contains(noise), "unexpected {noise:?} in stderr: {stderr}");
    }
    assert!(!stderr.contains('\u{1b}'), "escape codes with --color never: {stderr}");
}

#[test]
fn test_missing_manifest_prints_hint() {
    let fixture = Fixture::new();
    fixture.write("weights.bin", b"abc");

    let output = fixture.run(&[]);
    let stdout = stdout(&output);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("  No CHECKSUMS.sha256 found in "));
    assert!(stdout.contains("  Generate one first:"));
    assert!(stdout.contains("shasum -a 256"));
    assert!(stdout.contains("| sort > CHECKSUMS.sha256"));
    assert!(stdout.contains("  or: verify --generate "));
}

#[test]
fn test_nonexistent_directory() {
    let fixture = Fixture::new();
    let missing = fixture.model_dir.path().join("nope");

    let output = fixture.run_on(&missing, &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Not found: "));
}

#[test]
fn test_json_report() {
    let fixture = Fixture::new();
    fixture.write("weights.bin", b"abc");
    fixture.manifest(&[(ABC_SHA256, "weights.bin")]);

    let output = fixture.run(&["--json"]);
    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON report");
    assert_eq!(report["success"], true);
    assert_eq!(report["summary"]["passed"], 1);
    assert_eq!(report["entries"][0]["path"], "weights.bin");
    assert_eq!(report["entries"][0]["outcome"]["status"], "passed");
}

#[test]
fn test_generate_then_verify() {
    let fixture = Fixture::new();
    fixture.write("model.safetensors", b"tensor bytes");
    fixture.write("config.json", b"{}");
    fixture.write("README.md", b"not hashed");

    let output = fixture.run(&["--generate"]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    assert!(stdout(&output).contains("Wrote 2 entries"));

    let manifest = std::fs::read_to_string(fixture.model_dir.path().join("CHECKSUMS.sha256"))
        .expect("manifest written");
    assert!(manifest.contains("model.safetensors"));
    assert!(!manifest.contains("README.md"));

    let output = fixture.run(&[]);
    let stdout = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "{stdout}");
    assert!(stdout.contains("  Passed: 2  Failed: 0  Missing: 0"));
}
