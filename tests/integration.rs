//! End-to-end integration tests for the regress CLI
//!
//! These tests:
//! 1. Lay out a scenario directory with scripts and sidecar files
//! 2. Run the regress binary against it, using `sh` as the program under test
//! 3. Verify the exit status, console report, JUnit file and artifacts

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

/// Test context with paths and cleanup
struct TestContext {
    /// Temporary directory for this test, removed on drop
    temp_dir: tempfile::TempDir,
    /// Path to the regress binary
    regress_bin: PathBuf,
    /// Scenario directory
    suite_dir: PathBuf,
    /// Config directory (XDG_CONFIG_HOME), empty unless a test writes one
    config_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let suite_dir = temp_dir.path().join("suite");
        let config_dir = temp_dir.path().join("config");
        fs::create_dir_all(&suite_dir).expect("Failed to create suite dir");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            regress_bin: PathBuf::from(env!("CARGO_BIN_EXE_regress")),
            suite_dir,
            config_dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Add a scenario script with optional sidecars, e.g. `("stdout", "hi\n")`
    fn scenario(&self, name: &str, script: &str, sidecars: &[(&str, &str)]) -> &Self {
        fs::write(self.suite_dir.join(format!("{}.bf", name)), script)
            .expect("Failed to write script");
        for (ext, contents) in sidecars {
            fs::write(self.suite_dir.join(format!("{}.{}", name, ext)), contents)
                .expect("Failed to write sidecar");
        }
        self
    }

    /// Run regress against the suite directory with `sh` as the subject
    fn run_regress(&self, args: &[&str]) -> RegressOutput {
        let output = Command::new(&self.regress_bin)
            .args(["--exe", "sh", "--no-color"])
            .args(args)
            .arg(&self.suite_dir)
            .env("XDG_CONFIG_HOME", &self.config_dir)
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run regress");

        RegressOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            code: output.status.code(),
        }
    }
}

/// Output from a regress invocation
#[derive(Debug)]
struct RegressOutput {
    stdout: String,
    stderr: String,
    code: Option<i32>,
}

impl RegressOutput {
    fn assert_code(&self, code: i32) -> &Self {
        assert_eq!(
            self.code,
            Some(code),
            "unexpected exit status\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    fn assert_stdout_contains(&self, needle: &str) -> &Self {
        assert!(
            self.stdout.contains(needle),
            "stdout does not contain {:?}:\n{}",
            needle,
            self.stdout
        );
        self
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

#[test]
fn test_echo_scenario_passes() {
    let ctx = TestContext::new();
    ctx.scenario("hello", "echo hi\n", &[("stdout", "hi\n")]);

    ctx.run_regress(&[])
        .assert_code(0)
        .assert_stdout_contains("Running 1 regression tests...")
        .assert_stdout_contains("[1/1] hello")
        .assert_stdout_contains("Ran 1 tests. 1 ok, 0 failed, 1 total");
}

#[test]
fn test_output_mismatch_fails_with_diff() {
    let ctx = TestContext::new();
    ctx.scenario("hello", "echo hi\n", &[("stdout", "bye\n")]);

    let output = ctx.run_regress(&[]);
    output
        .assert_code(1)
        .assert_stdout_contains("FAILED: sh ")
        .assert_stdout_contains("Output did not match expected output")
        .assert_stdout_contains("Ran 1 tests. 0 ok, 1 failed, 1 total");

    let diff: Vec<&str> = output
        .stdout
        .lines()
        .skip_while(|line| *line != "DIFF:")
        .skip(1)
        .take(2)
        .collect();
    assert_eq!(diff, vec!["-bye", "+hi"]);
}

#[test]
fn test_args_stdin_and_exit_code() {
    let ctx = TestContext::new();
    ctx.scenario(
        "full",
        "printf '%s,' \"$@\"; cat; echo warn >&2; exit 4\n",
        &[
            ("args", "one 'two words'\n"),
            ("stdin", "input"),
            ("stdout", "one,two words,input"),
            ("stderr", "warn\n"),
            ("exitcode", "4\n"),
        ],
    );

    ctx.run_regress(&[]).assert_code(0);
}

#[test]
fn test_exit_code_mismatch() {
    let ctx = TestContext::new();
    ctx.scenario("code", "exit 3\n", &[("exitcode", "0")]);
    ctx.scenario("crash", "exit 2\n", &[]);

    ctx.run_regress(&["--ignore-failures"])
        .assert_code(1)
        .assert_stdout_contains("Expected exit code 0 but was 3")
        .assert_stdout_contains("Expected successful exit code but was 2");
}

#[test]
fn test_stops_after_first_failure() {
    let ctx = TestContext::new();
    ctx.scenario("a_pass", "echo a\n", &[("stdout", "a\n")]);
    ctx.scenario("b_fail", "echo b\n", &[("stdout", "nope\n")]);
    ctx.scenario("c_pass", "echo c\n", &[("stdout", "c\n")]);

    let output = ctx.run_regress(&[]);
    output
        .assert_code(1)
        .assert_stdout_contains("[2/3] b_fail")
        .assert_stdout_contains("Ran 2 tests. 1 ok, 1 failed, 3 total");
    assert!(!output.stdout.contains("c_pass"), "{}", output.stdout);
}

#[test]
fn test_ignore_failures_runs_everything() {
    let ctx = TestContext::new();
    ctx.scenario("a_pass", "echo a\n", &[("stdout", "a\n")]);
    ctx.scenario("b_fail", "echo b\n", &[("stdout", "nope\n")]);
    ctx.scenario("c_pass", "echo c\n", &[("stdout", "c\n")]);

    ctx.run_regress(&["--ignore-failures"])
        .assert_code(1)
        .assert_stdout_contains("[3/3] c_pass")
        .assert_stdout_contains("Ran 3 tests. 2 ok, 1 failed, 3 total");
}

#[test]
fn test_timeout_is_reported() {
    let ctx = TestContext::new();
    ctx.scenario("hang", "exec sleep 30\n", &[]);

    ctx.run_regress(&["--timeout", "1"])
        .assert_code(1)
        .assert_stdout_contains("Timed out after 1 seconds");
}

#[test]
fn test_missing_test_dir_is_an_error() {
    let ctx = TestContext::new();
    let missing = ctx.path("missing");

    let output = ctx.run_regress(&[missing.to_str().unwrap()]);
    output.assert_code(2);
    assert!(output.stderr.contains("Error:"), "{}", output.stderr);
    assert!(output.stderr.contains("missing"), "{}", output.stderr);
}

#[test]
fn test_non_executable_program_is_an_error() {
    let ctx = TestContext::new();
    ctx.scenario("hello", "echo hi\n", &[]);
    let plain = ctx.path("plain.txt");
    fs::write(&plain, "not a program").unwrap();

    let output = Command::new(&ctx.regress_bin)
        .arg("--exe")
        .arg(&plain)
        .arg(&ctx.suite_dir)
        .env("XDG_CONFIG_HOME", &ctx.config_dir)
        .output()
        .expect("Failed to run regress");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not an executable"), "{}", stderr);
}

#[test]
fn test_bare_program_name_from_working_directory() {
    use std::os::unix::fs::PermissionsExt;

    let ctx = TestContext::new();
    ctx.scenario("hello", "echo hi\n", &[("stdout", "hi\n")]);
    let subject = ctx.path("local-interp");
    fs::write(&subject, "#!/bin/sh\nexec sh \"$@\"\n").unwrap();
    fs::set_permissions(&subject, fs::Permissions::from_mode(0o755)).unwrap();

    let output = Command::new(&ctx.regress_bin)
        .args(["--exe", "local-interp", "--no-color"])
        .arg(&ctx.suite_dir)
        .current_dir(ctx.temp_dir.path())
        .env("XDG_CONFIG_HOME", &ctx.config_dir)
        .output()
        .expect("Failed to run regress");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        output.status.code(),
        Some(0),
        "stdout: {}\nstderr: {}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Ran 1 tests. 1 ok, 0 failed, 1 total"), "{}", stdout);
}

#[test]
fn test_background_process_output_is_kept() {
    let ctx = TestContext::new();
    ctx.scenario("bg", "echo hi; sleep 30 &\n", &[("stdout", "hi\n")]);

    ctx.run_regress(&["--timeout", "0"])
        .assert_code(0)
        .assert_stdout_contains("Ran 1 tests. 1 ok, 0 failed, 1 total");
}

#[test]
fn test_junit_report_written() {
    let ctx = TestContext::new();
    ctx.scenario("a_pass", "echo a\n", &[("stdout", "a\n")]);
    ctx.scenario("b_fail", "echo b\n", &[("stdout", "nope\n")]);
    let report = ctx.path("reports/junit.xml");

    ctx.run_regress(&["--ignore-failures", "--junit", report.to_str().unwrap()])
        .assert_code(1);

    let xml = read(&report);
    assert!(xml.contains("tests=\"2\""), "{}", xml);
    assert!(xml.contains("failures=\"1\""), "{}", xml);
    assert!(xml.contains("name=\"a_pass\""), "{}", xml);
    assert!(xml.contains("classname=\"suite\""), "{}", xml);
    assert!(xml.contains("<failure"), "{}", xml);
}

#[test]
fn test_outdir_receives_failure_artifacts() {
    let ctx = TestContext::new();
    ctx.scenario("a_pass", "echo a\n", &[("stdout", "a\n")]);
    ctx.scenario("b_fail", "echo hi; echo err >&2; exit 1\n", &[("stdout", "bye\n")]);
    let outdir = ctx.path("failures");

    fs::create_dir_all(ctx.config_dir.join("regress")).unwrap();
    fs::write(
        ctx.config_dir.join("regress").join("config.toml"),
        "[output]\nexit_code_format = \"text\"\n",
    )
    .unwrap();

    ctx.run_regress(&["--ignore-failures", "-o", outdir.to_str().unwrap()])
        .assert_code(1);

    assert_eq!(read(&outdir.join("b_fail.stdout")), "hi\n");
    assert_eq!(read(&outdir.join("b_fail.stderr")), "err\n");
    assert_eq!(read(&outdir.join("b_fail.exitcode")), "1\n");
    assert!(!outdir.join("a_pass.stdout").exists());
}

#[test]
fn test_explicit_config_file() {
    let ctx = TestContext::new();
    fs::write(ctx.suite_dir.join("hello.sh"), "echo hi\n").unwrap();
    fs::write(ctx.suite_dir.join("hello.stdout"), "hi\n").unwrap();
    let config = ctx.path("regress.toml");
    fs::write(&config, "[runner]\nscript_extension = \"sh\"\n").unwrap();

    ctx.run_regress(&["--config", config.to_str().unwrap()])
        .assert_code(0)
        .assert_stdout_contains("Ran 1 tests. 1 ok, 0 failed, 1 total");

    let missing = ctx.path("missing.toml");
    ctx.run_regress(&["--config", missing.to_str().unwrap()])
        .assert_code(2);
}

#[test]
fn test_list_does_not_run() {
    let ctx = TestContext::new();
    let marker = ctx.path("ran");
    ctx.scenario(
        "hello",
        &format!("touch '{}'\n", marker.display()),
        &[("args", "x y"), ("stdout", "hi\n")],
    );

    ctx.run_regress(&["--list"])
        .assert_code(0)
        .assert_stdout_contains("Found 1 regression tests")
        .assert_stdout_contains("hello (args: 2) expects stdout");
    assert!(!marker.exists());
}

#[test]
fn test_empty_suite_passes() {
    let ctx = TestContext::new();

    ctx.run_regress(&[])
        .assert_code(0)
        .assert_stdout_contains("Ran 0 tests. 0 ok, 0 failed, 0 total");
}
