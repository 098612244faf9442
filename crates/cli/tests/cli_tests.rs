// Integration tests for the `scriptedit` binary.
// Run with: cargo test -p scriptedit-cli --test cli_tests

use std::path::Path;
use std::process::{Command, Output, Stdio};

use httpmock::prelude::*;

/// Binary with config/auth redirected into `home`.
fn scriptedit(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scriptedit"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join(".config"));
    // Clear env to avoid leaking a real token into tests
    cmd.env_remove("SCRIPTEDIT_TOKEN");
    cmd.env_remove("SCRIPTEDIT_API_BASE");
    cmd.env_remove("RUST_LOG");
    cmd.stdin(Stdio::null());
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    scriptedit(home).args(args).output().expect("failed to run scriptedit")
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {}, got {:?}\nstderr: {}",
        code,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn show_without_login_exits_40() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["show", "1"]);

    assert_exit(&output, 40);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not authenticated"), "stderr: {}", stderr);
    assert!(stderr.contains("scriptedit login"), "stderr: {}", stderr);
}

#[test]
fn edit_without_login_exits_40() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["edit", "1", "--name", "hello.sh"]);
    assert_exit(&output, 40);
}

#[test]
fn non_numeric_id_exits_2() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["show", "abc"]);

    assert_exit(&output, 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid script id"), "stderr: {}", stderr);
}

#[test]
fn edit_requires_name() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["edit", "1"]);
    assert_exit(&output, 2);
}

#[test]
fn login_without_api_base_exits_2() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["login", "--token", "tok"]);

    assert_exit(&output, 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No API base URL"), "stderr: {}", stderr);
}

#[test]
fn login_without_token_on_non_tty_exits_2() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["login", "--api-base", "http://127.0.0.1:9"]);

    assert_exit(&output, 2);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SCRIPTEDIT_TOKEN"), "stderr: {}", stderr);
}

#[test]
fn login_then_show_prints_script() {
    let server = MockServer::start();
    let download = server.mock(|when, then| {
        when.method(GET)
            .path("/api/latest/fleet/scripts/12")
            .query_param("alt", "media")
            .header("authorization", "Bearer tok-123");
        then.status(200).body("#!/bin/sh\necho hi\n");
    });

    let home = tempfile::tempdir().unwrap();
    let output = scriptedit(home.path())
        .args(["login", "--api-base", &server.base_url()])
        .env("SCRIPTEDIT_TOKEN", "tok-123")
        .output()
        .expect("failed to run scriptedit");
    assert_exit(&output, 0);

    let output = run(home.path(), &["show", "12"]);
    assert_exit(&output, 0);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "#!/bin/sh\necho hi\n");
    download.assert();

    let output = run(home.path(), &["logout"]);
    assert_exit(&output, 0);
    let output = run(home.path(), &["show", "12"]);
    assert_exit(&output, 40);
}

#[test]
fn show_missing_script_exits_42() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/latest/fleet/scripts/99");
        then.status(404).json_body(serde_json::json!({ "message": "Resource Not Found" }));
    });

    let home = tempfile::tempdir().unwrap();
    let login = run(home.path(), &["login", "--token", "tok", "--api-base", &server.base_url()]);
    assert_exit(&login, 0);

    let output = run(home.path(), &["show", "99"]);
    assert_exit(&output, 42);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Script 99 not found"), "stderr: {}", stderr);
}

#[test]
fn config_path_is_under_config_dir() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["config-path"]);

    assert_exit(&output, 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().ends_with("settings.json"), "stdout: {}", stdout);
    assert!(stdout.contains("scriptedit"), "stdout: {}", stdout);
}
