//! プロセス終了コードのテスト
//!
//! ビルド済みバイナリを起動し、標準入力の状態と設定に応じた
//! 終了コードと標準出力を確認する

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::tempdir;

const CONFIG_VARS: &[&str] = &[
    "DEBUG",
    "OPENAI_API_KEY",
    "MODEL",
    "NEW_PATH",
    "OPENAI_API_BASE",
    "RUST_LOG",
];

/// 環境変数を切り離してホストを起動し、stdin に `input` を流して終了を待つ
fn run_host(home: &Path, envs: &[(&str, &str)], input: &[u8]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_pap-analysis"));
    for key in CONFIG_VARS {
        command.env_remove(key);
    }
    command
        .env("HOME", home)
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().expect("ホストを起動できません");
    {
        let mut stdin = child.stdin.take().unwrap();
        // 設定エラーで先に終了した場合は書き込みが失敗しうる
        let _ = stdin.write_all(input);
    }
    child.wait_with_output().unwrap()
}

/// 入力がすぐ閉じた場合は正常終了
#[test]
fn test_closed_input_exits_successfully() {
    let home = tempdir().expect("Failed to create temp dir");
    let archive = tempdir().expect("Failed to create temp dir");
    let new_path = archive.path().to_str().unwrap();

    let output = run_host(
        home.path(),
        &[("OPENAI_API_KEY", "sk-test"), ("NEW_PATH", new_path)],
        b"",
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
}

/// ヘッダの途中で切れた入力（プロトコルエラー）でも正常終了し、何も出力しない
#[test]
fn test_truncated_frame_exits_successfully() {
    let home = tempdir().expect("Failed to create temp dir");
    let archive = tempdir().expect("Failed to create temp dir");
    let new_path = archive.path().to_str().unwrap();

    let output = run_host(
        home.path(),
        &[("OPENAI_API_KEY", "sk-test"), ("NEW_PATH", new_path)],
        &[0x10, 0x00],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
}

/// 本文の途中で切れた入力でも正常終了
#[test]
fn test_truncated_body_exits_successfully() {
    let home = tempdir().expect("Failed to create temp dir");
    let archive = tempdir().expect("Failed to create temp dir");
    let new_path = archive.path().to_str().unwrap();

    let mut input = 40u32.to_le_bytes().to_vec();
    input.extend_from_slice(br#"{"action": "extract-"#);

    let output = run_host(
        home.path(),
        &[("OPENAI_API_KEY", "sk-test"), ("NEW_PATH", new_path)],
        &input,
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

/// NEW_PATH がなければループに入らず失敗終了
#[test]
fn test_missing_new_path_fails_before_loop() {
    let home = tempdir().expect("Failed to create temp dir");

    let output = run_host(home.path(), &[("OPENAI_API_KEY", "sk-test")], b"");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

/// 不正な DEBUG 値も起動時の設定エラー
#[test]
fn test_invalid_debug_flag_fails_before_loop() {
    let home = tempdir().expect("Failed to create temp dir");
    let archive = tempdir().expect("Failed to create temp dir");
    let new_path = archive.path().to_str().unwrap();

    let output = run_host(
        home.path(),
        &[
            ("OPENAI_API_KEY", "sk-test"),
            ("NEW_PATH", new_path),
            ("DEBUG", "peut-être"),
        ],
        b"",
    );

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
