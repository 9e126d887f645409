use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

fn overaudit_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_overaudit"));
    cmd.arg("--dir").arg(dir);
    cmd.env_remove("OVERAUDIT_CONFIG");
    cmd.env_remove("OVERAUDIT_REGISTRY_BASE_URL");
    cmd.env_remove("OVERAUDIT_MANIFEST");
    cmd.env_remove("OVERAUDIT_WORKSPACE");
    cmd.env_remove("GITHUB_OUTPUT");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    overaudit_cmd(dir).args(args).output().expect("run overaudit")
}

fn make_temp_dir() -> PathBuf {
    static DIR_SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "overaudit-exit-test-{}-{seq}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create dir");
    dir
}

#[test]
fn strip_without_manifest_exits_10() {
    let dir = make_temp_dir();
    let out = run(&dir, &["strip"]);
    assert_eq!(out.status.code(), Some(10));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to read manifest"), "stderr={stderr}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn strip_with_malformed_manifest_exits_10() {
    let dir = make_temp_dir();
    std::fs::write(dir.join("package.json"), b"{not json").expect("write");
    let out = run(&dir, &["strip"]);
    assert_eq!(out.status.code(), Some(10));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn diff_without_output_channel_exits_2() {
    let dir = make_temp_dir();
    let out = run(&dir, &["diff"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no decision channel"), "stderr={stderr}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn completion_unknown_shell_exits_2() {
    let dir = make_temp_dir();
    let out = run(&dir, &["completion", "nope"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_config_file_exits_2() {
    let dir = make_temp_dir();
    let config = dir.join("overaudit.toml");
    std::fs::write(&config, b"[paths\nmanifest=").expect("write");
    let out = overaudit_cmd(&dir)
        .args(["--config"])
        .arg(&config)
        .arg("strip")
        .output()
        .expect("run overaudit");
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&dir);
}
