use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use wait_timeout::ChildExt;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_command(
    cmd: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut child = Command::new(cmd)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn process: {cmd}"))?;

    let status = match child
        .wait_timeout(timeout)
        .with_context(|| format!("failed to wait for process: {cmd}"))?
    {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!("timed out after {timeout:?}: {cmd}"));
        }
    };

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        let _ = out.read_to_string(&mut stdout);
    }
    let mut stderr = String::new();
    if let Some(mut err) = child.stderr.take() {
        let _ = err.read_to_string(&mut stderr);
    }

    Ok(CommandOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout,
        stderr,
    })
}

/// Paths with unstaged changes, per `git diff --name-only`.
pub fn changed_files(root: &Path, timeout: Duration) -> Result<Vec<String>> {
    git_name_only(root, &["diff", "--name-only"], timeout)
}

/// Paths with staged changes, per `git diff --cached --name-only`.
pub fn staged_files(root: &Path, timeout: Duration) -> Result<Vec<String>> {
    git_name_only(root, &["diff", "--cached", "--name-only"], timeout)
}

fn git_name_only(root: &Path, args: &[&str], timeout: Duration) -> Result<Vec<String>> {
    let output = run_command("git", args, root, timeout)?;
    if output.exit_code != 0 {
        let stderr = output.stderr.trim();
        return Err(anyhow!(
            "git {} failed (exit_code={}): {stderr}",
            args.join(" "),
            output.exit_code
        ));
    }
    Ok(parse_name_only(&output.stdout))
}

fn parse_name_only(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
