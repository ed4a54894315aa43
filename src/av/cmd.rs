//! External process execution.
//!
//! Commands are single shell-interpretable strings (the shell handles
//! quoting and globs), with stderr merged into stdout line by line in
//! arrival order. Output is drained concurrently while the process runs,
//! and the exit status is only awaited once both streams are exhausted,
//! so a chatty tool can never deadlock on a full pipe.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::error::AppError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` through the host shell and return its merged output.
    /// `timeout` bounds the whole invocation; `None` waits forever.
    async fn run(&self, command: &str, timeout: Option<Duration>) -> Result<String, AppError>;
}

/// Runner backed by the platform shell (`/bin/sh -c` or `cmd.exe /C`).
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, timeout: Option<Duration>) -> Result<String, AppError> {
        if command.trim().is_empty() {
            return Err(AppError::InvalidCommand);
        }

        tracing::info!(command, "executing");

        let mut child = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(AppError::Launch)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::Launch(std::io::Error::other("stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::Launch(std::io::Error::other("stderr not captured")))?;

        let drain = async {
            let mut out_lines = BufReader::new(stdout).lines();
            let mut err_lines = BufReader::new(stderr).lines();
            let mut output = String::new();
            let mut out_done = false;
            let mut err_done = false;

            while !out_done || !err_done {
                tokio::select! {
                    line = out_lines.next_line(), if !out_done => match line? {
                        Some(line) => {
                            output.push_str(&line);
                            output.push('\n');
                        }
                        None => out_done = true,
                    },
                    line = err_lines.next_line(), if !err_done => match line? {
                        Some(line) => {
                            output.push_str(&line);
                            output.push('\n');
                        }
                        None => err_done = true,
                    },
                }
            }

            let status = child.wait().await?;
            Ok::<_, AppError>((status, output))
        };

        // The drained result is bound first so the borrow on `child` ends
        // before the timeout branch kills it.
        let drained = match timeout {
            Some(limit) => tokio::time::timeout(limit, drain).await.ok(),
            None => Some(drain.await),
        };

        let (status, output) = match drained {
            Some(result) => result?,
            None => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                return Err(AppError::CommandTimeout {
                    command: command.to_string(),
                });
            }
        };

        tracing::debug!(command, %output, "command finished");

        if !status.success() {
            return Err(AppError::CommandFailed {
                code: status.code().unwrap_or(-1),
                command: command.to_string(),
            });
        }

        Ok(output)
    }
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd.exe");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}
