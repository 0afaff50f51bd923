//! Type-safe Git command builder for consistent command execution
//!
//! This module provides a fluent API for building and executing Git commands,
//! so that every clone, checkout and repository query shares the same
//! logging, timeout and error mapping.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::{GIT_CLONE_TIMEOUT, GIT_COMMAND_TIMEOUT};
use crate::core::DiscoverError;
use crate::utils::platform::get_git_command;

/// Builder for a single git invocation.
///
/// # Examples
///
/// ```rust,no_run
/// use fmf_discover::git::command_builder::GitCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// let toplevel = GitCommand::show_toplevel()
///     .current_dir("/path/to/checkout")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GitCommand {
    args: Vec<String>,

    current_dir: Option<PathBuf>,

    timeout_duration: Option<Duration>,

    context: Option<String>,

    /// URL recorded by [`GitCommand::clone`] for error reporting
    clone_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            clone_url: None,
            current_dir: None,
            timeout_duration: Some(GIT_COMMAND_TIMEOUT),
            context: None,
        }
    }
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the command inside `dir` (passed to git as `-C <dir>`).
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Attach a label that prefixes every log line of this command.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Execute the command and capture its output.
    ///
    /// A non-zero exit is mapped to [`DiscoverError::GitCloneFailed`],
    /// [`DiscoverError::GitCheckoutFailed`] or [`DiscoverError::GitCommandError`]
    /// depending on the subcommand.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            // -C keeps git independent of the process working directory
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.clone());

        cmd.args(&full_args);
        // Never block on credential prompts
        cmd.env("GIT_TERMINAL_PROMPT", "0");

        let label = self.context.as_deref().map(|ctx| format!("({ctx}) ")).unwrap_or_default();
        tracing::debug!(
            target: "git",
            "{}Executing command: {} {}",
            label,
            git_command,
            full_args.join(" ")
        );

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let effective_args = skip_dir_args(&full_args);
        let operation = effective_args.first().cloned().unwrap_or_else(|| "unknown".to_string());

        let output_future = cmd.output();
        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result.context(format!("Failed to execute git {}", full_args.join(" ")))?
            } else {
                tracing::warn!(
                    target: "git",
                    "Command timed out after {} seconds: git {}",
                    duration.as_secs(),
                    full_args.join(" ")
                );
                return Err(DiscoverError::GitCommandError {
                    operation,
                    stderr: format!(
                        "Git command timed out after {} seconds. Try running the command manually: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    ),
                }
                .into());
            }
        } else {
            output_future.await.context(format!("Failed to execute git {}", full_args.join(" ")))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);

            tracing::debug!(
                target: "git",
                "{}Command failed with exit code: {:?}",
                label,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "{}Error: {}", label, stderr.trim());
            }

            let reason = if stderr.is_empty() {
                stdout.to_string()
            } else {
                stderr.to_string()
            };

            let error = match operation.as_str() {
                "clone" => DiscoverError::GitCloneFailed {
                    url: self.clone_url.unwrap_or_else(|| "unknown".to_string()),
                    reason,
                },
                "checkout" => DiscoverError::GitCheckoutFailed {
                    // The reference is the last argument (after an optional -f)
                    reference: effective_args.last().cloned().unwrap_or_default(),
                    reason,
                },
                _ => DiscoverError::GitCommandError {
                    operation,
                    stderr: reason,
                },
            };

            return Err(error.into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stdout.is_empty() {
            tracing::debug!(target: "git", "{}{}", label, stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "git", "{}{}", label, stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(target: "git::perf", "{}Git {} took {:.2}s", label, operation, elapsed.as_secs_f64());
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(target: "git::perf", "{}Git {} took {}ms", label, operation, elapsed.as_millis());
        }

        Ok(GitCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute and return trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute and discard the output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Arguments after a leading `-C <dir>` pair.
fn skip_dir_args(full_args: &[String]) -> &[String] {
    if full_args.first().is_some_and(|arg| arg == "-C") && full_args.len() > 2 {
        &full_args[2..]
    } else {
        full_args
    }
}

/// Captured output of a successful git command.
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

// Convenience builders for the operations discovery needs

impl GitCommand {
    /// `git clone -- <url> <target>`; the url is never read as an option.
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        let mut cmd = Self::new()
            .args(["clone", "--", url])
            .arg(target.as_ref().display().to_string())
            .with_timeout(Some(GIT_CLONE_TIMEOUT));
        cmd.clone_url = Some(url.to_string());
        cmd
    }

    /// `git checkout <ref>`
    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", ref_name])
    }

    /// `git checkout -f <ref>`, discarding local modifications.
    pub fn checkout_forced(ref_name: &str) -> Self {
        Self::new().args(["checkout", "-f", ref_name])
    }

    /// `git rev-parse --show-toplevel`
    pub fn show_toplevel() -> Self {
        Self::new().args(["rev-parse", "--show-toplevel"])
    }
}
