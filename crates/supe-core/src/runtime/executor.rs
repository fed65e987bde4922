//! Allow-listed, sequential execution of command plans
//!
//! The whole plan is tokenized and checked before the first process starts, so
//! a single blocked or malformed line means nothing runs at all.

use crate::error::{Error, Result};
use crate::plan::is_comment;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Programs a plan may invoke
pub const ALLOWED_EXECUTABLES: &[&str] = &["npx", "npm", "pnpm", "yarn", "bun", "bunx", "deno"];

/// Per-command timeout (15 minutes)
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// One plan line after tokenizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    Comment(String),
    ChangeDir(String),
    Run {
        command: String,
        program: String,
        args: Vec<String>,
    },
}

/// Tokenize and allow-list check every line of `plan`.
pub fn prepare_plan<S: AsRef<str>>(plan: &[S], allow_list: &[String]) -> Result<Vec<PlanStep>> {
    let mut steps = Vec::with_capacity(plan.len());
    for line in plan {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if is_comment(line) {
            steps.push(PlanStep::Comment(line.to_string()));
            continue;
        }

        let mut tokens = shell_words::split(line).map_err(|_| Error::MalformedCommand {
            command: line.to_string(),
        })?;
        if tokens.is_empty() {
            continue;
        }

        if tokens[0] == "cd" {
            steps.push(PlanStep::ChangeDir(tokens[1..].join(" ")));
            continue;
        }

        let program = tokens.remove(0);
        if !allow_list.iter().any(|allowed| *allowed == program) {
            return Err(Error::BlockedExecutable {
                executable: program,
                command: line.to_string(),
            });
        }
        steps.push(PlanStep::Run {
            command: line.to_string(),
            program,
            args: tokens,
        });
    }
    Ok(steps)
}

/// Outcome of a fully successful run
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub commands_run: Vec<String>,
    /// Tracked directory after the last step
    pub working_dir: PathBuf,
}

/// Runs plans one command at a time from a tracked working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeExecutor {
    allow_list: Vec<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
    stdout_to_stderr: bool,
}

impl Default for SafeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SafeExecutor {
    pub fn new() -> Self {
        Self {
            allow_list: ALLOWED_EXECUTABLES.iter().map(|s| s.to_string()).collect(),
            timeout: COMMAND_TIMEOUT,
            working_dir: None,
            stdout_to_stderr: false,
        }
    }

    /// Replace the allowed program names
    pub fn with_allow_list<I, S>(mut self, programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = programs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Start from `dir` instead of the process's current directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Send child stdout to our stderr, keeping our stdout free for JSON
    pub fn with_stdout_to_stderr(mut self) -> Self {
        self.stdout_to_stderr = true;
        self
    }

    fn child_stdout(&self) -> Stdio {
        if self.stdout_to_stderr {
            Stdio::from(std::io::stderr())
        } else {
            Stdio::inherit()
        }
    }

    /// Validate then run `plan`. The first failing command aborts the rest.
    pub async fn execute<S: AsRef<str>>(&self, plan: &[S]) -> Result<ExecutionReport> {
        let steps = prepare_plan(plan, &self.allow_list)?;

        let mut cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| Error::io(".", e))?,
        };
        let mut commands_run = Vec::new();

        for step in steps {
            match step {
                PlanStep::Comment(_) => {}
                PlanStep::ChangeDir(target) => {
                    cwd = cwd.join(target);
                    tracing::debug!(cwd = %cwd.display(), "changed tracked directory");
                }
                PlanStep::Run {
                    command,
                    program,
                    args,
                } => {
                    self.run_one(&command, &program, &args, &cwd).await?;
                    commands_run.push(command);
                }
            }
        }

        Ok(ExecutionReport {
            commands_run,
            working_dir: cwd,
        })
    }

    async fn run_one(&self, command: &str, program: &str, args: &[String], cwd: &Path) -> Result<()> {
        eprintln!("{} {}", "Running:".dimmed(), command.yellow());
        tracing::info!(command, cwd = %cwd.display(), "spawning plan command");

        let failed = |reason: String| Error::ScaffoldExecution {
            command: command.to_string(),
            reason,
        };

        // Resolves npm.cmd and friends on Windows
        let resolved = which::which(program).unwrap_or_else(|_| PathBuf::from(program));

        let mut child = TokioCommand::new(resolved)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(self.child_stdout())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(format!("failed to start in {}: {}", cwd.display(), e)))?;

        match timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(failed(match status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            })),
            Ok(Err(e)) => Err(failed(format!("failed to wait for process: {}", e))),
            Err(_) => {
                let _ = child.kill().await;
                tracing::warn!(command, timeout_secs = self.timeout.as_secs(), "command timed out");
                Err(failed(format!(
                    "timed out after {} seconds",
                    self.timeout.as_secs_f64()
                )))
            }
        }
    }
}
