//! Process runner trait and the tokio-backed implementation

use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::exec::{cancel::CancelToken, error::CommandError};

/// A fully resolved invocation: program, arguments and environment overrides.
///
/// Overrides are applied on top of the inherited process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
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

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// The argv as a single vector, program first.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={value} ")?;
        }
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion. A non-zero exit is an error.
    async fn run(
        &self,
        cancel: &CancelToken,
        spec: &CommandSpec,
    ) -> Result<CommandOutput, CommandError>;
}

/// Runs commands as child processes of the agent
#[derive(Debug, Clone, Default)]
pub struct TokioCommandRunner;

impl TokioCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(
        &self,
        cancel: &CancelToken,
        spec: &CommandSpec,
    ) -> Result<CommandOutput, CommandError> {
        let command = spec.to_string();
        if cancel.is_cancelled() {
            return Err(CommandError::Cancelled { command });
        }

        debug!("Running command: {}", command);

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|error| CommandError::Spawn {
            command: command.clone(),
            error,
        })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        let collected = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            collected = async {
                let (stdout, stderr) =
                    tokio::join!(read_pipe(stdout_pipe), read_pipe(stderr_pipe));
                (child.wait().await, stdout, stderr)
            } => Some(collected),
        };

        let Some((status, stdout, stderr)) = collected else {
            // kill() also waits, so the child is reaped before we return
            let _ = child.kill().await;
            debug!("Command cancelled: {}", command);
            return Err(CommandError::Cancelled { command });
        };

        let status = status.map_err(|error| CommandError::Spawn {
            command: command.clone(),
            error,
        })?;

        if !status.success() {
            let stderr_text = String::from_utf8_lossy(&stderr).trim().to_string();
            debug!("Command failed with status {}: {}", status, command);
            return Err(CommandError::Failed {
                command,
                code: status.code(),
                stderr: stderr_text,
            });
        }

        debug!("Command finished successfully: {}", command);
        Ok(CommandOutput { stdout, stderr })
    }
}

async fn read_pipe<R>(pipe: Option<R>) -> Vec<u8>
where
    R: tokio::io::AsyncRead + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        // A read error only truncates what we report; exit status still decides.
        let _ = pipe.read_to_end(&mut buffer).await;
    }
    buffer
}
