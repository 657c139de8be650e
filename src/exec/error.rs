use thiserror::Error;

/// Errors returned by a [`CommandRunner`](super::CommandRunner)
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to launch `{command}`: {error}")]
    Spawn {
        command: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Command `{command}` exited with {}: {stderr}", exit_description(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command `{command}` was cancelled")]
    Cancelled { command: String },
}

impl CommandError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled { .. })
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
