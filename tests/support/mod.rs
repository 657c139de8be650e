//! Shared test helpers: a scripted command runner and context builders

#![allow(dead_code)]

use async_trait::async_trait;
use rustle_pkg::exec::{CancelToken, CommandError, CommandOutput, CommandRunner, CommandSpec};
use rustle_pkg::{ReconcileConfig, ReconcileContext};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every command and replays queued results in order. With an empty
/// queue every command succeeds with no output.
#[derive(Default)]
pub struct MockRunner {
    calls: Mutex<Vec<CommandSpec>>,
    responses: Mutex<VecDeque<Result<CommandOutput, CommandError>>>,
    delay: Option<Duration>,
}

impl MockRunner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn push_stdout(&self, stdout: &str) {
        self.responses.lock().unwrap().push_back(Ok(CommandOutput {
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        }));
    }

    pub fn push_failure(&self, code: i32, stderr: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(CommandError::Failed {
                command: "scripted".to_string(),
                code: Some(code),
                stderr: stderr.to_string(),
            }));
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        cancel: &CancelToken,
        spec: &CommandSpec,
    ) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(spec.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if cancel.is_cancelled() {
            return Err(CommandError::Cancelled {
                command: spec.to_string(),
            });
        }

        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(CommandOutput::default()))
    }
}

pub fn context(runner: Arc<MockRunner>) -> ReconcileContext {
    context_with_config(runner, ReconcileConfig::default())
}

pub fn context_with_ttl(runner: Arc<MockRunner>, ttl: Duration) -> ReconcileContext {
    let config = ReconcileConfig {
        cache_ttl: ttl,
        ..ReconcileConfig::default()
    };
    context_with_config(runner, config)
}

/// Context whose HTTP client honours `config` but bypasses any system proxy,
/// so loopback servers are reachable.
pub fn context_with_config(runner: Arc<MockRunner>, config: ReconcileConfig) -> ReconcileContext {
    let http = ReconcileContext::http_client_builder(&config)
        .no_proxy()
        .build()
        .unwrap();
    ReconcileContext::new(config, runner)
        .unwrap()
        .with_http_client(http)
}

pub fn argv(spec: &CommandSpec) -> Vec<String> {
    spec.argv().into_iter().map(str::to_string).collect()
}

pub fn env(spec: &CommandSpec) -> Vec<(String, String)> {
    spec.env.clone()
}
