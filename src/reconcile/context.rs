//! Shared state handed to every resource operation

use std::sync::Arc;

use crate::config::ReconcileConfig;
use crate::exec::{CancelToken, CommandRunner, TokioCommandRunner};
use crate::packages::InstalledCaches;

/// Runner, installed caches and configuration shared by concurrent resource
/// operations. Clones share the caches.
#[derive(Clone)]
pub struct ReconcileContext {
    runner: Arc<dyn CommandRunner>,
    caches: Arc<InstalledCaches>,
    config: Arc<ReconcileConfig>,
    http: reqwest::Client,
    cancel: CancelToken,
}

impl ReconcileContext {
    /// Fails only when the HTTP client cannot be built, for example when no
    /// TLS backend can be initialised.
    pub fn new(
        config: ReconcileConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, reqwest::Error> {
        let caches = Arc::new(InstalledCaches::new(config.cache_ttl));
        let http = Self::http_client_builder(&config).build()?;
        Ok(Self {
            runner,
            caches,
            config: Arc::new(config),
            http,
            cancel: CancelToken::new(),
        })
    }

    /// Context backed by real child processes
    pub fn system(config: ReconcileConfig) -> Result<Self, reqwest::Error> {
        Self::new(config, Arc::new(TokioCommandRunner::new()))
    }

    /// Client settings derived from `config`, for callers that build their
    /// own client with [`with_http_client`](Self::with_http_client).
    pub fn http_client_builder(config: &ReconcileConfig) -> reqwest::ClientBuilder {
        reqwest::Client::builder().timeout(config.download_timeout)
    }

    /// Replace the HTTP client used to fetch remote sources
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// A clone bound to a different cancellation token
    pub fn with_cancel(&self, cancel: CancelToken) -> Self {
        Self {
            cancel,
            ..self.clone()
        }
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn caches(&self) -> &InstalledCaches {
        &self.caches
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

impl std::fmt::Debug for ReconcileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileContext")
            .field("caches", &self.caches)
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
