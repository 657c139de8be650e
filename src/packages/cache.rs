//! Installed-package cache, one per name-based backend
//!
//! The cache holds a full snapshot of installed package names. A refresh
//! replaces the snapshot wholesale; entries never expire individually.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::exec::{CancelToken, CommandRunner};
use crate::packages::{error::CacheRefreshError, Backend};

#[derive(Debug, Default)]
struct Snapshot {
    names: HashSet<String>,
    refreshed_at: Option<Instant>,
}

#[derive(Debug)]
pub struct InstalledCache {
    backend: Backend,
    ttl: Duration,
    snapshot: RwLock<Snapshot>,
    // Held for the whole list-installed run so concurrent callers that find
    // the cache stale wait for one refresh instead of issuing their own.
    refresh_lock: Mutex<()>,
}

impl InstalledCache {
    pub fn new(backend: Backend, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            snapshot: RwLock::new(Snapshot::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the snapshot is younger than the TTL. An empty cache that was
    /// never refreshed is stale.
    pub fn is_fresh(&self) -> bool {
        self.read()
            .refreshed_at
            .is_some_and(|at| at.elapsed() < self.ttl)
    }

    pub fn refreshed_at(&self) -> Option<Instant> {
        self.read().refreshed_at
    }

    /// Set membership against the current snapshot. Never refreshes.
    pub fn contains(&self, name: &str) -> bool {
        self.read().names.contains(name)
    }

    pub fn snapshot(&self) -> HashSet<String> {
        self.read().names.clone()
    }

    /// Replace the contents as if a refresh had just completed.
    pub fn seed<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_at(names, Instant::now());
    }

    /// Replace the contents with an explicit refresh time.
    pub fn seed_at<I, S>(&self, names: I, refreshed_at: Instant)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut snapshot = self.write();
        snapshot.names = names.into_iter().map(Into::into).collect();
        snapshot.refreshed_at = Some(refreshed_at);
    }

    /// Mark the snapshot stale so the next `ensure_fresh` re-lists.
    pub fn invalidate(&self) {
        self.write().refreshed_at = None;
    }

    /// Re-run the backend's list-installed command if the snapshot is stale.
    ///
    /// On failure the previous snapshot and its timestamp are kept.
    pub async fn ensure_fresh(
        &self,
        runner: &dyn CommandRunner,
        cancel: &CancelToken,
    ) -> Result<(), CacheRefreshError> {
        if self.is_fresh() {
            debug!("{} installed cache is fresh", self.backend);
            return Ok(());
        }

        let _refresh = self.refresh_lock.lock().await;
        if self.is_fresh() {
            debug!("{} installed cache refreshed by another caller", self.backend);
            return Ok(());
        }

        let list = self
            .backend
            .descriptor()
            .list_installed
            .ok_or(CacheRefreshError::Unsupported {
                backend: self.backend,
            })?;

        let command = list.command();
        let output = runner.run(cancel, &command).await.map_err(|source| {
            warn!(
                "Failed to refresh {} installed cache, keeping previous contents: {}",
                self.backend, source
            );
            CacheRefreshError::CommandFailed {
                backend: self.backend,
                source,
            }
        })?;

        let names = (list.parse)(&output.stdout_lossy());
        let count = names.len();
        {
            let mut snapshot = self.write();
            snapshot.names = names;
            snapshot.refreshed_at = Some(Instant::now());
        }

        info!(
            "Refreshed {} installed cache: {} packages",
            self.backend, count
        );
        Ok(())
    }

    // A panic while holding the lock cannot leave a half-written snapshot:
    // both fields are assigned from fully built values.
    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The installed caches for every name-based backend
#[derive(Debug)]
pub struct InstalledCaches {
    apt: InstalledCache,
    googet: InstalledCache,
    yum: InstalledCache,
    zypper: InstalledCache,
}

impl InstalledCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            apt: InstalledCache::new(Backend::Apt, ttl),
            googet: InstalledCache::new(Backend::GooGet, ttl),
            yum: InstalledCache::new(Backend::Yum, ttl),
            zypper: InstalledCache::new(Backend::Zypper, ttl),
        }
    }

    /// `None` for source-based backends
    pub fn get(&self, backend: Backend) -> Option<&InstalledCache> {
        match backend {
            Backend::Apt => Some(&self.apt),
            Backend::GooGet => Some(&self.googet),
            Backend::Yum => Some(&self.yum),
            Backend::Zypper => Some(&self.zypper),
            Backend::Deb | Backend::Msi | Backend::Rpm => None,
        }
    }
}
