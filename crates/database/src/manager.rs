/// Registry of open repository databases, one pool per repository path.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use {
    sqlx::SqlitePool,
    tokio::sync::RwLock,
    tracing::{debug, info},
};

use crate::{config::DatabaseConfig, error::Result, repo::open_repo_db};

/// Owns at most one live [`SqlitePool`] per repository path.
///
/// Paths are used as given; `repo` and `repo/` or a symlinked alias are
/// distinct keys. Callers close a repository's pool before an external sync
/// rewrites its database file and reopen it afterwards.
pub struct DatabaseManager {
    config: DatabaseConfig,
    handles: RwLock<HashMap<PathBuf, SqlitePool>>,
    opened: AtomicU64,
}

impl Default for DatabaseManager {
    fn default() -> Self {
        Self::new(DatabaseConfig::default())
    }
}

impl DatabaseManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            handles: RwLock::new(HashMap::new()),
            opened: AtomicU64::new(0),
        }
    }

    /// Return the live pool for `repo`, opening and registering it if needed.
    ///
    /// Concurrent callers for the same path share one open: the fast path is a
    /// read-locked lookup, and the open itself happens under the write lock
    /// after a second lookup.
    pub async fn get_handle(&self, repo: impl AsRef<Path>) -> Result<SqlitePool> {
        let repo = repo.as_ref();
        if let Some(pool) = self.handles.read().await.get(repo) {
            return Ok(pool.clone());
        }

        let mut handles = self.handles.write().await;
        if let Some(pool) = handles.get(repo) {
            debug!(repo = %repo.display(), "database opened by a concurrent caller");
            return Ok(pool.clone());
        }

        let pool = open_repo_db(repo, &self.config).await?;
        self.opened.fetch_add(1, Ordering::Relaxed);
        handles.insert(repo.to_path_buf(), pool.clone());
        info!(repo = %repo.display(), open = handles.len(), "opened repository database");
        Ok(pool)
    }

    /// Close and unregister the pool for `repo`. Returns `false` if none was open.
    ///
    /// The entry is removed first and the pool closed while the write lock is
    /// held, so no caller can obtain it mid-close and no replacement is opened
    /// until the file is released. Closing waits for checked-out connections
    /// to be returned.
    pub async fn close_handle(&self, repo: impl AsRef<Path>) -> bool {
        let repo = repo.as_ref();
        let mut handles = self.handles.write().await;
        let Some(pool) = handles.remove(repo) else {
            return false;
        };
        // The write lock stays held until every checked-out connection has
        // been returned, so no reopen can race the file being released.
        // Registry calls for other repositories wait meanwhile.
        pool.close().await;
        info!(repo = %repo.display(), "closed repository database");
        true
    }

    /// Close then reopen, so the returned pool reads the file as it is now
    /// (e.g. after a sync replaced it).
    pub async fn reopen_handle(&self, repo: impl AsRef<Path>) -> Result<SqlitePool> {
        let repo = repo.as_ref();
        self.close_handle(repo).await;
        self.get_handle(repo).await
    }

    /// Close every registered pool. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let mut handles = self.handles.write().await;
        let count = handles.len();
        for (repo, pool) in handles.drain() {
            pool.close().await;
            debug!(repo = %repo.display(), "closed repository database");
        }
        if count > 0 {
            info!(count, "closed all repository databases");
        }
        count
    }

    pub async fn is_open(&self, repo: impl AsRef<Path>) -> bool {
        self.handles.read().await.contains_key(repo.as_ref())
    }

    pub async fn open_count(&self) -> usize {
        self.handles.read().await.len()
    }

    /// Pools opened over the manager's lifetime, including reopens.
    pub fn opened_total(&self) -> u64 {
        self.opened.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}
