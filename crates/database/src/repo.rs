//! Location and opening of a repository's database file.

use std::path::{Path, PathBuf};

use {
    sqlx::{
        SqlitePool,
        sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    },
    tracing::debug,
};

use crate::{
    config::DatabaseConfig,
    error::{Error, Result},
};

/// Directory inside a repository that holds the database.
pub const DB_DIR: &str = ".mnemo";
/// Database file name inside [`DB_DIR`].
pub const DB_FILE: &str = "mnemo.db";

/// `<repo>/.mnemo/mnemo.db`. Sync and backup tooling rely on this location.
pub fn repo_db_path(repo: &Path) -> PathBuf {
    repo.join(DB_DIR).join(DB_FILE)
}

pub fn repo_db_exists(repo: &Path) -> bool {
    repo_db_path(repo).is_file()
}

/// Open (creating if needed) the database of `repo` and apply the schema.
///
/// Uses `DELETE` journaling so the database stays a single file that can be
/// committed alongside the repository.
pub async fn open_repo_db(repo: &Path, config: &DatabaseConfig) -> Result<SqlitePool> {
    let db_path = repo_db_path(repo);
    let db_dir = repo.join(DB_DIR);
    tokio::fs::create_dir_all(&db_dir)
        .await
        .map_err(|source| Error::CreateDir {
            path: db_dir.clone(),
            source,
        })?;

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(config.busy_timeout());

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections.max(1))
        .connect_with(options)
        .await
        .map_err(|source| Error::Open {
            path: db_path.clone(),
            source,
        })?;

    mnemo_embeddings::run_migrations(&pool)
        .await
        .map_err(|source| Error::Migrate {
            path: db_path.clone(),
            source,
        })?;

    debug!(path = %db_path.display(), "repository database ready");
    Ok(pool)
}

/// Current `PRAGMA journal_mode` of the pool's database, lowercased.
pub async fn journal_mode(pool: &SqlitePool) -> Result<String> {
    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(pool)
        .await?;
    Ok(mode.to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, tempfile::TempDir};

    #[test]
    fn test_repo_db_path_is_fixed_subpath() {
        assert_eq!(
            repo_db_path(Path::new("/data/repo")),
            PathBuf::from("/data/repo/.mnemo/mnemo.db")
        );
    }

    #[tokio::test]
    async fn test_open_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        assert!(!repo_db_exists(tmp.path()));

        let pool = open_repo_db(tmp.path(), &DatabaseConfig::default())
            .await
            .unwrap();
        assert!(repo_db_exists(tmp.path()));
        assert_eq!(journal_mode(&pool).await.unwrap(), "delete");

        let (tables,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'embeddings'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(tables, 1);
        pool.close().await;
    }

    #[tokio::test]
    async fn test_open_fails_when_directory_cannot_be_created() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the repository directory should be.
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = open_repo_db(&blocker, &DatabaseConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CreateDir { .. }));
    }
}
