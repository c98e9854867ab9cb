use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create database directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to migrate database {}: {source}", path.display())]
    Migrate {
        path: PathBuf,
        #[source]
        source: mnemo_embeddings::Error,
    },

    #[error(transparent)]
    Query(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
