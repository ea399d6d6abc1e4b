use async_trait::async_trait;
use snafu::{Location, ResultExt as _, Snafu};

use crate::config::Config;
use crate::error::{ApplicationError, ConnectDatabaseSnafu};
use crate::model::{UpdateVideo, Video, VideoId};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

pub type Result<T, E = RepositoryError> = std::result::Result<T, E>;

/// Opens the configured SQLite database, creating the `videos` table if needed.
pub fn connect(config: &Config) -> Result<SqliteRepository, ApplicationError> {
    let path = config.database_path.as_str();
    SqliteRepository::open(path).context(ConnectDatabaseSnafu { path })
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RepositoryError {
    #[snafu(display("video `{id}` already exists"))]
    Conflict {
        id: VideoId,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to open the database `{path}` at {location}: {source}"))]
    Open {
        path: String,
        source: r2d2::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to check out a database connection at {location}: {source}"))]
    Pool {
        source: r2d2::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to query the database at {location}: {source}"))]
    Query {
        source: rusqlite::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("database task did not complete at {location}: {source}"))]
    Join {
        source: tokio::task::JoinError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl crate::Located for RepositoryError {
    fn location(&self) -> Location {
        match self {
            RepositoryError::Conflict { location, .. }
            | RepositoryError::Open { location, .. }
            | RepositoryError::Pool { location, .. }
            | RepositoryError::Query { location, .. }
            | RepositoryError::Join { location, .. } => *location,
        }
    }
}

/// Persistent store of [Video] records keyed by [VideoId].
#[async_trait]
pub trait VideoRepository: Send + Sync + 'static {
    /// Returns `None` if no record has this id.
    async fn get(&self, id: VideoId) -> Result<Option<Video>>;

    /// Inserts a new record. Fails with [RepositoryError::Conflict] if the id is taken.
    async fn insert(&self, video: Video) -> Result<()>;

    /// Overwrites the supplied fields of an existing record and returns the result.
    /// Returns `None` if no record has this id.
    async fn update(&self, id: VideoId, update: &UpdateVideo) -> Result<Option<Video>>;

    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: VideoId) -> Result<bool>;
}
