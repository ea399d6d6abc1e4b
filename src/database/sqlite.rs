use async_trait::async_trait;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use snafu::ResultExt;
use tracing::instrument;

use super::{
    ConflictSnafu, JoinSnafu, OpenSnafu, PoolSnafu, QuerySnafu, Result, VideoRepository,
};
use crate::model::{UpdateVideo, Video, VideoId};

/// Path that selects a private in-memory database instead of a file.
pub const MEMORY: &str = ":memory:";

const POOL_SIZE: u32 = 8;

/// Runs on every pooled connection.
const CONNECTION_PRAGMAS: &str = "PRAGMA synchronous = NORMAL;";

/// Runs once per database.
const SETUP: &str = r#"
    PRAGMA journal_mode = WAL;

    CREATE TABLE IF NOT EXISTS videos (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        views INTEGER NOT NULL,
        likes INTEGER NOT NULL
    );
"#;

/// [VideoRepository] backed by a SQLite database.
///
/// Connections come from an `r2d2` pool and every statement runs on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: r2d2::Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("SqliteRepository")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl SqliteRepository {
    /// Opens (or creates) the database at `path` and makes sure the `videos` table exists.
    ///
    /// [MEMORY] opens an in-memory database; the pool then holds a single connection
    /// that is never retired, since every new in-memory connection starts out empty.
    pub fn open(path: &str) -> Result<Self> {
        let builder = r2d2::Pool::builder();

        let (manager, builder) = if path == MEMORY {
            let builder = builder.max_size(1).max_lifetime(None).idle_timeout(None);
            (SqliteConnectionManager::memory(), builder)
        } else {
            let manager = SqliteConnectionManager::file(path)
                .with_init(|connection| connection.execute_batch(CONNECTION_PRAGMAS));
            (manager, builder.max_size(POOL_SIZE))
        };

        let pool = builder.build(manager).context(OpenSnafu { path })?;

        let connection = pool.get().context(PoolSnafu)?;
        connection.execute_batch(SETUP).context(QuerySnafu)?;
        drop(connection);

        tracing::info!(path, "opened video database");

        Ok(SqliteRepository { pool })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(MEMORY)
    }

    async fn run<T, F>(&self, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let connection = pool.get().context(PoolSnafu)?;
            query(&*connection)
        })
        .await
        .context(JoinSnafu)?
    }
}

fn video_from_row(row: &Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        id: VideoId::from(row.get::<_, i64>(0)?),
        name: row.get(1)?,
        views: row.get(2)?,
        likes: row.get(3)?,
    })
}

#[async_trait]
impl VideoRepository for SqliteRepository {
    #[instrument(skip(self))]
    async fn get(&self, id: VideoId) -> Result<Option<Video>> {
        self.run(move |connection| {
            connection
                .query_row(
                    "SELECT id, name, views, likes FROM videos WHERE id = ?1",
                    params![id.get()],
                    video_from_row,
                )
                .optional()
                .context(QuerySnafu)
        })
        .await
    }

    #[instrument(skip(self), fields(id = %video.id))]
    async fn insert(&self, video: Video) -> Result<()> {
        self.run(move |connection| {
            let inserted = connection.execute(
                "INSERT INTO videos (id, name, views, likes) VALUES (?1, ?2, ?3, ?4)",
                params![video.id.get(), video.name, video.views, video.likes],
            );

            match inserted {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(error, _))
                    if error.code == ErrorCode::ConstraintViolation =>
                {
                    ConflictSnafu { id: video.id }.fail()
                }
                Err(source) => Err(source).context(QuerySnafu),
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update(&self, id: VideoId, update: &UpdateVideo) -> Result<Option<Video>> {
        if update.is_empty() {
            return self.get(id).await;
        }

        let UpdateVideo { name, views, likes } = update.clone();

        self.run(move |connection| {
            connection
                .query_row(
                    "UPDATE videos SET
                        name = COALESCE(?2, name),
                        views = COALESCE(?3, views),
                        likes = COALESCE(?4, likes)
                    WHERE id = ?1
                    RETURNING id, name, views, likes",
                    params![id.get(), name, views, likes],
                    video_from_row,
                )
                .optional()
                .context(QuerySnafu)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: VideoId) -> Result<bool> {
        self.run(move |connection| {
            connection
                .execute("DELETE FROM videos WHERE id = ?1", params![id.get()])
                .map(|deleted| deleted > 0)
                .context(QuerySnafu)
        })
        .await
    }
}
