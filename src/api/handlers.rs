use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use snafu::{OptionExt as _, ResultExt as _};
use tracing::instrument;

use super::arguments::{Arguments, VideoPath};
use super::{App, ConflictSnafu, NotFoundSnafu, Result, ValidationSnafu};
use crate::auth::AuthenticatedUser;
use crate::model::Video;
use crate::validate;

#[instrument(skip_all, fields(user = %user.0, video_id = %id))]
pub async fn get(
    State(app): State<App>,
    Extension(user): Extension<AuthenticatedUser>,
    VideoPath(id): VideoPath,
) -> Result<Json<Video>> {
    let video = app.repository().get(id).await?.context(NotFoundSnafu { id })?;

    Ok(Json(video))
}

#[instrument(skip_all, fields(user = %user.0, video_id = %id))]
pub async fn create(
    State(app): State<App>,
    Extension(user): Extension<AuthenticatedUser>,
    VideoPath(id): VideoPath,
    arguments: Arguments,
) -> Result<(StatusCode, Json<Video>)> {
    let payload = validate::create_video(&arguments).context(ValidationSnafu)?;

    if app.repository().get(id).await?.is_some() {
        return ConflictSnafu { id }.fail();
    }

    let video = payload.into_video(id);
    app.repository().insert(video.clone()).await?;

    tracing::info!(video = ?video, "created video `{}`", id);

    Ok((StatusCode::CREATED, Json(video)))
}

#[instrument(skip_all, fields(user = %user.0, video_id = %id))]
pub async fn update(
    State(app): State<App>,
    Extension(user): Extension<AuthenticatedUser>,
    VideoPath(id): VideoPath,
    arguments: Arguments,
) -> Result<Json<Video>> {
    let changes = validate::update_video(&arguments).context(ValidationSnafu)?;

    let video = app
        .repository()
        .update(id, &changes)
        .await?
        .context(NotFoundSnafu { id })?;

    tracing::info!(changes = ?changes, "updated video `{}`", id);

    Ok(Json(video))
}

#[instrument(skip_all, fields(user = %user.0, video_id = %id))]
pub async fn delete(
    State(app): State<App>,
    Extension(user): Extension<AuthenticatedUser>,
    VideoPath(id): VideoPath,
) -> Result<StatusCode> {
    if !app.repository().delete(id).await? {
        return NotFoundSnafu { id }.fail();
    }

    tracing::info!("deleted video `{}`", id);

    Ok(StatusCode::NO_CONTENT)
}
