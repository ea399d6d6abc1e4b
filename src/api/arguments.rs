use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::Form;
use serde_json::{Map, Value};

use super::ApiError;
use crate::model::VideoId;

/// Raw request arguments: the body (JSON object, urlencoded or multipart form), then any
/// query parameters the body did not already supply.
///
/// Anything that is not a form body is read as JSON; an empty body is an empty argument set.
/// File parts of a multipart body are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(pub Map<String, Value>);

impl std::ops::Deref for Arguments {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

type Pairs = Vec<(String, String)>;

enum BodyKind {
    UrlEncoded,
    Multipart,
    Json,
}

fn body_kind(request: &Request) -> BodyKind {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::UrlEncoded
    } else if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else {
        BodyKind::Json
    }
}

fn malformed(err: MultipartError) -> ApiError {
    ApiError::MalformedBody {
        reason: err.body_text(),
    }
}

async fn multipart_pairs(mut multipart: Multipart) -> Result<Pairs, ApiError> {
    let mut pairs = Pairs::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        let value = field.text().await.map_err(malformed)?;
        pairs.push((name, value));
    }

    Ok(pairs)
}

fn insert_missing(arguments: &mut Map<String, Value>, pairs: Pairs) {
    for (key, value) in pairs {
        arguments.entry(key).or_insert(Value::String(value));
    }
}

fn parse_json(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(_) => Err(ApiError::MalformedBody {
            reason: "expected a JSON object".to_string(),
        }),
        Err(err) => Err(ApiError::MalformedBody {
            reason: err.to_string(),
        }),
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for Arguments {
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<Pairs>::try_from_uri(request.uri())
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        let mut arguments = match body_kind(&request) {
            BodyKind::UrlEncoded => {
                let Form(pairs) = Form::<Pairs>::from_request(request, state)
                    .await
                    .map_err(|rejection| ApiError::MalformedBody {
                        reason: rejection.body_text(),
                    })?;

                let mut arguments = Map::new();
                insert_missing(&mut arguments, pairs);
                arguments
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(request, state)
                    .await
                    .map_err(|rejection| ApiError::MalformedBody {
                        reason: rejection.body_text(),
                    })?;

                let mut arguments = Map::new();
                insert_missing(&mut arguments, multipart_pairs(multipart).await?);
                arguments
            }
            BodyKind::Json => {
                let body = Bytes::from_request(request, state)
                    .await
                    .map_err(|rejection| ApiError::MalformedBody {
                        reason: rejection.body_text(),
                    })?;

                parse_json(&body)?
            }
        };

        insert_missing(&mut arguments, query);

        Ok(Arguments(arguments))
    }
}

/// The `video_id` path segment. A segment that is not a plain run of digits is reported
/// as an unknown video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoPath(pub VideoId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for VideoPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segment) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| {
                tracing::debug!("missing video id: {}", rejection.body_text());
                ApiError::NotFound { id: None }
            })?;

        segment.parse::<VideoId>().map(VideoPath).map_err(|err| {
            tracing::debug!("{err}");
            ApiError::NotFound { id: None }
        })
    }
}
