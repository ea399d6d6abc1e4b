use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::{Authorization, HeaderMapExt as _};
use derive_new::new;
use serde::Serialize;
use snafu::{Location, OptionExt as _, ResultExt as _, Snafu};

const REALM: &str = r#"Basic realm="Authentication Required""#;

/// The single username/password pair the service accepts.
#[derive(Clone, PartialEq, Eq, new)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Username of a request that passed [require_auth], available as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

#[derive(Debug, Snafu, Serialize)]
#[serde(tag = "error")]
pub enum AuthError {
    #[snafu(display("request is not authenticated"))]
    MissingHeader {
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("authorization header is not valid basic credentials"))]
    MalformedHeader {
        #[serde(skip)]
        source: axum_extra::headers::Error,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("invalid login for user '{username}'"))]
    InvalidCredentials {
        #[serde(skip)]
        username: String,
        #[serde(skip)]
        #[snafu(implicit)]
        location: Location,
    },
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    message: &'static str,
    #[serde(flatten)]
    data: AuthError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let content = AuthResponse {
            message: "Unauthorized Access",
            data: self,
        };

        let mut response = (StatusCode::UNAUTHORIZED, Json(content)).into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
        response
    }
}

/// Checks presented credentials against the configured pair.
#[derive(Debug, Clone, new)]
pub struct Authenticator {
    credentials: Credentials,
}

impl Authenticator {
    /// Returns the username if both parts match exactly.
    pub fn verify(&self, username: &str, password: &str) -> Option<&str> {
        let expected = &self.credentials;

        if expected.username == username && expected.password == password {
            Some(&expected.username)
        } else {
            None
        }
    }

    pub fn extract(&self, request: &Request) -> Result<AuthenticatedUser, AuthError> {
        let basic = request
            .headers()
            .typed_try_get::<Authorization<Basic>>()
            .context(MalformedHeaderSnafu)?
            .context(MissingHeaderSnafu)?;

        let username = self
            .verify(basic.username(), basic.password())
            .context(InvalidCredentialsSnafu {
                username: basic.username(),
            })?;

        Ok(AuthenticatedUser(username.to_owned()))
    }
}

/// Middleware guarding every route it wraps with HTTP basic authentication.
///
/// The wrapped handler only runs for authenticated requests.
pub async fn require_auth(
    State(authenticator): State<Arc<Authenticator>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticator.extract(&request) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(error = %err, method = %request.method(), uri = %request.uri(), "rejected unauthenticated request");
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(Credentials::new("admin".into(), "secret".into()))
    }

    fn request(authorization: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/video/1");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn verify_returns_username_on_match() {
        assert_eq!(authenticator().verify("admin", "secret"), Some("admin"));
    }

    #[test]
    fn verify_rejects_wrong_password_or_user() {
        let authenticator = authenticator();

        assert_eq!(authenticator.verify("admin", "Secret"), None);
        assert_eq!(authenticator.verify("root", "secret"), None);
        assert_eq!(authenticator.verify("", ""), None);
    }

    #[test]
    fn extract_accepts_basic_header() {
        // admin:secret
        let user = authenticator()
            .extract(&request(Some("Basic YWRtaW46c2VjcmV0")))
            .unwrap();

        assert_eq!(user, AuthenticatedUser("admin".into()));
    }

    #[test]
    fn extract_requires_header() {
        let result = authenticator().extract(&request(None));
        assert!(matches!(result, Err(AuthError::MissingHeader { .. })));
    }

    #[test]
    fn extract_rejects_other_schemes() {
        let result = authenticator().extract(&request(Some("Bearer abc")));
        assert!(result.is_err());
    }

    #[test]
    fn extract_rejects_wrong_password() {
        // admin:wrong
        let result = authenticator().extract(&request(Some("Basic YWRtaW46d3Jvbmc=")));

        match result {
            Err(AuthError::InvalidCredentials { username, .. }) => assert_eq!(username, "admin"),
            other => panic!("expected invalid credentials, got {other:?}"),
        }
    }

    #[test]
    fn rejection_asks_for_basic_auth() {
        let response = authenticator()
            .extract(&request(None))
            .unwrap_err()
            .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], REALM);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let printed = format!("{:?}", Credentials::new("admin".into(), "secret".into()));
        assert!(!printed.contains("secret"));
    }
}
