use std::net::SocketAddr;

use axum::routing::get;
use axum::{middleware, Router};
use snafu::ResultExt;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::error::{ApplicationError, BindAddressSnafu, WebServerSnafu};

mod arguments;
mod error;
mod handlers;
mod state;


pub use arguments::{Arguments, VideoPath};
pub use error::*;
pub use state::*;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Builds the `/video/:video_id` resource with basic authentication on every method.
pub fn create_router(app: App) -> Router {
    let guard = middleware::from_fn_with_state(app.authenticator.clone(), require_auth);

    Router::new()
        .route(
            "/video/:video_id",
            get(handlers::get)
                .post(handlers::create)
                .put(handlers::update)
                .delete(handlers::delete),
        )
        .route_layer(guard)
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

pub async fn serve(address: SocketAddr, router: Router) -> Result<(), ApplicationError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .context(BindAddressSnafu { address })?;

    tracing::info!("listening on http://{address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(WebServerSnafu)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(err) => {
            tracing::error!("unable to listen for the shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}
