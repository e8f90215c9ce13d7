mod auth;
mod error;
mod middleware;
mod stats;

pub use error::{ApiError, repo_error_to_api};
pub use middleware::MaybePrincipal;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;
use crate::application::feed::FeedService;
use crate::application::likes::LikeService;
use crate::application::stats::StatsService;
use crate::auth::AuthService;
use crate::infra::db::PostgresRepositories;

use self::middleware::{log_responses, resolve_principal, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub stats: StatsService,
    pub likes: LikeService,
    pub feed: FeedService,
    pub repos: PostgresRepositories,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/verify", get(auth::verify))
        .route("/api/stats/batch", post(stats::batch_stats))
        .route("/api/likes/toggle", post(stats::toggle_like))
        .route("/api/feed", get(stats::feed))
        .route("/health", get(health))
        .layer(from_fn_with_state(state.clone(), resolve_principal))
        .layer(from_fn(log_responses))
        .layer(from_fn(set_request_context))
        .with_state(state)
}

async fn health(State(state): State<HttpState>) -> Response {
    db_health_response(state.repos.health_check().await)
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
