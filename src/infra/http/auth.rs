//! Authentication handlers.

use axum::{Extension, Json, extract::State, http::Request, body::Body};

use plaza_api_types::{LoginRequest, LoginResponse, VerifyResponse};

use super::HttpState;
use super::error::{ApiError, auth_error_to_api};
use super::middleware::{MaybePrincipal, bearer_token};

pub async fn login(
    State(state): State<HttpState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request(
            "Username and password are required",
            None,
        ));
    }

    let issued = state
        .auth
        .login(request.username.trim(), &request.password)
        .await
        .map_err(auth_error_to_api)?;

    Ok(Json(LoginResponse {
        token: issued.token,
        user_id: issued.principal.user_id,
        username: issued.principal.username,
        role: issued.principal.role.to_string(),
    }))
}

/// Logout revokes the session row and drops both cache entries; a request
/// without a valid token has nothing to revoke and still succeeds.
pub async fn logout(
    State(state): State<HttpState>,
    Extension(MaybePrincipal(principal)): Extension<MaybePrincipal>,
    request: Request<Body>,
) -> Result<(), ApiError> {
    let Some(principal) = principal else {
        return Ok(());
    };
    let Some(token) = bearer_token(&request) else {
        return Ok(());
    };

    state
        .auth
        .logout(&token, &principal)
        .await
        .map_err(auth_error_to_api)?;
    Ok(())
}

pub async fn verify(
    Extension(MaybePrincipal(principal)): Extension<MaybePrincipal>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let principal = principal.ok_or_else(ApiError::unauthorized)?;
    Ok(Json(VerifyResponse {
        user_id: principal.user_id,
        username: principal.username,
        role: principal.role.to_string(),
    }))
}
