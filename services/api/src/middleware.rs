//! Bearer token authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, error::ApiError, models::User};

/// The user a request's bearer token resolved to
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolve the bearer token and attach the user to the request
///
/// A missing or malformed `Authorization` header is rejected with 401
/// before any lookup happens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        ApiError::Unauthorized("Missing bearer token".to_string())
    })?;

    let user = state.auth.resolve(bearer.token()).await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
