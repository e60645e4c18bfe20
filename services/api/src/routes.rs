//! API service routes

use anyhow::{Context, Result};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::ApiError,
    middleware::{CurrentUser, auth_middleware},
    models::{
        AddCoinsQuery, AuthResponse, CoinsResponse, CompleteLessonQuery, LeaderboardQuery,
        LoginRequest, SignupRequest, UpdateProfile, UserEnvelope, UserView,
    },
    services::Session,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/me", get(get_me).put(update_me))
        .route("/api/auth/add-coins", post(add_coins))
        .route("/api/daily-challenge/complete", post(complete_daily_challenge))
        .route("/api/progress", get(get_progress))
        .route(
            "/api/progress/lesson/:lesson_id/complete",
            post(complete_lesson),
        )
        .route("/api/achievements", get(get_achievements))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/daily-challenge", get(get_daily_challenge))
        .route("/api/badges", get(get_badges))
        .route("/api/lessons", get(get_lessons))
        .route("/api/lessons/:lesson_id", get(get_lesson))
        .route("/api/courses", get(get_courses))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for the configured frontend origins
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true))
}

fn auth_response(session: Session) -> Json<AuthResponse> {
    Json(AuthResponse {
        token: session.token,
        user: UserView::from(&session.user),
    })
}

/// Welcome endpoint
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to Lets Learn API!" }))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth.signup(payload, Utc::now()).await?;
    Ok(auth_response(session))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.auth.login(payload, Utc::now()).await?;
    Ok(auth_response(session))
}

pub async fn get_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> impl IntoResponse {
    Json(UserEnvelope {
        user: UserView::from(&user),
    })
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(update): Json<UpdateProfile>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.update_profile(user, update, Utc::now()).await?;
    Ok(Json(UserEnvelope {
        user: UserView::from(&user),
    }))
}

/// Manual coin grant
pub async fn add_coins(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<AddCoinsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let total_coins = state.ledger.award(user.id, query.amount, Utc::now()).await?;
    Ok(Json(CoinsResponse {
        message: format!("Added {} coins", query.amount),
        total_coins,
    }))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.leaderboard.top(query.limit).await?))
}

pub async fn get_daily_challenge(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Utc::now().date_naive();
    Ok(Json(state.challenges.challenge_for(today).await?))
}

pub async fn complete_daily_challenge(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .progress
            .complete_daily_challenge(&user, Utc::now())
            .await?,
    ))
}

pub async fn get_progress(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.progress.get_progress(user.id).await?))
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(lesson_id): Path<String>,
    Query(query): Query<CompleteLessonQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let completion = state
        .progress
        .complete_lesson(&user, &lesson_id, query.coins_earned, Utc::now())
        .await?;
    Ok(Json(completion))
}

pub async fn get_achievements(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.badges.list_earned(user.id).await?))
}

pub async fn get_badges(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.list_badges().await?))
}

pub async fn get_lessons(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.list_lessons().await?))
}

pub async fn get_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.get_lesson(&lesson_id).await?))
}

pub async fn get_courses(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.catalog.list_courses().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_layer_accepts_configured_origins() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ];
        assert!(cors_layer(&origins).is_ok());
    }

    #[test]
    fn cors_layer_rejects_unparseable_origins() {
        let origins = vec!["http://bad\norigin".to_string()];
        assert!(cors_layer(&origins).is_err());
    }
}
