//! Signup, login and bearer token resolution

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    jwt::JwtService,
    models::{LoginRequest, SignupRequest, UpdateProfile, User},
    password::{hash_password, verify_password},
    rate_limiter::RateLimiter,
    repositories::UserRepository,
    validation,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// A freshly issued session token and the user it is bound to
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Authentication gate in front of the credential store
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: JwtService,
    login_limiter: RateLimiter,
}

fn invalid_argument(result: Result<(), String>) -> ApiResult<()> {
    result.map_err(ApiError::InvalidArgument)
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: JwtService, login_limiter: RateLimiter) -> Self {
        Self {
            users,
            jwt,
            login_limiter,
        }
    }

    /// Register a student account and sign it in
    pub async fn signup(&self, request: SignupRequest, now: DateTime<Utc>) -> ApiResult<Session> {
        invalid_argument(validation::validate_username(&request.username))?;
        invalid_argument(validation::validate_email(&request.email))?;
        invalid_argument(validation::validate_password(&request.password))?;
        invalid_argument(validation::validate_display_name(&request.display_name))?;
        invalid_argument(validation::validate_language(&request.preferred_language))?;

        if self
            .users
            .find_user_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict("Username already taken".to_string()));
        }
        if self.users.find_user_by_email(&request.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let user = User::new_student(
            request.username,
            request.email,
            password_hash,
            request.display_name,
            request.preferred_language,
            now,
        );
        self.users.insert_user(&user).await?;
        info!(username = %user.username, "User signed up");

        let token = self.issue(&user, now)?;
        Ok(Session { token, user })
    }

    /// Check the password for `email` and open a new session
    pub async fn login(&self, request: LoginRequest, now: DateTime<Utc>) -> ApiResult<Session> {
        if !self.login_limiter.is_allowed(&request.email).await {
            warn!(email = %request.email, "Login refused while banned");
            return Err(ApiError::TooManyRequests);
        }

        let Some(mut user) = self.users.find_user_by_email(&request.email).await? else {
            self.login_limiter.record_failure(&request.email).await;
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let verified = match user.password_hash.clone() {
            Some(stored_hash) => {
                let password = request.password;
                tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
                    .await
                    .map_err(|e| {
                        ApiError::Internal(format!("Password verification task failed: {}", e))
                    })?
            }
            None => false,
        };

        if !verified {
            warn!(username = %user.username, "Login failed");
            self.login_limiter.record_failure(&request.email).await;
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.login_limiter.reset(&request.email).await;
        self.users.touch_last_login(user.id, now).await?;
        user.last_login = Some(now);
        info!(username = %user.username, "User logged in");

        let token = self.issue(&user, now)?;
        Ok(Session { token, user })
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn resolve(&self, token: &str) -> ApiResult<User> {
        let claims = self
            .jwt
            .validate_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        self.users
            .find_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Apply the mutable profile fields and persist them
    pub async fn update_profile(
        &self,
        mut user: User,
        update: UpdateProfile,
        now: DateTime<Utc>,
    ) -> ApiResult<User> {
        if let Some(display_name) = &update.display_name {
            invalid_argument(validation::validate_display_name(display_name))?;
        }
        if let Some(language) = &update.preferred_language {
            invalid_argument(validation::validate_language(language))?;
        }

        user.apply_profile_update(&update, now);
        self.users.update_user_profile(&user).await?;
        Ok(user)
    }

    fn issue(&self, user: &User, now: DateTime<Utc>) -> ApiResult<String> {
        self.jwt
            .issue_token_at(&user.username, now)
            .map_err(|e| ApiError::Internal(format!("Failed to issue token: {}", e)))
    }
}
