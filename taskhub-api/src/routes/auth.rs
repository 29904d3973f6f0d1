/// Authentication endpoints
///
/// - `POST /api/auth/register` - Create an account and receive a token
/// - `POST /api/auth/login` - Exchange credentials for a token
/// - `GET /api/auth/me` - Profile of the token's user (bearer token required)
///
/// Tokens are HS256 JWTs carrying `id`, `username` and `email`; their lifetime
/// comes from `JWT_EXPIRES_IN`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::{ApiResponse, AuthResponse},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskhub_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::AuthContext,
        password,
    },
    models::user::{CreateUser, User},
};
use validator::{Validate, ValidationErrors};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, length(max = 50, message = "Username must be at most 50 characters"))]
    pub username: Option<String>,

    #[validate(required, length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: Option<String>,

    #[validate(required)]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required, length(min = 1))]
    pub email: Option<String>,

    #[validate(required, length(min = 1))]
    pub password: Option<String>,
}

const ALL_FIELDS_REQUIRED: &str = "All fields are required";

/// A missing field wins over a length violation
fn registration_error(errors: &ValidationErrors) -> ApiError {
    let field_errors = errors.field_errors();
    let mut all = field_errors.values().flat_map(|errs| errs.iter());

    if all.clone().any(|e| e.code == "required") {
        return ApiError::BadRequest(ALL_FIELDS_REQUIRED.to_string());
    }

    let message = all
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| ALL_FIELDS_REQUIRED.to_string());
    ApiError::BadRequest(message)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db_err| db_err.is_unique_violation())
}

fn issue_token(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = Claims::for_user(user, state.config.jwt.expires_in())?;
    Ok(create_token(&claims, state.jwt_secret())?)
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// { "username": "alice", "email": "alice@example.com", "password": "..." }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "success": true,
///   "message": "User registered successfully",
///   "token": "eyJ...",
///   "user": { "id": 1, "username": "alice", "email": "alice@example.com", "created_at": "..." }
/// }
/// ```
///
/// # Errors
///
/// - `400`: A field is missing or empty, username or email is too long, or
///   the email or username is taken
/// - `500`: Hashing or store failure
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(|errors| registration_error(&errors))?;

    let (Some(username), Some(email), Some(password)) = (req.username, req.email, req.password) else {
        return Err(ApiError::BadRequest(ALL_FIELDS_REQUIRED.to_string()));
    };

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(ALL_FIELDS_REQUIRED.to_string()));
    }

    if User::exists_by_email_or_username(&state.db, &email, &username).await? {
        return Err(ApiError::BadRequest("User already exists".to_string()));
    }

    let params = state.config.password.params();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password_with(&password, &params))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))??;

    let user = User::create(
        &state.db,
        CreateUser {
            username,
            email,
            password_hash,
        },
    )
    .await
    .map_err(|e| {
        // Lost a race with a concurrent registration
        if is_unique_violation(&e) {
            ApiError::BadRequest("User already exists".to_string())
        } else {
            e.into()
        }
    })?;

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(token, user).with_message("User registered successfully")),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "email": "alice@example.com", "password": "..." }
/// ```
///
/// # Errors
///
/// - `400`: Email or password missing
/// - `401`: Unknown email or wrong password, with the same message for both
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()
        .map_err(|_| ApiError::BadRequest("Email and password are required".to_string()))?;

    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    };

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        tracing::debug!("Login failed: unknown email");
        return Err(invalid());
    };

    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))??;

    if !valid {
        tracing::debug!(user_id = user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse::new(token, user)))
}

/// Current user profile
///
/// Reads the row for the token's user id, so a deleted account yields 404
/// even while its token is still valid.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::data(user)))
}
