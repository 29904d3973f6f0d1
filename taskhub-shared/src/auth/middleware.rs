/// Bearer-token authentication for Axum
///
/// Two flavours share the same verification path:
///
/// - [`require_auth`]: the request must carry a valid `Authorization: Bearer`
///   token, otherwise it is rejected before the handler runs.
/// - [`optional_auth`]: a valid token attaches an [`AuthContext`]; a missing
///   or invalid one lets the request through anonymously.
///
/// ```text
/// NoToken      -> optional: Anonymous | mandatory: 401
/// TokenPresent -> verify -> Valid (AuthContext attached)
///                        -> Invalid -> optional: Anonymous | mandatory: 403
/// ```
///
/// Neither variant touches the database.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, middleware::{self, Next}, routing::get, Extension, Router};
/// use taskhub_shared::auth::middleware::{require_auth, AuthContext};
///
/// async fn me(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
///
/// let app: Router = Router::new()
///     .route("/me", get(me))
///     .layer(middleware::from_fn(|req: Request, next: Next| require_auth("secret", req, next)));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::jwt::{validate_token, Claims, JwtError};

/// Identity of the caller, added to request extensions on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Username carried by the token
    pub username: String,

    /// Email carried by the token
    pub email: String,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header, or no token in it
    #[error("Access token required")]
    MissingCredentials,

    /// Authorization header is not a Bearer credential
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token failed verification
    #[error("Invalid or expired token")]
    InvalidToken(#[from] JwtError),
}

impl AuthError {
    /// Status code used when a mandatory route rejects the request
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidFormat(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing message; never includes verification details
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidFormat(_) => "Access token required",
            AuthError::InvalidToken(_) => "Invalid or expired token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.public_message(),
        }));
        (self.status_code(), body).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token)
}

/// Verifies the request's bearer token and returns the caller's identity
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_token(token, secret)?;
    Ok(claims.into())
}

/// Mandatory authentication middleware
///
/// # Errors
///
/// - `401` when the header is missing or not a Bearer credential
/// - `403` when the token is invalid, tampered with or expired
pub async fn require_auth(secret: &str, mut req: Request, next: Next) -> Result<Response, AuthError> {
    let auth = authenticate(req.headers(), secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected unauthenticated request");
        e
    })?;

    tracing::debug!(user_id = auth.user_id, "Authenticated request");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Optional authentication middleware
///
/// Never fails. Verification errors are logged at debug level and the request
/// continues without an [`AuthContext`].
pub async fn optional_auth(secret: &str, mut req: Request, next: Next) -> Response {
    match authenticate(req.headers(), secret) {
        Ok(auth) => {
            tracing::debug!(user_id = auth.user_id, "Authenticated request");
            req.extensions_mut().insert(auth);
        }
        Err(AuthError::MissingCredentials) => {}
        Err(e) => tracing::debug!(error = %e, "Ignoring invalid credentials on optional route"),
    }

    next.run(req).await
}
