/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT token issuance and verification
/// - [`middleware`]: Mandatory and optional bearer-token middleware
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::password::{hash_password_with, verify_password, PasswordParams};
/// use taskhub_shared::auth::jwt::{create_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password_with("user_password", &PasswordParams::default())?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(1, "alice", "alice@example.com", Duration::days(7))?;
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
