/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and current-user endpoints
/// - `tasks`: Task CRUD and listing

pub mod auth;
pub mod health;
pub mod tasks;
