/// Middleware for the API server
///
/// Authentication middleware lives in `taskhub_shared::auth::middleware`;
/// this module holds the HTTP-level layers.

pub mod security;
