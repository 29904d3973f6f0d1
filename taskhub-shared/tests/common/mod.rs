//! Shared helpers for database-backed integration tests
//!
//! Tests return early when `DATABASE_URL` is not set, so the suite passes on
//! machines without PostgreSQL.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use sqlx::PgPool;
use taskhub_shared::db::migrations::{ensure_database_exists, run_migrations};
use taskhub_shared::db::pool::{create_pool, DatabaseConfig};
use taskhub_shared::models::user::{CreateUser, User};

static COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
}

/// Connects and migrates, or `None` when no database is configured
pub async fn try_pool() -> Option<PgPool> {
    let url = database_url()?;
    ensure_database_exists(&url).await.expect("Failed to create database");

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("Failed to create pool");

    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

/// A value no other test in this run will produce
pub fn unique(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}", prefix, nanos, n)
}

pub async fn create_user(pool: &PgPool) -> User {
    let name = unique("user");
    User::create(
        pool,
        CreateUser {
            username: name.chars().take(50).collect(),
            email: format!("{}@example.com", name),
            password_hash: "$argon2id$v=19$m=8192,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        },
    )
    .await
    .expect("Failed to create user")
}
