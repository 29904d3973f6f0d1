//! # TaskHub Shared Library
//!
//! Types, persistence and authentication shared by the TaskHub API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens and bearer-token middleware
//! - `db`: Connection pool and migrations
//! - `models`: Database models and the task list query builder

pub mod auth;
pub mod db;
pub mod models;
