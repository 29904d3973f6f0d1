//! # TaskHub API Server Library
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration loaded from the environment
//! - `error`: Error type and HTTP response mapping
//! - `extract`: Extractors that reject with the API envelope
//! - `middleware`: HTTP-level layers
//! - `response`: JSON response envelopes
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
