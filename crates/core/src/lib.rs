//! # MediLink Core
//!
//! Core business logic for the MediLink hospital records system.
//!
//! This crate contains the data operations behind the REST surface:
//! - Patient reads, partial updates and encounter creation over SQLite
//! - The append-only audit trail written beside every sensitive read
//!   and mutation, and the reporting queries over it
//! - Credential verification and session token issue/parse
//!
//! **No API concerns**: HTTP routing, bearer extraction and OpenAPI
//! documentation belong in `api-rest`.

#![warn(rust_2018_idioms)]

pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod patients;

pub use config::AppConfig;
pub use error::{CoreError, CoreResult};
