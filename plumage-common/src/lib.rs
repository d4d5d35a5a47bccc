//! # Plumage Common Library
//!
//! Shared code for the plumage spectral loader:
//! - Dataset configuration loading
//! - Relational schema definitions and row models
//! - The SQLite sink that persists derived tables
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
