//! # stockroom-core
//!
//! Core crate for Stockroom. Contains configuration schemas, typed
//! identifiers, pagination types, persistence traits and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other Stockroom crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
