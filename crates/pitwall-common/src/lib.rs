//! Pitwall Common Library
//!
//! Shared types, utilities, and error handling for the Pitwall project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all Pitwall workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Centralized tracing configuration for all binaries
//! - **Types**: Shared domain vocabulary (session kinds, data categories)

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PitwallError, Result};
pub use types::SessionKind;
