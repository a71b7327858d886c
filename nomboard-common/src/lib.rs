//! # nomboard common library
//!
//! Shared code for the nomination report dashboard:
//! - Error type and result alias
//! - Configuration loading and validation
//! - Session gate (shared-password authentication, framework independent)

pub mod config;
pub mod error;
pub mod session;

pub use config::{DashboardConfig, DatabaseTls, Environment};
pub use error::{Error, Result};
pub use session::{AuthFailure, SessionGate, SessionToken};
