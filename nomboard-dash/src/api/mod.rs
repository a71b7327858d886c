//! HTTP API handlers for nomboard-dash

pub mod auth;
pub mod data;
pub mod debug;
pub mod diagnostics;
pub mod health;

pub use auth::{check_session, login, logout, require_session};
pub use data::get_report;
pub use debug::get_debug_info;
pub use diagnostics::get_outbound_ip;
pub use health::health_routes;
