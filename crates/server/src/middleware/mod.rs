//! HTTP middleware: session layer and authentication extractors.

pub mod auth;
pub mod session;

pub use auth::{CurrentUser, SecurityDesk};
pub use session::create_session_layer;
