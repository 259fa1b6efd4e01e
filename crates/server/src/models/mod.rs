//! Domain models backing the repositories and route handlers.

pub mod password_reset;
pub mod profile;
pub mod visitor_request;

pub use password_reset::PasswordResetRequest;
pub use profile::Profile;
pub use visitor_request::{
    NewVisitorRequest, RegistrationForm, StatRow, ValidationError, VisitorRequest,
};
