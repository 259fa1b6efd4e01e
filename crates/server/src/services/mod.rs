//! Business services: authentication, pass issuance, rate limiting,
//! analytics, and transactional email.

pub mod analytics;
pub mod auth;
pub mod email;
pub mod passes;
pub mod rate_limit;

pub use analytics::VisitSummary;
pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use passes::{PassIssueError, PassIssuer};
pub use rate_limit::RateLimiter;
