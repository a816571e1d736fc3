//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Server setup, audit log, rate limits and bot admins
pub mod admin;

/// Dashboard management commands
pub mod dashboard;

/// General utility commands
pub mod general;

/// System, service, game server and alert commands
pub mod monitoring;

/// Project and task tracking commands
pub mod project;

/// Personal access token commands
pub mod session;

// Export commands
pub use admin::*;
pub use dashboard::*;
pub use general::*;
pub use monitoring::*;
pub use project::*;
pub use session::*;
