//! Core business logic - framework-agnostic operations used by the bot layer.
//!
//! Nothing in here talks to Discord directly: channel creation goes through
//! [`provisioning::ChannelProvider`] and dashboards render to a
//! [`dashboard::DashboardView`].

pub mod audit;
pub mod dashboard;
pub mod encryption;
pub mod format;
pub mod monitoring;
pub mod projects;
pub mod provisioning;
pub mod rate_limit;
pub mod sessions;
pub mod users;
