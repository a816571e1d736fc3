//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete,
//! button clicks, and gateway events like member joins.

/// Autocomplete handlers for project names, dashboard kinds, actions and statuses
pub mod autocomplete;
/// Gateway event dispatch
pub mod events;
/// Dashboard button clicks
pub mod interactions;
