//! Router Module Index
//!
//! Routes are split by who may reach them. Access control is not applied here:
//! the edge gate wraps the whole router, so these modules only describe what
//! exists behind it.

/// Routes reachable without any session (health check, login entry point).
pub mod public;

/// Admin area landings. Reached only after the edge gate has allowed the request.
pub mod admin;
