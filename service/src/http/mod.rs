//! HTTP surface of the waitlist service.
//!
//! Defines the signup API, response formatting, and the router with its
//! middleware stack.

pub mod api;
pub mod middleware;
pub mod reply;
pub mod router;

pub(crate) use router::create_app;

use crate::db::Pool;

/// Application state shared across request handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Shared read/write pool. Duplicate signups are resolved by the table's
    /// unique constraint, never by an in-process lock.
    pub db_pool: Pool,
}
