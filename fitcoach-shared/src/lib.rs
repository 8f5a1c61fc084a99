//! # FitCoach Shared Library
//!
//! Domain types, persistence, and the request-authorization pipeline used by
//! the FitCoach API server.
//!
//! ## Module Organization
//!
//! - `models`: application users, conversations, training programs
//! - `auth`: session resolution, identity projection, access gate
//! - `store`: persistence traits with PostgreSQL and in-memory backends
//! - `db`: connection pool and embedded migrations
//! - `llm`: conversational model client

pub mod auth;
pub mod db;
pub mod llm;
pub mod models;
pub mod store;

/// Current version of the FitCoach shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
