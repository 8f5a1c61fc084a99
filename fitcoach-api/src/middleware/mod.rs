/// Middleware modules for the API server
///
/// Session resolution lives in [`crate::app`] because it needs the
/// application state; this module holds state-free layers.

pub mod security;
