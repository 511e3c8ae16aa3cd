//! Request handler module
//!
//! Routing dispatch plus the per-endpoint handlers: file retrieval out of
//! the upload directory, user lookup, and CSRF-protected form submission.

pub mod files;
pub mod router;
pub mod users;

pub use router::handle_request;
