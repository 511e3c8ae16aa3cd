//! Security utilities module
//!
//! CSRF token issuing/verification and HTML escaping. Both are deliberately
//! small; the interesting part of this server is where they are (and are not)
//! applied.

pub mod csrf;
pub mod escape;

pub use csrf::CsrfSigner;
pub use escape::escape_html;
