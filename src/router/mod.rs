//! # Router Module
//!
//! Ordered, pattern-based request routing.
//!
//! Patterns are `/`-separated segments: a literal must match exactly,
//! `:name` captures one segment, and `*name` captures the rest of the path
//! (slashes included) and ends matching. Routes are tried in registration
//! order; the first one whose pattern and method both match wins and its
//! captures are installed on the request as path parameters.
//!
//! Dispatch outcomes when nothing wins: `405 Method Not Allowed` with an
//! `Allow` header when some route matched the path but not the method,
//! `404 Not Found` when none matched, and `400 Bad Request` up front for
//! an empty or unknown method token.

mod core;

pub use core::{Handler, Router};
