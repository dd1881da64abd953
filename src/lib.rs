//! # quadrant
//!
//! A small blocking backend core built around three independent pieces
//! that compose into one request-handling pipeline:
//!
//! - [`decimal`] - arbitrary-precision signed decimals with an explicit
//!   scale, used for exact geometric comparisons
//! - [`json`] - a JSON value tree with a recursive-descent parser, compact
//!   and pretty writers, typed object views and a small schema validator
//! - [`server`] + [`router`] - a blocking TCP listener feeding a bounded
//!   thread pool, an HTTP/1.1 wire parser with keep-alive and pipelining,
//!   and a pattern-based router (`/users/:id`, `/static/*path`)
//!
//! The [`app`] module is the reference application on top of the core: a
//! point-in-region checker over exact decimals, session handling and a
//! background write queue.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use quadrant::router::Router;
//! use quadrant::server::{reply_text, HttpServer, Method, ServerConfig};
//!
//! let mut router = Router::new();
//! router.add_route(Method::Get, "/hello/:name", |req, resp| {
//!     let name = req.path_params.get("name").cloned().unwrap_or_default();
//!     reply_text(resp, 200, &format!("hello {name}"));
//! });
//!
//! let mut server = HttpServer::new(ServerConfig::default(), router);
//! server.start().expect("bind failed");
//! server.join();
//! ```
//!
//! All I/O is blocking; concurrency comes from OS threads. There is no
//! async runtime, no TLS, no HTTP/2 and no chunked request bodies.

pub mod app;
pub mod cli;
pub mod decimal;
pub mod json;
pub mod router;
pub mod server;

pub use decimal::BigDecimal;
pub use json::JsonValue;
pub use router::Router;
pub use server::{HttpRequest, HttpResponse, HttpServer, Method, ServerConfig};
