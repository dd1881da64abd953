//! # Server Module
//!
//! The blocking HTTP/1.1 stack, bottom to top:
//!
//! - [`ThreadPool`] - fixed workers over one bounded queue (mutex plus two
//!   condvars); the accept loop uses the non-blocking enqueue so overload
//!   sheds connections instead of stalling accept
//! - [`TcpConnection`] - an accepted socket behind a per-connection lock,
//!   shared by reference between accept and worker
//! - [`TcpServer`] - dual-stack listener plus the accept thread
//! - request/response wire types and the parser ([`HttpRequest`],
//!   [`HttpResponse`], [`Method`], [`QueryParams`])
//! - [`HttpServer`] - the per-connection request loop: limits, body
//!   reading, routing, keep-alive and pipelining
//!
//! Status codes emitted by the core itself (not by handlers): `204` for
//! OPTIONS, `400` for malformed requests, `404`/`405` from routing, `413`
//! for oversized bodies, `431` for oversized headers, `500` for handler
//! panics, `501` for chunked request bodies.

mod config;
mod connection;
mod http_server;
mod request;
mod response;
mod tcp_server;
mod thread_pool;

pub use config::ServerConfig;
pub use connection::TcpConnection;
pub use http_server::HttpServer;
pub use request::{
    parse_query_string, parse_request, url_decode, HttpRequest, InvalidRequestLine, Method,
    QueryParams,
};
pub use response::{
    bad_request, conflict, created, forbidden, no_content, not_found, ok, reason_phrase,
    reply_json, reply_status, reply_text, service_unavailable, unauthorized, HttpResponse,
};
pub use tcp_server::{ConnectionHandler, TcpServer};
pub use thread_pool::ThreadPool;
