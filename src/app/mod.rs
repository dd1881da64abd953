//! # App Module
//!
//! The reference application on top of the core: exact-decimal hit
//! checking for a three-region target, token sessions with a per-user dot
//! cache, and a single-consumer background write queue in front of the
//! persistent store.
//!
//! Handlers receive their collaborators through [`AppContext`]; there are
//! no process-wide globals.

mod geometry;
mod handlers;
mod models;
mod service;
mod store;
mod writer;

pub use geometry::HitChecker;
pub use handlers::{register_routes, AppContext};
pub use models::{DbTask, Dot};
pub use service::{
    AuthResult, MemoryUserRepository, ServiceError, UserRepository, UserService,
};
pub use store::SessionStore;
pub use writer::WriteQueue;
