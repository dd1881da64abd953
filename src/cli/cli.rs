use crate::app::{register_routes, AppContext, MemoryUserRepository, SessionStore, UserService};
use crate::router::Router;
use crate::server::{HttpServer, ServerConfig};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

/// Serve the dot-check API over the blocking HTTP core.
#[derive(Parser, Debug)]
#[command(name = "quadrant")]
#[command(about = "Blocking HTTP/1.1 server with exact-decimal hit testing", long_about = None)]
pub struct Cli {
    /// Bind address: an IPv6 or IPv4 literal, or "::" / "0.0.0.0" for any.
    #[arg(long, default_value = "::")]
    pub addr: String,

    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Worker threads; 0 means hardware concurrency.
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Bounded job-queue length in front of the workers.
    #[arg(long, default_value_t = 1024)]
    pub max_queue: usize,

    /// Maximum request-head size in bytes before replying 431.
    #[arg(long, default_value_t = 64 * 1024)]
    pub max_header_size: usize,

    /// Maximum request-body size in bytes before replying 413.
    #[arg(long, default_value_t = 10 * 1024 * 1024)]
    pub max_body_size: usize,

    /// Socket receive/send timeout in milliseconds; 0 disables.
    #[arg(long, default_value_t = 10_000)]
    pub socket_timeout_ms: u64,

    /// Emit CORS headers on every response.
    #[arg(long, default_value_t = false)]
    pub cors: bool,

    #[arg(long, default_value = "*")]
    pub cors_origin: String,

    #[arg(long, default_value = "GET, POST, PUT, DELETE, OPTIONS, PATCH")]
    pub cors_methods: String,

    #[arg(long, default_value = "Content-Type, Authorization")]
    pub cors_headers: String,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            bind_addr: self.addr,
            port: self.port,
            thread_count: if self.threads == 0 {
                defaults.thread_count
            } else {
                self.threads
            },
            max_queue_size: self.max_queue,
            max_header_size: self.max_header_size,
            max_body_size: self.max_body_size,
            socket_timeout_ms: self.socket_timeout_ms,
            enable_cors: self.cors,
            cors_allow_origin: self.cors_origin,
            cors_allow_methods: self.cors_methods,
            cors_allow_headers: self.cors_headers,
        }
    }
}

/// Parse flags, wire the application together and serve until killed.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.into_config();

    let sessions = Arc::new(SessionStore::new());
    let repo = Arc::new(MemoryUserRepository::new());
    let service = UserService::new(repo, sessions);
    let ctx = Arc::new(AppContext::new(service));

    let mut router = Router::new();
    register_routes(&mut router, ctx);

    let mut server = HttpServer::new(config, router);
    server.start()?;
    info!(
        addr = %server.local_addr().expect("server just started"),
        "quadrant serving"
    );
    server.join();
    Ok(())
}
