/// Server configuration with production-safe defaults.
///
/// `bind_addr` accepts an IPv6 literal, an IPv4 literal, or `::` /
/// `0.0.0.0` / empty for any-address. The listener is dual-stack by
/// default: IPv6 with `IPV6_V6ONLY` off, falling back to plain IPv4 when
/// an IPv4 literal cannot be bound over IPv6.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Worker thread count; defaults to the hardware concurrency.
    pub thread_count: usize,
    /// Bounded job-queue length in front of the workers.
    pub max_queue_size: usize,
    /// Reject request heads larger than this with `431`.
    pub max_header_size: usize,
    /// Reject declared bodies larger than this with `413`.
    pub max_body_size: usize,
    /// Per-socket receive/send timeout; 0 disables.
    pub socket_timeout_ms: u64,
    pub enable_cors: bool,
    pub cors_allow_origin: String,
    pub cors_allow_methods: String,
    pub cors_allow_headers: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "::".to_string(),
            port: 8080,
            thread_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_queue_size: 1024,
            max_header_size: 64 * 1024,
            max_body_size: 10 * 1024 * 1024,
            socket_timeout_ms: 10_000,
            enable_cors: false,
            cors_allow_origin: "*".to_string(),
            cors_allow_methods: "GET, POST, PUT, DELETE, OPTIONS, PATCH".to_string(),
            cors_allow_headers: "Content-Type, Authorization".to_string(),
        }
    }
}
