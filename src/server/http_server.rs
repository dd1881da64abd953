use super::config::ServerConfig;
use super::connection::TcpConnection;
use super::request::{parse_request, Method};
use super::response::{reason_phrase, reply_text, HttpResponse};
use super::tcp_server::TcpServer;
use crate::router::Router;
use std::io;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// HTTP/1.1 server: a [`TcpServer`] whose connection handler runs the
/// request loop below against a fixed [`Router`].
///
/// Per connection, the worker repeats: buffer bytes until the blank line,
/// enforce the header and body limits, read the declared body, route, and
/// write the serialized response back - honoring keep-alive so several
/// requests (pipelined or sequential) reuse one socket. The route table is
/// frozen at construction; handlers only ever observe a consistent
/// snapshot.
pub struct HttpServer {
    config: ServerConfig,
    tcp: TcpServer,
}

struct ConnState {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Build a server from a finished route table. Routes cannot change
    /// after this point.
    pub fn new(config: ServerConfig, router: Router) -> HttpServer {
        let state = Arc::new(ConnState {
            config: config.clone(),
            router,
        });
        let tcp = TcpServer::new(
            &config.bind_addr,
            config.port,
            config.thread_count,
            config.max_queue_size,
            Arc::new(move |conn: Arc<TcpConnection>| {
                handle_connection(&state, &conn);
            }),
        );
        HttpServer { config, tcp }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind and start serving. Fatal on bind/listen failure.
    pub fn start(&mut self) -> io::Result<()> {
        self.tcp.start()
    }

    pub fn stop(&mut self) {
        self.tcp.stop();
    }

    pub fn is_running(&self) -> bool {
        self.tcp.is_running()
    }

    /// Bound address once started (real port when configured with 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.tcp.local_addr()
    }

    /// Park the calling thread while the server runs.
    pub fn join(&self) {
        while self.is_running() {
            std::thread::sleep(Duration::from_millis(100));
        }
    }
}

/// Send a final error response and leave; the connection closes after.
fn send_error(conn: &TcpConnection, status: u16, body: &str) {
    let mut resp = HttpResponse::default();
    reply_text(&mut resp, status, body);
    resp.set_header("Connection", "close");
    conn.send_all(&resp.to_bytes());
}

fn handle_connection(state: &ConnState, conn: &TcpConnection) {
    let config = &state.config;

    if config.socket_timeout_ms > 0 {
        conn.set_timeout(Some(Duration::from_millis(config.socket_timeout_ms)));
    }

    let mut buffer: Vec<u8> = Vec::with_capacity(8192);
    let mut chunk = [0u8; 4096];

    loop {
        // Header phase: accumulate until the \r\n\r\n delimiter shows up.
        let (mut req, header_len) = loop {
            if buffer.len() > config.max_header_size {
                send_error(conn, 431, "Request headers too large");
                return;
            }
            match parse_request(&buffer) {
                Err(_) => {
                    send_error(conn, 400, reason_phrase(400));
                    return;
                }
                Ok(Some(parsed)) => break parsed,
                Ok(None) => {
                    let n = conn.recv(&mut chunk);
                    if n == 0 {
                        return;
                    }
                    buffer.extend_from_slice(&chunk[..n]);
                }
            }
        };

        // Chunked request bodies are out of scope for this server.
        if req
            .header("transfer-encoding")
            .is_some_and(|te| te.to_ascii_lowercase().contains("chunked"))
        {
            send_error(conn, 501, "Chunked transfer encoding not supported");
            return;
        }

        let mut content_length = 0usize;
        if let Some(raw) = req.header("content-length") {
            match raw.parse::<u64>() {
                Ok(v) if v as usize > config.max_body_size => {
                    send_error(conn, 413, reason_phrase(413));
                    return;
                }
                Ok(v) => content_length = v as usize,
                Err(_) => {
                    send_error(conn, 400, "Invalid Content-Length");
                    return;
                }
            }
        }

        // Body phase: bytes already buffered first, then the socket.
        let already_buffered = buffer.len() - header_len;
        if content_length > 0 {
            let mut body = Vec::with_capacity(content_length);
            if already_buffered >= content_length {
                body.extend_from_slice(&buffer[header_len..header_len + content_length]);
            } else {
                body.extend_from_slice(&buffer[header_len..]);
                let mut remaining = content_length - body.len();
                while remaining > 0 {
                    let want = remaining.min(chunk.len());
                    let n = conn.recv(&mut chunk[..want]);
                    if n == 0 {
                        break;
                    }
                    body.extend_from_slice(&chunk[..n]);
                    remaining -= n;
                }
                if body.len() < content_length {
                    send_error(conn, 400, "Incomplete request body");
                    return;
                }
            }
            req.body = body;
        }

        // HTTP/1.0 opts in to keep-alive; HTTP/1.1 opts out of it.
        let connection_header = req
            .header("connection")
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();
        let keep_alive = if req.http_version.eq_ignore_ascii_case("HTTP/1.0") {
            connection_header == "keep-alive"
        } else {
            connection_header != "close"
        };

        let mut resp = HttpResponse::default();

        if config.enable_cors {
            resp.set_header("Access-Control-Allow-Origin", &config.cors_allow_origin);
            resp.set_header("Access-Control-Allow-Methods", &config.cors_allow_methods);
            resp.set_header("Access-Control-Allow-Headers", &config.cors_allow_headers);
        }

        if req.method == Method::Options {
            resp.set_status(204, "No Content");
            resp.body.clear();
        } else {
            debug!(method = %req.method_str, path = %req.path, "dispatching request");
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                state.router.dispatch(&mut req, &mut resp)
            }));
            if let Err(panic) = outcome {
                error!(?panic, path = %req.path, "handler panicked");
                resp.headers.remove("Content-Type");
                reply_text(&mut resp, 500, reason_phrase(500));
            }
        }

        let connection_value = if keep_alive { "keep-alive" } else { "close" };
        resp.set_header("Connection", connection_value);

        conn.send_all(&resp.to_bytes());

        // Compact the receive buffer; leftover bytes belong to the next
        // pipelined request.
        let consumed = header_len + content_length;
        if buffer.len() > consumed {
            buffer.drain(..consumed);
        } else {
            buffer.clear();
        }

        if !keep_alive {
            return;
        }
    }
}
