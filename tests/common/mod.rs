#![allow(dead_code)]

pub mod test_server {
    use quadrant::router::Router;
    use quadrant::server::{HttpServer, ServerConfig};
    use std::net::SocketAddr;
    use std::sync::Once;

    static TRACING_INIT: Once = Once::new();

    /// Install a test subscriber once per process; RUST_LOG controls it.
    pub fn init_tracing() {
        TRACING_INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "warn".into()),
                )
                .with_test_writer()
                .try_init();
        });
    }

    /// Start a server on an ephemeral loopback port.
    pub fn start(router: Router, configure: impl FnOnce(&mut ServerConfig)) -> (HttpServer, SocketAddr) {
        init_tracing();
        let mut config = ServerConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            socket_timeout_ms: 1_000,
            ..ServerConfig::default()
        };
        configure(&mut config);
        let mut server = HttpServer::new(config, router);
        server.start().expect("server failed to start");
        let addr = server.local_addr().expect("server has no local addr");
        (server, addr)
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// Open a fresh connection, send one raw request and read one response.
    pub fn send_request(addr: &SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).expect("connect failed");
        stream.write_all(request.as_bytes()).expect("write failed");
        read_responses(&mut stream, 1).remove(0)
    }

    /// Read exactly `count` complete HTTP responses off one stream,
    /// honoring each response's Content-Length for framing.
    pub fn read_responses(stream: &mut TcpStream, count: usize) -> Vec<String> {
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set_read_timeout failed");

        let mut buf: Vec<u8> = Vec::new();
        let mut responses = Vec::with_capacity(count);

        while responses.len() < count {
            if let Some((total, _)) = frame_length(&buf) {
                if buf.len() >= total {
                    let bytes: Vec<u8> = buf.drain(..total).collect();
                    responses.push(String::from_utf8_lossy(&bytes).into_owned());
                    continue;
                }
            }

            let mut chunk = [0u8; 4096];
            match stream.read(&mut chunk) {
                Ok(0) => panic!(
                    "peer closed after {} of {} responses; buffered: {:?}",
                    responses.len(),
                    count,
                    String::from_utf8_lossy(&buf)
                ),
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(err) => panic!("read failed: {err}"),
            }
        }

        responses
    }

    /// Total frame size (headers + body) of the first buffered response,
    /// if its header block is complete.
    fn frame_length(buf: &[u8]) -> Option<(usize, usize)> {
        let header_end = buf.windows(4).position(|w| w == b"\r\n\r\n")? + 4;
        let head = String::from_utf8_lossy(&buf[..header_end]);
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        Some((header_end + content_length, header_end))
    }

    /// Split a raw response into (status, headers, body).
    pub fn parse_response(raw: &str) -> (u16, Vec<(String, String)>, String) {
        let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));
        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|code| code.parse().ok())
            .unwrap_or(0);
        let headers = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_lowercase(), value.trim().to_string()))
            .collect();
        (status, headers, body.to_string())
    }

    /// First header value by case-insensitive name.
    pub fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        let name = name.to_lowercase();
        headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}
