use std::collections::HashMap;
use std::fmt;

/// HTTP method of a request line.
///
/// `Unknown` covers any token outside the supported set; the router turns
/// such requests into `400 Bad Request` without consulting routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Unknown,
}

impl Method {
    /// Parse an already-uppercased method token.
    pub fn parse(token: &str) -> Method {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "OPTIONS" => Method::Options,
            "HEAD" => Method::Head,
            _ => Method::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query-string multimap. Duplicate keys keep every value in insertion
/// order; the plain getters return the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key)?.parse().ok()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.parse().ok()
    }

    /// Truthy forms: `1`, `true`, `yes`, `on`; falsy: `0`, `false`, `no`,
    /// `off` (case-insensitive). Anything else is `None`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn insert(&mut self, key: String, value: String) {
        self.params.entry(key).or_default().push(value);
    }
}

/// Decode `+` to space and `%HH` to the raw byte; invalid `%HH` sequences
/// pass through as a literal `%`. Non-UTF-8 results are replaced lossily.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = hex_value(bytes[i + 1]);
                let lo = hex_value(bytes[i + 2]);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push((h << 4) | l);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Split a raw query string on `&`, then each pair on the first `=`.
/// Both sides are URL-decoded; empty keys are dropped.
pub fn parse_query_string(raw: &str) -> QueryParams {
    let mut out = QueryParams::default();
    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (url_decode(k), url_decode(v)),
            None => (url_decode(pair), String::new()),
        };
        if !key.is_empty() {
            out.insert(key, value);
        }
    }
    out
}

/// A parsed HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Original (uppercased) method token from the request line.
    pub method_str: String,
    pub path: String,
    /// Raw query portion of the target, without the leading `?`.
    pub query: String,
    pub query_params: QueryParams,
    pub http_version: String,
    /// Header map with lowercased names and whitespace-trimmed values.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    /// Parameters captured by the router's `:name` / `*name` segments.
    pub path_params: HashMap<String, String>,
}

impl Default for HttpRequest {
    fn default() -> Self {
        HttpRequest {
            method: Method::Unknown,
            method_str: String::new(),
            path: String::new(),
            query: String::new(),
            query_params: QueryParams::default(),
            http_version: String::new(),
            headers: HashMap::new(),
            body: Vec::new(),
            path_params: HashMap::new(),
        }
    }
}

impl HttpRequest {
    /// Header lookup by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name)
    }

    /// Body as text, if it is valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// The receive buffer does not yet contain a full header block, or the
/// request line inside it is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRequestLine;

impl fmt::Display for InvalidRequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("malformed HTTP request line")
    }
}

impl std::error::Error for InvalidRequestLine {}

/// Try to parse one request head from the receive buffer.
///
/// Returns `Ok(None)` until the `\r\n\r\n` delimiter has arrived. On
/// success the returned length is the number of bytes consumed by the
/// header block including the delimiter; the body is NOT read here.
/// A present delimiter with an unparsable request line is an error and
/// maps to `400 Bad Request` upstream.
///
/// Header lines without a `:` are silently ignored. Names are lowercased,
/// values trimmed. Later duplicates of a header overwrite earlier ones.
pub fn parse_request(buffer: &[u8]) -> Result<Option<(HttpRequest, usize)>, InvalidRequestLine> {
    const DELIMITER: &[u8] = b"\r\n\r\n";

    let Some(pos) = buffer.windows(DELIMITER.len()).position(|w| w == DELIMITER) else {
        return Ok(None);
    };
    let header_len = pos + DELIMITER.len();

    // Tolerate stray non-UTF-8 bytes in headers; the request line must be
    // clean ASCII to parse at all.
    let head = String::from_utf8_lossy(&buffer[..pos]);
    let mut lines = head.split("\r\n");

    let request_line = lines.next().ok_or(InvalidRequestLine)?;
    let mut parts = request_line.split_whitespace();
    let (method_token, target, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v)) => (m, t, v),
        _ => return Err(InvalidRequestLine),
    };

    let mut req = HttpRequest {
        method_str: method_token.to_ascii_uppercase(),
        http_version: version.to_string(),
        ..HttpRequest::default()
    };
    req.method = Method::parse(&req.method_str);

    match target.split_once('?') {
        Some((path, query)) => {
            req.path = path.to_string();
            req.query = query.to_string();
            req.query_params = parse_query_string(query);
        }
        None => {
            req.path = target.to_string();
        }
    }

    for line in lines {
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        req.headers
            .insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(Some((req, header_len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("a+b"), "a b");
        assert_eq!(url_decode("a%20b"), "a b");
        assert_eq!(url_decode("%41%42"), "AB");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
        assert_eq!(url_decode("caf%C3%A9"), "café");
    }

    #[test]
    fn test_parse_query_string() {
        let q = parse_query_string("name=John&age=25&tag=a&tag=b&flag");
        assert_eq!(q.get("name"), Some("John"));
        assert_eq!(q.get_i64("age"), Some(25));
        assert_eq!(q.get_all("tag"), ["a".to_string(), "b".to_string()]);
        assert_eq!(q.get("flag"), Some(""));
        assert_eq!(q.get("missing"), None);
    }

    #[test]
    fn test_query_typed_getters() {
        let q = parse_query_string("n=2.5&yes=on&no=OFF&bad=maybe");
        assert_eq!(q.get_f64("n"), Some(2.5));
        assert_eq!(q.get_bool("yes"), Some(true));
        assert_eq!(q.get_bool("no"), Some(false));
        assert_eq!(q.get_bool("bad"), None);
    }

    #[test]
    fn test_parse_request_head() {
        let raw = b"GET /hello/world?name=John&age=25 HTTP/1.1\r\nHost: localhost\r\nX-Extra:  padded  \r\n\r\n";
        let (req, consumed) = parse_request(raw).unwrap().unwrap();
        assert_eq!(consumed, raw.len());
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.method_str, "GET");
        assert_eq!(req.path, "/hello/world");
        assert_eq!(req.query, "name=John&age=25");
        assert_eq!(req.query_params.get("name"), Some("John"));
        assert_eq!(req.query_params.get_i64("age"), Some(25));
        assert_eq!(req.http_version, "HTTP/1.1");
        assert_eq!(req.header("host"), Some("localhost"));
        assert_eq!(req.header("X-Extra"), Some("padded"));
    }

    #[test]
    fn test_parse_request_incomplete() {
        assert_eq!(parse_request(b"GET / HTTP/1.1\r\nHost: x\r\n"), Ok(None));
    }

    #[test]
    fn test_parse_request_bad_start_line() {
        assert!(parse_request(b"GARBAGE\r\n\r\n").is_err());
        assert!(parse_request(b"GET /\r\n\r\n").is_err());
    }

    #[test]
    fn test_header_without_colon_ignored() {
        let raw = b"GET / HTTP/1.1\r\nthis line has no colon\r\nHost: x\r\n\r\n";
        let (req, _) = parse_request(raw).unwrap().unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("host"), Some("x"));
    }

    #[test]
    fn test_method_tokens() {
        assert_eq!(Method::parse("GET"), Method::Get);
        assert_eq!(Method::parse("DELETE"), Method::Delete);
        assert_eq!(Method::parse("BREW"), Method::Unknown);
        assert_eq!(Method::Get.as_str(), "GET");
    }
}
