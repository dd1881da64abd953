use crate::json::JsonValue;
use http::StatusCode;
use std::collections::HashMap;

/// An HTTP response under construction.
///
/// `Content-Length` is always present on the wire: [`HttpResponse::to_bytes`]
/// appends it when the handler did not set one. An empty reason phrase is
/// filled from the status-code table at serialization time.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Default for HttpResponse {
    fn default() -> Self {
        HttpResponse {
            status: 200,
            reason: "OK".to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }
}

/// Default reason phrase for a status code, `"Unknown"` when unassigned.
pub fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}

impl HttpResponse {
    pub fn set_status(&mut self, status: u16, reason: &str) {
        self.status = status;
        self.reason = reason.to_string();
    }

    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Serialize the status line, headers and body with CRLF framing.
    pub fn to_bytes(&self) -> Vec<u8> {
        let reason = if self.reason.is_empty() {
            reason_phrase(self.status)
        } else {
            self.reason.as_str()
        };

        let mut out = Vec::with_capacity(128 + self.body.len());
        out.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", self.status, reason).as_bytes());

        let mut has_content_length = false;
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("content-length") {
                has_content_length = true;
            }
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        if !has_content_length {
            out.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }

        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// Fill in a JSON reply: status, default reason, optional body.
///
/// The content type is `application/json; charset=utf-8` even for empty
/// bodies, matching what API clients expect from these endpoints.
pub fn reply_json(resp: &mut HttpResponse, status: u16, body: Option<&JsonValue>) {
    resp.set_status(status, reason_phrase(status));
    resp.set_header("Content-Type", "application/json; charset=utf-8");
    resp.body = body.map(|v| v.to_json_string().into_bytes()).unwrap_or_default();
}

/// Fill in a plain-text reply; used for core error responses.
pub fn reply_text(resp: &mut HttpResponse, status: u16, body: &str) {
    resp.set_status(status, reason_phrase(status));
    resp.set_header("Content-Type", "text/plain");
    resp.body = body.as_bytes().to_vec();
}

/// Plain-text error whose body is the status reason phrase.
pub fn reply_status(resp: &mut HttpResponse, status: u16) {
    let reason = reason_phrase(status);
    reply_text(resp, status, reason);
}

pub fn ok(resp: &mut HttpResponse, body: Option<&JsonValue>) {
    reply_json(resp, 200, body);
}

pub fn created(resp: &mut HttpResponse, body: Option<&JsonValue>) {
    reply_json(resp, 201, body);
}

pub fn no_content(resp: &mut HttpResponse) {
    reply_json(resp, 204, None);
}

pub fn bad_request(resp: &mut HttpResponse) {
    reply_json(resp, 400, None);
}

pub fn unauthorized(resp: &mut HttpResponse) {
    reply_json(resp, 401, None);
}

pub fn forbidden(resp: &mut HttpResponse) {
    reply_json(resp, 403, None);
}

pub fn not_found(resp: &mut HttpResponse) {
    reply_json(resp, 404, None);
}

pub fn conflict(resp: &mut HttpResponse) {
    reply_json(resp, 409, None);
}

pub fn service_unavailable(resp: &mut HttpResponse) {
    reply_json(resp, 503, None);
}
