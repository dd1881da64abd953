use crate::server::{reply_status, HttpRequest, HttpResponse, Method};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// A route handler: mutates the response in place.
pub type Handler = Arc<dyn Fn(&mut HttpRequest, &mut HttpResponse) + Send + Sync>;

struct Route {
    method: String,
    pattern: String,
    handler: Handler,
}

/// Ordered route table; see the [module docs](crate::router) for the
/// pattern grammar and dispatch rules.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Router {
        Router { routes: Vec::new() }
    }

    /// Register a handler for a supported method.
    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F)
    where
        F: Fn(&mut HttpRequest, &mut HttpResponse) + Send + Sync + 'static,
    {
        self.add_route_token(method.as_str(), pattern, handler);
    }

    /// Register a handler under an arbitrary method token (uppercased).
    pub fn add_route_token<F>(&mut self, method: &str, pattern: &str, handler: F)
    where
        F: Fn(&mut HttpRequest, &mut HttpResponse) + Send + Sync + 'static,
    {
        let method = method.to_ascii_uppercase();
        info!(%method, pattern, "route registered");
        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
        });
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route a request, filling in the response.
    ///
    /// Returns true when a handler ran. Scans routes in registration
    /// order, collecting the allowed-method set over every pattern match;
    /// a method mismatch across all matches becomes `405` with `Allow`,
    /// no pattern match becomes `404`. An empty or unknown method token
    /// short-circuits to `400` without consulting the table.
    pub fn dispatch(&self, req: &mut HttpRequest, resp: &mut HttpResponse) -> bool {
        if req.method_str.is_empty() || req.method == Method::Unknown {
            reply_status(resp, 400);
            return false;
        }

        let mut allowed: BTreeSet<&str> = BTreeSet::new();

        for route in &self.routes {
            let mut params = HashMap::new();
            if !match_pattern(&route.pattern, &req.path, &mut params) {
                continue;
            }
            allowed.insert(route.method.as_str());
            if route.method == req.method_str {
                debug!(method = %route.method, pattern = %route.pattern, path = %req.path, "route matched");
                req.path_params = params;
                (route.handler)(req, resp);
                return true;
            }
        }

        if !allowed.is_empty() {
            let allow = allowed.into_iter().collect::<Vec<_>>().join(", ");
            reply_status(resp, 405);
            resp.set_header("Allow", &allow);
            return false;
        }

        debug!(path = %req.path, "no route matched");
        reply_status(resp, 404);
        false
    }
}

/// Pull the next `/`-separated segment out of `s` starting at `*pos`.
fn next_segment<'a>(s: &'a str, pos: &mut usize) -> &'a str {
    if *pos >= s.len() {
        return "";
    }
    if s.as_bytes()[*pos] == b'/' {
        *pos += 1;
    }
    if *pos >= s.len() {
        return "";
    }
    let end = s[*pos..]
        .find('/')
        .map(|off| *pos + off)
        .unwrap_or(s.len());
    let segment = &s[*pos..end];
    *pos = end;
    segment
}

/// Segment-by-segment pattern match, filling `params` with `:name` and
/// `*name` captures. Succeeds only when pattern and path run out together
/// or a `*` capture swallows the remainder.
pub(crate) fn match_pattern(
    pattern: &str,
    path: &str,
    params: &mut HashMap<String, String>,
) -> bool {
    params.clear();

    let mut i = 0usize;
    let mut j = 0usize;

    loop {
        let pseg = next_segment(pattern, &mut i);
        let sseg = next_segment(path, &mut j);

        let pattern_done = pseg.is_empty() && i >= pattern.len();
        let path_done = sseg.is_empty() && j >= path.len();

        if pattern_done && path_done {
            return true;
        }
        if pseg.is_empty() && !pattern_done {
            return false;
        }

        if let Some(name) = pseg.strip_prefix('*') {
            // Re-derive the capture from the original path so it keeps any
            // interior slashes.
            let rest = if sseg.is_empty() {
                String::new()
            } else {
                path[j - sseg.len()..].to_string()
            };
            params.insert(name.to_string(), rest);
            return true;
        }

        if path_done && !pattern_done {
            return false;
        }

        if let Some(name) = pseg.strip_prefix(':') {
            params.insert(name.to_string(), sseg.to_string());
        } else if pseg != sseg {
            return false;
        }
    }
}
