use super::geometry::HitChecker;
use super::models::Dot;
use super::service::{ServiceError, UserService};
use crate::json::{self, FieldRequirement, JsonObjectView, JsonType, JsonValue};
use crate::router::Router;
use crate::server::{
    bad_request, conflict, no_content, not_found, ok, service_unavailable, unauthorized,
    HttpRequest, HttpResponse, Method,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Everything the HTTP handlers need, passed by capture instead of
/// process globals.
pub struct AppContext {
    pub service: UserService,
}

impl AppContext {
    pub fn new(service: UserService) -> AppContext {
        AppContext { service }
    }
}

/// Wire every application endpoint onto the router.
pub fn register_routes(router: &mut Router, ctx: Arc<AppContext>) {
    let c = Arc::clone(&ctx);
    router.add_route(Method::Post, "/api/auth/login", move |req, resp| {
        handle_login(&c, req, resp)
    });
    let c = Arc::clone(&ctx);
    router.add_route(Method::Post, "/api/auth/register", move |req, resp| {
        handle_register(&c, req, resp)
    });
    let c = Arc::clone(&ctx);
    router.add_route(Method::Post, "/api/auth/logout", move |req, resp| {
        handle_logout(&c, req, resp)
    });
    let c = Arc::clone(&ctx);
    router.add_route(Method::Post, "/api/auth/remove", move |req, resp| {
        handle_remove(&c, req, resp)
    });
    router.add_route(Method::Get, "/api/main/time", |_, resp| handle_time(resp));
    let c = Arc::clone(&ctx);
    router.add_route(Method::Post, "/api/main/add", move |req, resp| {
        handle_add_dot(&c, req, resp)
    });
    let c = Arc::clone(&ctx);
    router.add_route(Method::Post, "/api/main/clear", move |req, resp| {
        handle_clear_dots(&c, req, resp)
    });
    let c = Arc::clone(&ctx);
    router.add_route(Method::Get, "/api/main/dots", move |req, resp| {
        handle_get_dots(&c, req, resp)
    });
}

fn current_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn current_iso_local_datetime() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Token from an `Authorization: Bearer <token>` header value.
fn extract_token(auth_header: &str) -> Option<String> {
    let token = auth_header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn login_from_auth(ctx: &AppContext, req: &HttpRequest) -> Option<String> {
    let token = extract_token(req.header("authorization")?)?;
    ctx.service.login_for_token(&token)
}

/// Parse the body as a JSON object and check the given string fields are
/// present; replies 400 and returns `None` on any failure.
fn parse_body_object(
    req: &HttpRequest,
    resp: &mut HttpResponse,
    required: &[&str],
) -> Option<JsonValue> {
    let text = match req.body_text() {
        Some(text) => text,
        None => {
            bad_request(resp);
            return None;
        }
    };
    let root = match json::parse(text) {
        Ok(root) => root,
        Err(err) => {
            warn!(%err, "request body is not valid JSON");
            bad_request(resp);
            return None;
        }
    };
    let schema: Vec<FieldRequirement> = required
        .iter()
        .map(|name| FieldRequirement::required(name, JsonType::String))
        .collect();
    if let Err(err) = json::validate_object_schema(&root, &schema) {
        warn!(%err, "request body failed validation");
        bad_request(resp);
        return None;
    }
    Some(root)
}

fn reply_service_error(resp: &mut HttpResponse, err: ServiceError) {
    match err {
        ServiceError::InvalidCredentials | ServiceError::Unauthorized => unauthorized(resp),
        ServiceError::UserAlreadyExists => conflict(resp),
        ServiceError::UserNotFound => not_found(resp),
        ServiceError::Unavailable => service_unavailable(resp),
    }
}

fn auth_reply(auth: &super::service::AuthResult) -> JsonValue {
    let mut obj = HashMap::new();
    obj.insert("token".to_string(), JsonValue::from(auth.token.as_str()));
    obj.insert(
        "dots".to_string(),
        JsonValue::Array(auth.dots.iter().map(Dot::to_json).collect()),
    );
    JsonValue::Object(obj)
}

fn handle_login(ctx: &AppContext, req: &mut HttpRequest, resp: &mut HttpResponse) {
    let Some(root) = parse_body_object(req, resp, &["login", "password"]) else {
        return;
    };
    let view = JsonObjectView::new(&root).expect("validated as object");
    let login = view.get_string("login").expect("validated field");
    let password = view.get_string("password").expect("validated field");

    match ctx.service.login(login, password) {
        Ok(auth) => ok(resp, Some(&auth_reply(&auth))),
        Err(err) => reply_service_error(resp, err),
    }
}

fn handle_register(ctx: &AppContext, req: &mut HttpRequest, resp: &mut HttpResponse) {
    let Some(root) = parse_body_object(req, resp, &["login", "password"]) else {
        return;
    };
    let view = JsonObjectView::new(&root).expect("validated as object");
    let login = view.get_string("login").expect("validated field");
    let password = view.get_string("password").expect("validated field");

    match ctx.service.register(login, password) {
        Ok(auth) => ok(resp, Some(&auth_reply(&auth))),
        Err(err) => reply_service_error(resp, err),
    }
}

fn handle_logout(ctx: &AppContext, req: &mut HttpRequest, resp: &mut HttpResponse) {
    if let Some(token) = req.header("authorization").and_then(extract_token) {
        ctx.service.logout(&token);
    }
    ok(resp, None);
}

fn handle_remove(ctx: &AppContext, req: &mut HttpRequest, resp: &mut HttpResponse) {
    let Some(login) = login_from_auth(ctx, req) else {
        unauthorized(resp);
        return;
    };
    match ctx.service.remove_user(&login) {
        Ok(()) => no_content(resp),
        Err(err) => reply_service_error(resp, err),
    }
}

fn handle_time(resp: &mut HttpResponse) {
    ok(resp, Some(&JsonValue::from(current_time_millis())));
}

fn handle_add_dot(ctx: &AppContext, req: &mut HttpRequest, resp: &mut HttpResponse) {
    let Some(login) = login_from_auth(ctx, req) else {
        unauthorized(resp);
        return;
    };
    let Some(root) = parse_body_object(req, resp, &["x", "y", "r"]) else {
        return;
    };
    let view = JsonObjectView::new(&root).expect("validated as object");
    let x = view.get_string("x").expect("validated field");
    let y = view.get_string("y").expect("validated field");
    let r = view.get_string("r").expect("validated field");

    let started = current_time_millis();
    let hit = match HitChecker::new().hit_check(x, y, r) {
        Ok(hit) => hit,
        Err(err) => {
            warn!(%err, "rejecting unparsable coordinates");
            bad_request(resp);
            return;
        }
    };
    let dot = Dot {
        x: x.to_string(),
        y: y.to_string(),
        r: r.to_string(),
        hit,
        exec_time_ms: current_time_millis() - started,
        timestamp: current_iso_local_datetime(),
    };

    match ctx.service.add_dot(&login, dot) {
        Ok(dot) => ok(resp, Some(&dot.to_json())),
        Err(err) => reply_service_error(resp, err),
    }
}

fn handle_clear_dots(ctx: &AppContext, req: &mut HttpRequest, resp: &mut HttpResponse) {
    let Some(login) = login_from_auth(ctx, req) else {
        unauthorized(resp);
        return;
    };
    match ctx.service.clear_dots(&login) {
        Ok(()) => ok(resp, None),
        Err(err) => reply_service_error(resp, err),
    }
}

fn handle_get_dots(ctx: &AppContext, req: &mut HttpRequest, resp: &mut HttpResponse) {
    let Some(login) = login_from_auth(ctx, req) else {
        unauthorized(resp);
        return;
    };
    match ctx.service.get_dots(&login) {
        Ok(dots) => {
            let body = JsonValue::Array(dots.iter().map(Dot::to_json).collect());
            ok(resp, Some(&body));
        }
        Err(err) => reply_service_error(resp, err),
    }
}
