use super::models::Dot;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

struct StoreInner {
    /// token -> login
    sessions: HashMap<String, String>,
    /// login -> cached dot history
    dots: HashMap<String, Vec<Dot>>,
}

/// In-process session table and per-user dot cache.
///
/// One mutex guards both maps; every read and mutation takes it. Tokens
/// are 128 random bits rendered as hex.
pub struct SessionStore {
    inner: Mutex<StoreInner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> SessionStore {
        SessionStore {
            inner: Mutex::new(StoreInner {
                sessions: HashMap::new(),
                dots: HashMap::new(),
            }),
        }
    }

    pub fn create_session(&self, login: &str) -> String {
        let token = generate_token();
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(token.clone(), login.to_string());
        token
    }

    pub fn remove_session(&self, token: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.remove(token);
    }

    /// Drop every session of `login` and its cached dots.
    pub fn remove_user(&self, login: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.retain(|_, owner| owner != login);
        inner.dots.remove(login);
    }

    pub fn login_for_token(&self, token: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.sessions.get(token).cloned()
    }

    pub fn set_dots(&self, login: &str, dots: Vec<Dot>) {
        let mut inner = self.inner.lock().unwrap();
        inner.dots.insert(login.to_string(), dots);
    }

    pub fn get_dots(&self, login: &str) -> Vec<Dot> {
        let inner = self.inner.lock().unwrap();
        inner.dots.get(login).cloned().unwrap_or_default()
    }

    pub fn add_dot(&self, login: &str, dot: Dot) {
        let mut inner = self.inner.lock().unwrap();
        inner.dots.entry(login.to_string()).or_default().push(dot);
    }

    pub fn clear_dots(&self, login: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(dots) = inner.dots.get_mut(login) {
            dots.clear();
        }
    }
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    format!("{:016x}{:016x}", rng.gen::<u64>(), rng.gen::<u64>())
}
