use super::models::{DbTask, Dot};
use super::store::SessionStore;
use super::writer::WriteQueue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Application-level failure, mapped to a status code by the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    InvalidCredentials,
    UserAlreadyExists,
    UserNotFound,
    Unauthorized,
    /// The backing store is unreachable.
    Unavailable,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ServiceError::InvalidCredentials => "invalid credentials",
            ServiceError::UserAlreadyExists => "user already exists",
            ServiceError::UserNotFound => "user not found",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Unavailable => "backing store unavailable",
        };
        f.write_str(text)
    }
}

impl std::error::Error for ServiceError {}

/// Durable user storage, the part this crate treats as a collaborator.
///
/// Real deployments implement this over a relational store with prepared
/// statements; [`MemoryUserRepository`] below is the in-process stand-in.
/// Every method may fail with [`ServiceError::Unavailable`].
pub trait UserRepository: Send + Sync {
    /// False when the login is already taken.
    fn create_user(&self, login: &str, password: &str) -> Result<bool, ServiceError>;
    fn check_password(&self, login: &str, password: &str) -> Result<bool, ServiceError>;
    /// False when no such user existed.
    fn delete_user(&self, login: &str) -> Result<bool, ServiceError>;
    fn insert_dot(&self, login: &str, dot: &Dot) -> Result<(), ServiceError>;
    fn load_dots(&self, login: &str) -> Result<Vec<Dot>, ServiceError>;
    fn clear_dots(&self, login: &str) -> Result<(), ServiceError>;
}

/// Hash-map implementation of [`UserRepository`] behind a single mutex.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<String, StoredUser>>,
}

struct StoredUser {
    password: String,
    dots: Vec<Dot>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserRepository {
    fn create_user(&self, login: &str, password: &str) -> Result<bool, ServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(login) {
            return Ok(false);
        }
        users.insert(
            login.to_string(),
            StoredUser {
                password: password.to_string(),
                dots: Vec::new(),
            },
        );
        Ok(true)
    }

    fn check_password(&self, login: &str, password: &str) -> Result<bool, ServiceError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .get(login)
            .is_some_and(|user| user.password == password))
    }

    fn delete_user(&self, login: &str) -> Result<bool, ServiceError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.remove(login).is_some())
    }

    fn insert_dot(&self, login: &str, dot: &Dot) -> Result<(), ServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(login) {
            user.dots.push(dot.clone());
        }
        Ok(())
    }

    fn load_dots(&self, login: &str) -> Result<Vec<Dot>, ServiceError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(login).map(|u| u.dots.clone()).unwrap_or_default())
    }

    fn clear_dots(&self, login: &str) -> Result<(), ServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(login) {
            user.dots.clear();
        }
        Ok(())
    }
}

/// Token plus the dot history loaded at sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResult {
    pub token: String,
    pub dots: Vec<Dot>,
}

/// Account and dot workflows over a repository, the session store and the
/// background write queue.
///
/// Reads prefer the session store's cache and fall back to the
/// repository; dot writes go to the cache synchronously and to the
/// repository through the queue.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    sessions: Arc<SessionStore>,
    write_queue: WriteQueue,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, sessions: Arc<SessionStore>) -> UserService {
        let sink_repo = Arc::clone(&repo);
        let write_queue = WriteQueue::new(move |task: DbTask| {
            let _ = sink_repo.insert_dot(&task.login, &task.dot);
        });
        UserService {
            repo,
            sessions,
            write_queue,
        }
    }

    pub fn login(&self, login: &str, password: &str) -> Result<AuthResult, ServiceError> {
        if !self.repo.check_password(login, password)? {
            return Err(ServiceError::InvalidCredentials);
        }

        let dots = self.repo.load_dots(login)?;
        self.sessions.set_dots(login, dots.clone());
        let token = self.sessions.create_session(login);
        info!(login, "user logged in");
        Ok(AuthResult { token, dots })
    }

    pub fn register(&self, login: &str, password: &str) -> Result<AuthResult, ServiceError> {
        if !self.repo.create_user(login, password)? {
            return Err(ServiceError::UserAlreadyExists);
        }

        self.sessions.set_dots(login, Vec::new());
        let token = self.sessions.create_session(login);
        info!(login, "user registered");
        Ok(AuthResult {
            token,
            dots: Vec::new(),
        })
    }

    pub fn logout(&self, token: &str) {
        self.sessions.remove_session(token);
    }

    pub fn remove_user(&self, login: &str) -> Result<(), ServiceError> {
        if !self.repo.delete_user(login)? {
            return Err(ServiceError::UserNotFound);
        }
        self.sessions.remove_user(login);
        info!(login, "user removed");
        Ok(())
    }

    pub fn login_for_token(&self, token: &str) -> Option<String> {
        self.sessions.login_for_token(token)
    }

    /// Cache the dot immediately and hand persistence to the writer.
    pub fn add_dot(&self, login: &str, dot: Dot) -> Result<Dot, ServiceError> {
        self.sessions.add_dot(login, dot.clone());
        self.write_queue.push(DbTask {
            login: login.to_string(),
            dot: dot.clone(),
        });
        Ok(dot)
    }

    pub fn clear_dots(&self, login: &str) -> Result<(), ServiceError> {
        self.repo.clear_dots(login)?;
        self.sessions.clear_dots(login);
        Ok(())
    }

    /// Cached history when warm, otherwise reload from the repository.
    pub fn get_dots(&self, login: &str) -> Result<Vec<Dot>, ServiceError> {
        let cached = self.sessions.get_dots(login);
        if !cached.is_empty() {
            return Ok(cached);
        }
        let dots = self.repo.load_dots(login)?;
        self.sessions.set_dots(login, dots.clone());
        Ok(dots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> UserService {
        UserService::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(SessionStore::new()),
        )
    }

    fn dot(x: &str) -> Dot {
        Dot {
            x: x.to_string(),
            y: "0".to_string(),
            r: "1".to_string(),
            hit: false,
            exec_time_ms: 1,
            timestamp: "2024-01-01T00:00:00".to_string(),
        }
    }

    #[test]
    fn test_register_then_login() {
        let svc = service();
        let reg = svc.register("alice", "secret").unwrap();
        assert!(reg.dots.is_empty());
        assert_eq!(
            svc.login_for_token(&reg.token).as_deref(),
            Some("alice")
        );

        let auth = svc.login("alice", "secret").unwrap();
        assert_ne!(auth.token, reg.token);

        assert_eq!(
            svc.login("alice", "wrong"),
            Err(ServiceError::InvalidCredentials)
        );
        assert_eq!(
            svc.login("nobody", "x"),
            Err(ServiceError::InvalidCredentials)
        );
    }

    #[test]
    fn test_duplicate_register_conflicts() {
        let svc = service();
        svc.register("alice", "a").unwrap();
        assert_eq!(
            svc.register("alice", "b"),
            Err(ServiceError::UserAlreadyExists)
        );
    }

    #[test]
    fn test_logout_invalidates_token() {
        let svc = service();
        let auth = svc.register("alice", "a").unwrap();
        svc.logout(&auth.token);
        assert_eq!(svc.login_for_token(&auth.token), None);
    }

    #[test]
    fn test_remove_user() {
        let svc = service();
        let auth = svc.register("alice", "a").unwrap();
        svc.remove_user("alice").unwrap();
        assert_eq!(svc.login_for_token(&auth.token), None);
        assert_eq!(svc.remove_user("alice"), Err(ServiceError::UserNotFound));
        // The login is free again.
        svc.register("alice", "a").unwrap();
    }

    #[test]
    fn test_dot_roundtrip_through_cache() {
        let svc = service();
        svc.register("alice", "a").unwrap();
        svc.add_dot("alice", dot("0.5")).unwrap();
        svc.add_dot("alice", dot("0.7")).unwrap();

        let dots = svc.get_dots("alice").unwrap();
        assert_eq!(dots.len(), 2);
        assert_eq!(dots[0].x, "0.5");

        svc.clear_dots("alice").unwrap();
        assert!(svc.get_dots("alice").unwrap().is_empty());
    }
}
