//! Server-side sessions keyed by a random cookie value.

use std::collections::HashMap;

use axum::http::{header::COOKIE, HeaderMap};
use parking_lot::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `user` and returns its id.
    pub fn create(&self, user: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.write().insert(id.clone(), user.to_string());
        id
    }

    pub fn user(&self, headers: &HeaderMap) -> Option<String> {
        let id = session_id(headers)?;
        self.sessions.read().get(id).cloned()
    }

    pub fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        session_id(headers).is_some_and(|id| self.sessions.read().contains_key(id))
    }

    /// Drops the caller's session, if any, returning its user.
    pub fn end(&self, headers: &HeaderMap) -> Option<String> {
        let id = session_id(headers)?;
        self.sessions.write().remove(id)
    }
}

/// Finds the session id among the request's `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, id)| id)
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
