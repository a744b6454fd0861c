use std::path::PathBuf;

use trending_core::refresh::RefreshPolicy;

/// Which endpoints require a logged-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Nothing is gated.
    Open,
    /// Search, refresh and the data APIs require a session.
    #[default]
    Gated,
}

/// The single accepted login. Compared as plain text.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub region: String,
    pub refresh_limit: usize,
    pub access: AccessMode,
    pub refresh_policy: RefreshPolicy,
    pub credentials: Credentials,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            data_file: PathBuf::from("./data/trending_IN.csv"),
            region: "IN".to_string(),
            refresh_limit: 100,
            access: AccessMode::default(),
            refresh_policy: RefreshPolicy::default(),
            credentials: Credentials::default(),
            allowed_origins: vec![
                "http://127.0.0.1:5500".to_string(),
                "http://localhost:5500".to_string(),
                "null".to_string(),
            ],
        }
    }
}
