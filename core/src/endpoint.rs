//! Endpoint resolution and API configuration.
//!
//! URLs are `base_url + api_prefix + resource path`, with item URLs adding
//! `/{id}`. Defaults are compiled in; `ApiConfig::from_env` lets a host
//! override them.
//!
//! Item URLs always put a `/` between the collection and the id
//! (`/api/v1/tasks/7`). The web portal this client replaces appended the id
//! directly (`/api/v1/tasks7`), which no server route matches.

use std::fmt;

use crate::types::Id;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

pub const BASE_URL_ENV: &str = "TASKDESK_BASE_URL";
pub const API_PREFIX_ENV: &str = "TASKDESK_API_PREFIX";

/// A named REST collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Tasks,
    Users,
}

impl Endpoint {
    /// Relative path of the collection below the API prefix.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Tasks => "/tasks",
            Endpoint::Users => "/users",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    api_prefix: String,
}

impl ApiConfig {
    pub fn new(base_url: &str, api_prefix: &str) -> Self {
        let prefix = api_prefix.trim_end_matches('/');
        let api_prefix = if prefix.is_empty() || prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{prefix}")
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_prefix,
        }
    }

    /// Defaults overridden by `TASKDESK_BASE_URL` / `TASKDESK_API_PREFIX`
    /// when set.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_prefix = std::env::var(API_PREFIX_ENV).unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());
        Self::new(&base_url, &api_prefix)
    }

    /// Same prefix, different server.
    pub fn with_base_url(&self, base_url: &str) -> Self {
        Self::new(base_url, &self.api_prefix)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn collection_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, endpoint.path())
    }

    pub fn item_url(&self, endpoint: Endpoint, id: Id) -> String {
        format!("{}/{id}", self.collection_url(endpoint))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_API_PREFIX)
    }
}
