//! Process-wide service context.
//!
//! One `Services` value owns the task and user clients over a single shared
//! transport. Hosts construct it once and hand out clones; clones share the
//! caches, so every view observes the same collections.

use std::sync::Arc;

use crate::endpoint::ApiConfig;
use crate::http::{ReqwestTransport, Transport};
use crate::resource::{TaskClient, UserClient};

#[derive(Debug)]
pub struct Services<T> {
    pub tasks: TaskClient<T>,
    pub users: UserClient<T>,
}

impl<T> Clone for Services<T> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            users: self.users.clone(),
        }
    }
}

impl<T: Transport> Services<T> {
    pub fn new(config: ApiConfig, transport: T) -> Self {
        let transport = Arc::new(transport);
        Self {
            tasks: TaskClient::new(config.clone(), Arc::clone(&transport)),
            users: UserClient::new(config, transport),
        }
    }
}

impl Services<ReqwestTransport> {
    /// Services over HTTP with a fresh `reqwest::Client`.
    pub fn connect(config: ApiConfig) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}
