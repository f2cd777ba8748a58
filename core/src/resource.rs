//! Stateful resource client: CRUD over a `Transport` plus a reactive cache
//! of the last listed collection.
//!
//! # Design
//! - `list` replaces the cache with the response and publishes it.
//! - `get` never touches the cache.
//! - `create`, `update` and `delete` spawn a detached default-page `list`
//!   after success instead of patching the cache locally, so the cache always
//!   mirrors what the server returned. The refresh is not joined back to the
//!   caller; its failure is logged and leaves the cache as it was.
//! - Any failure returns before the cache is written.
//!
//! Responses are applied in arrival order. There is no sequencing token, so
//! a slow `list` can overwrite a newer refresh. In-flight requests are not
//! cancellable.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{Cache, Snapshot, Subscription};
use crate::client::{Resource, ResourceApi, Tasks, Users, DEFAULT_LIMIT, DEFAULT_OFFSET};
use crate::endpoint::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::Id;
use crate::validate::Validate;

pub type TaskClient<T> = ResourceClient<Tasks, T>;
pub type UserClient<T> = ResourceClient<Users, T>;

/// Cloning shares the transport and the cache.
pub struct ResourceClient<R: Resource, T> {
    api: ResourceApi<R>,
    transport: Arc<T>,
    cache: Arc<Cache<R::Entity>>,
}

impl<R: Resource, T> Clone for ResourceClient<R, T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            transport: Arc::clone(&self.transport),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<R: Resource, T> fmt::Debug for ResourceClient<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("endpoint", &R::ENDPOINT)
            .field("cached", &self.cache.snapshot().len())
            .finish()
    }
}

impl<R: Resource, T: Transport> ResourceClient<R, T> {
    pub fn new(config: ApiConfig, transport: Arc<T>) -> Self {
        Self {
            api: ResourceApi::new(config),
            transport,
            cache: Arc::new(Cache::new()),
        }
    }

    pub fn api(&self) -> &ResourceApi<R> {
        &self.api
    }

    /// Latest published collection; empty until the first successful list.
    pub fn snapshot(&self) -> Snapshot<R::Entity> {
        self.cache.snapshot()
    }

    pub fn subscribe(&self) -> Subscription<R::Entity> {
        self.cache.subscribe()
    }

    /// Fetch one page and make it the cached collection.
    pub async fn list(&self, offset: u32, limit: u32) -> Result<Vec<R::Entity>, ApiError> {
        let response = self.send(self.api.build_list(offset, limit)).await?;
        let items = self.api.parse_list(response)?;
        debug!(endpoint = %R::ENDPOINT, count = items.len(), "publishing list");
        self.cache.publish(items.clone());
        Ok(items)
    }

    pub async fn list_default(&self) -> Result<Vec<R::Entity>, ApiError> {
        self.list(DEFAULT_OFFSET, DEFAULT_LIMIT).await
    }

    pub async fn get(&self, id: Id) -> Result<R::Entity, ApiError> {
        let response = self.send(self.api.build_get(id)).await?;
        self.api.parse_get(response)
    }

    pub async fn create(&self, input: &R::Create) -> Result<R::Entity, ApiError> {
        input.validate()?;
        let response = self.send(self.api.build_create(input)?).await?;
        let created = self.api.parse_create(response)?;
        self.spawn_refresh();
        Ok(created)
    }

    pub async fn update(&self, id: Id, input: &R::Update) -> Result<R::Entity, ApiError> {
        input.validate()?;
        let response = self.send(self.api.build_update(id, input)?).await?;
        let updated = self.api.parse_update(response)?;
        self.spawn_refresh();
        Ok(updated)
    }

    pub async fn delete(&self, id: Id) -> Result<(), ApiError> {
        let response = self.send(self.api.build_delete(id)).await?;
        self.api.parse_delete(response)?;
        self.spawn_refresh();
        Ok(())
    }

    /// Detached default-page list. The handle is returned for callers that
    /// want to wait on it; dropping it does not cancel the refresh.
    ///
    /// Without a tokio runtime the refresh is skipped and `None` returned; the
    /// mutation that triggered it has already succeeded on the server.
    pub fn spawn_refresh(&self) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!(endpoint = %R::ENDPOINT, "no tokio runtime, skipping background refresh");
            return None;
        };
        let client = self.clone();
        Some(runtime.spawn(async move {
            if let Err(error) = client.list_default().await {
                warn!(endpoint = %R::ENDPOINT, %error, "background refresh failed");
            }
        }))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}
