//! Stateless HTTP request builder and response parser for one resource.
//!
//! # Design
//! `ResourceApi` holds only an `ApiConfig` and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `ResourceClient` drives the round-trip in between; the
//! split keeps request shapes and status handling testable without I/O.
//!
//! The entity and DTO types come from a `Resource` descriptor, so the same
//! builder serves tasks and users.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::endpoint::{ApiConfig, Endpoint};
use crate::error::{extract_detail, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Id, Task, TaskCreate, TaskUpdate, User, UserCreate, UserUpdate};
use crate::validate::Validate;

pub const DEFAULT_OFFSET: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 100;

/// Ties a REST collection to its entity and DTO types.
pub trait Resource: Send + Sync + 'static {
    type Entity: DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;
    type Create: Serialize + Validate + Send + Sync;
    type Update: Serialize + Validate + Send + Sync;

    const ENDPOINT: Endpoint;
}

#[derive(Debug, Clone, Copy)]
pub struct Tasks;

impl Resource for Tasks {
    type Entity = Task;
    type Create = TaskCreate;
    type Update = TaskUpdate;

    const ENDPOINT: Endpoint = Endpoint::Tasks;
}

#[derive(Debug, Clone, Copy)]
pub struct Users;

impl Resource for Users {
    type Entity = User;
    type Create = UserCreate;
    type Update = UserUpdate;

    const ENDPOINT: Endpoint = Endpoint::Users;
}

pub struct ResourceApi<R> {
    config: ApiConfig,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for ResourceApi<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceApi").field("config", &self.config).finish()
    }
}

impl<R: Resource> ResourceApi<R> {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            _resource: PhantomData,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn build_list(&self, offset: u32, limit: u32) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.config.collection_url(R::ENDPOINT),
            query: vec![
                ("skip".to_string(), offset.to_string()),
                ("limit".to_string(), limit.to_string()),
            ],
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get(&self, id: Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.config.item_url(R::ENDPOINT, id),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, input: &R::Create) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.config.collection_url(R::ENDPOINT),
            query: Vec::new(),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_update(&self, id: Id, input: &R::Update) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.config.item_url(R::ENDPOINT, id),
            query: Vec::new(),
            headers: json_headers(),
            body: Some(to_json(input)?),
        })
    }

    pub fn build_delete(&self, id: Id) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.config.item_url(R::ENDPOINT, id),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<R::Entity>, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<R::Entity, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<R::Entity, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<R::Entity, ApiError> {
        check_status(&response)?;
        from_json(&response.body)
    }

    /// Any 2xx counts; the body (if any) is ignored.
    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_json<S: Serialize>(input: &S) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<D: DeserializeOwned>(body: &str) -> Result<D, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    let detail = extract_detail(&response.body);
    if response.status == 404 {
        return Err(ApiError::NotFound { detail });
    }
    Err(ApiError::Http {
        status: response.status,
        detail,
        body: response.body.clone(),
    })
}
