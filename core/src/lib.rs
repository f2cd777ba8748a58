//! Client core for the task manager admin API.
//!
//! # Overview
//! Talks to a REST API exposing `tasks` and `users` collections and keeps a
//! reactive cache of the last listed collection of each, so several views can
//! observe the same data without re-issuing requests.
//!
//! # Design
//! - `ResourceApi` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. No I/O happens there.
//! - `Transport` performs the round-trip; `ReqwestTransport` is the
//!   production implementation.
//! - `ResourceClient` combines both with a `Cache`. Mutations re-list in the
//!   background rather than patching the cache locally.
//! - `Services` is the single, explicitly constructed context owning both
//!   clients.
//! - DTOs validate themselves before any request is built.

pub mod cache;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod resource;
pub mod services;
pub mod types;
pub mod validate;
pub mod views;

pub use cache::{Cache, Snapshot, Subscription};
pub use client::{Resource, ResourceApi, Tasks, Users, DEFAULT_LIMIT, DEFAULT_OFFSET};
pub use endpoint::{ApiConfig, Endpoint};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use resource::{ResourceClient, TaskClient, UserClient};
pub use services::Services;
pub use types::{Id, Priority, Task, TaskCreate, TaskUpdate, User, UserCreate, UserUpdate};
pub use validate::{FieldError, Validate, ValidationErrors};
