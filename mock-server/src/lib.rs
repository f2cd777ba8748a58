use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const API_PREFIX: &str = "/api/v1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub owner_id: i64,
}

#[derive(Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub is_completed: Option<bool>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Public view of a user; the password never leaves the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub full_name: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
}

#[derive(Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

fn default_limit() -> usize {
    100
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

struct StoredUser {
    user: User,
    #[allow(dead_code)]
    password: String,
}

#[derive(Default)]
pub struct Store {
    tasks: BTreeMap<i64, Task>,
    users: BTreeMap<i64, StoredUser>,
    next_task_id: i64,
    next_user_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

type ApiError = (StatusCode, Json<ErrorBody>);
type ApiResult<T> = Result<T, ApiError>;

fn error(status: StatusCode, detail: &str) -> ApiError {
    (
        status,
        Json(ErrorBody {
            detail: detail.to_string(),
        }),
    )
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(db);
    Router::new().nest(API_PREFIX, api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn page<T>(items: impl Iterator<Item = T>, paging: &Paging) -> Vec<T> {
    items.skip(paging.skip).take(paging.limit).collect()
}

// --- tasks ---

async fn list_tasks(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Vec<Task>> {
    let store = db.read().await;
    Json(page(store.tasks.values().cloned(), &paging))
}

async fn create_task(
    State(db): State<Db>,
    Json(input): Json<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if input.title.trim().is_empty() {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "Title must not be empty"));
    }
    let mut store = db.write().await;
    if !store.users.contains_key(&input.owner_id) {
        return Err(error(StatusCode::BAD_REQUEST, "Owner not found"));
    }
    store.next_task_id += 1;
    let task = Task {
        id: store.next_task_id,
        title: input.title,
        description: input.description,
        is_completed: input.is_completed,
        priority: input.priority.unwrap_or(Priority::Medium),
        due_date: input.due_date,
        owner_id: input.owner_id,
        created_at: Utc::now(),
        updated_at: None,
    };
    store.tasks.insert(task.id, task.clone());
    tracing::info!(id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<Task>> {
    let store = db.read().await;
    store
        .tasks
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Task not found"))
}

async fn update_task(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let mut store = db.write().await;
    let task = store
        .tasks
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Task not found"))?;
    if let Some(title) = input.title {
        if title.trim().is_empty() {
            return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "Title must not be empty"));
        }
        task.title = title;
    }
    if let Some(description) = input.description {
        task.description = description;
    }
    if let Some(is_completed) = input.is_completed {
        task.is_completed = is_completed;
    }
    if let Some(priority) = input.priority {
        task.priority = priority;
    }
    if let Some(due_date) = input.due_date {
        task.due_date = due_date;
    }
    task.updated_at = Some(Utc::now());
    Ok(Json(task.clone()))
}

async fn delete_task(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .tasks
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Task not found"))
}

// --- users ---

async fn list_users(State(db): State<Db>, Query(paging): Query<Paging>) -> Json<Vec<User>> {
    let store = db.read().await;
    Json(page(store.users.values().map(|s| s.user.clone()), &paging))
}

fn check_unique(store: &Store, id: Option<i64>, email: Option<&str>, username: Option<&str>) -> ApiResult<()> {
    for stored in store.users.values().filter(|s| Some(s.user.id) != id) {
        if email.is_some_and(|e| e.eq_ignore_ascii_case(&stored.user.email)) {
            return Err(error(StatusCode::BAD_REQUEST, "Email already registered"));
        }
        if username.is_some_and(|u| u == stored.user.username) {
            return Err(error(StatusCode::BAD_REQUEST, "Username already taken"));
        }
    }
    Ok(())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let mut store = db.write().await;
    check_unique(&store, None, Some(&input.email), Some(&input.username))?;
    store.next_user_id += 1;
    let user = User {
        id: store.next_user_id,
        email: input.email,
        username: input.username,
        full_name: input.full_name,
        is_active: input.is_active.unwrap_or(true),
        is_superuser: input.is_superuser.unwrap_or(false),
        created_at: Utc::now(),
        updated_at: None,
    };
    store.users.insert(
        user.id,
        StoredUser {
            user: user.clone(),
            password: input.password,
        },
    );
    tracing::info!(id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<Json<User>> {
    let store = db.read().await;
    store
        .users
        .get(&id)
        .map(|s| Json(s.user.clone()))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateUser>,
) -> ApiResult<Json<User>> {
    let mut store = db.write().await;
    if !store.users.contains_key(&id) {
        return Err(error(StatusCode::NOT_FOUND, "User not found"));
    }
    check_unique(&store, Some(id), input.email.as_deref(), input.username.as_deref())?;
    let stored = store
        .users
        .get_mut(&id)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))?;
    if let Some(email) = input.email {
        stored.user.email = email;
    }
    if let Some(username) = input.username {
        stored.user.username = username;
    }
    if let Some(password) = input.password {
        stored.password = password;
    }
    if let Some(full_name) = input.full_name {
        stored.user.full_name = full_name;
    }
    if let Some(is_active) = input.is_active {
        stored.user.is_active = is_active;
    }
    if let Some(is_superuser) = input.is_superuser {
        stored.user.is_superuser = is_superuser;
    }
    stored.user.updated_at = Some(Utc::now());
    Ok(Json(stored.user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_task_defaults_completed_to_false() {
        let input: CreateTask = serde_json::from_str(r#"{"title":"No flag","owner_id":1}"#).unwrap();
        assert_eq!(input.title, "No flag");
        assert!(!input.is_completed);
        assert!(input.priority.is_none());
    }

    #[test]
    fn create_task_rejects_missing_owner() {
        let result: Result<CreateTask, _> = serde_json::from_str(r#"{"title":"Orphan"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_task_all_fields_optional() {
        let input: UpdateTask = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.title.is_none());
        assert!(input.description.is_none());
        assert!(input.is_completed.is_none());
    }

    #[test]
    fn update_task_null_description_clears() {
        let input: UpdateTask = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(input.description, Some(None));
    }

    #[test]
    fn paging_defaults() {
        let paging: Paging = serde_json::from_str("{}").unwrap();
        assert_eq!(paging.skip, 0);
        assert_eq!(paging.limit, 100);
    }

    #[test]
    fn user_serializes_without_password() {
        let user = User {
            id: 1,
            email: "a@b.io".to_string(),
            username: "alice".to_string(),
            full_name: None,
            is_active: true,
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "alice");
    }
}
