use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ErrorBody, Task, User};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

const ALICE: &str = r#"{"email":"alice@example.com","username":"alice","password":"hunter22"}"#;

// --- list ---

#[tokio::test]
async fn list_tasks_empty() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/tasks"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let tasks: Vec<Task> = body_json(resp).await;
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn list_users_honours_skip_and_limit() {
    let mut app = app().into_service();
    for name in ["anna", "bert", "cleo"] {
        let body = format!(r#"{{"email":"{name}@example.com","username":"{name}","password":"secret1"}}"#);
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/api/v1/users", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/v1/users?skip=1&limit=1"))
        .await
        .unwrap();
    let users: Vec<User> = body_json(resp).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "bert");
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201_without_password() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/users", ALICE))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_superuser"], false);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn create_task_with_unknown_owner_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/tasks",
            r#"{"title":"Orphan","owner_id":42}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.detail, "Owner not found");
}

#[tokio::test]
async fn create_task_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/tasks", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_email_returns_400() {
    let mut app = app().into_service();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/v1/users", ALICE))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/users",
            r#"{"email":"ALICE@example.com","username":"alice2","password":"hunter22"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.detail, "Email already registered");
}

// --- get ---

#[tokio::test]
async fn get_task_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/tasks/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.detail, "Task not found");
}

#[tokio::test]
async fn get_task_bad_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/v1/tasks/not-a-number"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_user_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/api/v1/users/9", r#"{"username":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_user_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/api/v1/users/9"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn task_crud_lifecycle() {
    let mut app = app().into_service();

    // owner
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/v1/users", ALICE))
        .await
        .unwrap();
    let owner: User = body_json(resp).await;

    // create
    let body = format!(r#"{{"title":"Walk dog","owner_id":{}}}"#, owner.id);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/api/v1/tasks", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Task = body_json(resp).await;
    assert_eq!(created.title, "Walk dog");
    assert!(!created.is_completed);
    assert!(created.updated_at.is_none());
    let id = created.id;

    // list — should contain the one task
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/api/v1/tasks"))
        .await
        .unwrap();
    let tasks: Vec<Task> = body_json(resp).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);

    // update — partial: only is_completed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/v1/tasks/{id}"),
            r#"{"is_completed":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Task = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.is_completed);
    assert!(updated.updated_at.is_some());

    // update — clear description explicitly
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/v1/tasks/{id}"),
            r#"{"description":null,"title":"Walk cat"}"#,
        ))
        .await
        .unwrap();
    let updated: Task = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert!(updated.description.is_none());
    assert!(updated.is_completed); // unchanged from previous update

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/api/v1/tasks/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete — 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/api/v1/tasks/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
