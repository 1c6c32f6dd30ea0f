use axum::Router;
use axum::body::Body;
use axum::body::Bytes;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use http_body_util::BodyExt;
use serde_json::Map;
use serde_json::Value;
use tower::Service;
use uuid::Uuid;

use crate::setup_app;

/// Test helper version of User struct
#[derive(Debug)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[allow(dead_code)]
    pub role: String,
    pub password: Option<String>,
}

/// Test helper version of Note struct
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
}

/// Test helper version of a notes listing page
#[derive(Debug)]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub total_pages: u64,
    pub page: u64,
}

/// Setup the Jotter app
///
/// Inject some environment variables to match our tests
pub async fn setup_test_app() -> Router {
    #[allow(unsafe_code)]
    unsafe {
        std::env::set_var("INITIAL_USERNAME", "admin");
        std::env::set_var("INITIAL_PASSWORD", "verysecret");
        std::env::set_var("JWT_SECRET", "verysecret");
    }

    setup_app().await.unwrap()
}

pub async fn maybe_login(
    app: &mut Router,
    username: &str,
    password: &str,
) -> (StatusCode, Option<String>, Option<String>) {
    let mut payload = Map::new();
    payload.insert("username".to_string(), Value::String(username.to_string()));
    payload.insert("password".to_string(), Value::String(password.to_string()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users/token")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_access_token(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn login_with_credentials(app: &mut Router, username: &str, password: &str) -> String {
    let (status_code, access_token, _) = maybe_login(app, username, password).await;

    assert_eq!(StatusCode::OK, status_code);

    access_token.unwrap()
}

pub async fn login(app: &mut Router) -> String {
    login_with_credentials(app, "admin", "verysecret").await
}

pub async fn maybe_create_note(
    app: &mut Router,
    access_token: &str,
    title: Option<&str>,
    description: Option<&str>,
) -> (StatusCode, Option<Note>, Option<Value>) {
    let mut payload = Map::new();

    if let Some(title) = title {
        payload.insert("title".to_string(), Value::String(title.to_string()));
    }

    if let Some(description) = description {
        payload.insert(
            "description".to_string(),
            Value::String(description.to_string()),
        );
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/notes")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .header(AUTHORIZATION, access_token)
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_created_note(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_field_errors(&body))
        } else {
            None
        },
    )
}

pub async fn create_note(
    app: &mut Router,
    access_token: &str,
    title: &str,
    description: &str,
) -> Note {
    let (status_code, note, _) =
        maybe_create_note(app, access_token, Some(title), Some(description)).await;

    assert_eq!(StatusCode::OK, status_code);

    note.unwrap()
}

pub async fn list_notes(
    app: &mut Router,
    access_token: &str,
    query: &str,
) -> (StatusCode, Option<NotesPage>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/notes{query}"))
        .header(AUTHORIZATION, access_token)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_notes_page(&body))
        } else {
            None
        },
    )
}

pub async fn single_note(
    app: &mut Router,
    access_token: &str,
    id: &Uuid,
) -> (StatusCode, Option<Note>, Option<String>) {
    single_note_with_str(app, access_token, &id.to_string()).await
}

pub async fn single_note_with_str(
    app: &mut Router,
    access_token: &str,
    id: &str,
) -> (StatusCode, Option<Note>, Option<String>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/notes/{id}"))
        .header(AUTHORIZATION, access_token)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_note(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST || status_code == StatusCode::NOT_FOUND {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_update_note(
    app: &mut Router,
    access_token: &str,
    id: &Uuid,
    title: Option<&str>,
    description: Option<&str>,
) -> (StatusCode, Option<Note>, Option<String>) {
    let mut payload = Map::new();

    if let Some(title) = title {
        payload.insert("title".to_string(), Value::String(title.to_string()));
    }

    if let Some(description) = description {
        payload.insert(
            "description".to_string(),
            Value::String(description.to_string()),
        );
    }

    let request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/api/notes/{id}"))
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .header(AUTHORIZATION, access_token)
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_note(&body))
        } else {
            None
        },
        if status_code == StatusCode::NOT_FOUND {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_delete_note(
    app: &mut Router,
    access_token: &str,
    id: &Uuid,
) -> (StatusCode, Option<String>) {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/notes/{id}"))
        .header(AUTHORIZATION, access_token)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::NOT_FOUND {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn current_user(app: &mut Router, access_token: &str) -> (StatusCode, Option<User>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/users/me")
        .header(AUTHORIZATION, access_token)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_user(&body))
        } else {
            None
        },
    )
}

pub async fn list_users(app: &mut Router, access_token: &str) -> (StatusCode, Option<Vec<User>>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/users")
        .header(AUTHORIZATION, access_token)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_users(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_user(
    app: &mut Router,
    access_token: &str,
    username: &str,
    role: &str,
    password: Option<&str>,
) -> (StatusCode, Option<User>, Option<String>) {
    let mut payload = Map::new();
    payload.insert("username".to_string(), Value::String(username.to_string()));
    payload.insert("role".to_string(), Value::String(role.to_string()));

    if let Some(password) = password {
        payload.insert("password".to_string(), Value::String(password.to_string()));
    }

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .header(AUTHORIZATION, access_token)
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::CREATED {
            Some(get_user(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_change_password(
    app: &mut Router,
    access_token: &str,
    current_password: &str,
    password: &str,
) -> (StatusCode, Option<String>, Option<String>) {
    let mut payload = Map::new();
    payload.insert(
        "currentPassword".to_string(),
        Value::String(current_password.to_string()),
    );
    payload.insert("password".to_string(), Value::String(password.to_string()));

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/users/me/password")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .header(AUTHORIZATION, access_token)
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_access_token(&body))
        } else {
            None
        },
        if status_code == StatusCode::BAD_REQUEST {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_delete_user(
    app: &mut Router,
    access_token: &str,
    id: &Uuid,
) -> (StatusCode, Option<String>) {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/users/{id}"))
        .header(AUTHORIZATION, access_token)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::BAD_REQUEST || status_code == StatusCode::NOT_FOUND {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

/// A raw request for the corner cases the typed helpers do not cover
pub async fn raw_request(
    app: &mut Router,
    method: Method,
    uri: &str,
    access_token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(access_token) = access_token {
        builder = builder.header(AUTHORIZATION, access_token);
    }

    let request = builder.body(Body::empty()).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice::<Value>(&body[..]).unwrap_or(Value::Null);

    (status_code, body)
}

fn value_to_user(user: &Map<String, Value>) -> User {
    User {
        id: user["id"].as_str().map(Uuid::parse_str).unwrap().unwrap(),
        username: user["username"].as_str().map(ToString::to_string).unwrap(),
        role: user["role"].as_str().map(ToString::to_string).unwrap(),
        password: user
            .get("password")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    }
}

fn get_user(body: &Bytes) -> User {
    serde_json::from_slice::<Value>(&body[..])
        .unwrap()
        .as_object()
        .map(value_to_user)
        .unwrap()
}

fn get_users(body: &Bytes) -> Vec<User> {
    serde_json::from_slice::<Value>(&body[..])
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_object().unwrap())
        .map(value_to_user)
        .collect()
}

fn value_to_note(note: &Map<String, Value>) -> Note {
    Note {
        id: note["id"].as_str().map(Uuid::parse_str).unwrap().unwrap(),
        user_id: note["userId"]
            .as_str()
            .map(Uuid::parse_str)
            .unwrap()
            .unwrap(),
        title: note["title"].as_str().map(ToString::to_string).unwrap(),
        description: note["description"]
            .as_str()
            .map(ToString::to_string)
            .unwrap(),
    }
}

fn get_note(body: &Bytes) -> Note {
    serde_json::from_slice::<Value>(&body[..])
        .unwrap()
        .as_object()
        .map(value_to_note)
        .unwrap()
}

fn get_created_note(body: &Bytes) -> Note {
    let body = serde_json::from_slice::<Value>(&body[..]).unwrap();

    assert_eq!(Some(true), body["success"].as_bool());

    body["note"].as_object().map(value_to_note).unwrap()
}

fn get_notes_page(body: &Bytes) -> NotesPage {
    let body = serde_json::from_slice::<Value>(&body[..]).unwrap();

    NotesPage {
        notes: body["notes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_object().unwrap())
            .map(value_to_note)
            .collect(),
        total_pages: body["totalPages"].as_u64().unwrap(),
        page: body["page"].as_u64().unwrap(),
    }
}

fn get_field_errors(body: &Bytes) -> Value {
    let body = serde_json::from_slice::<Value>(&body[..]).unwrap();

    assert_eq!(Some(false), body["success"].as_bool());

    body["errors"].clone()
}

fn get_error_message(body: &Bytes) -> String {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["error"]
        .as_str()
        .map(ToString::to_string)
        .unwrap()
}

fn get_access_token(body: &Bytes) -> String {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["access_token"]
        .as_str()
        .map(|access_token| format!("Bearer {access_token}"))
        .unwrap()
}
