//! All API endpoint setup

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::routing::put;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use request::PaginationQuery;
pub use request::PathParameters;
pub use response::Error;
pub use response::Success;

use crate::storage::Storage;

mod current_user;
mod notes;
mod request;
mod response;
mod users;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let users = Router::new()
        .route("/token", post(users::token::<S>))
        .route("/", get(users::list::<S>))
        .route("/", post(users::create::<S>))
        .route("/me/password", put(users::change_password::<S>))
        .route("/me", get(users::me::<S>))
        .route("/{user}", get(users::single::<S>))
        .route("/{user}", delete(users::delete::<S>));

    let notes = Router::new()
        .route("/", get(notes::list::<S>))
        .route("/", post(notes::create::<S>))
        .route("/{note}", get(notes::single::<S>))
        .route("/{note}", patch(notes::update::<S>))
        .route("/{note}", delete(notes::delete::<S>));

    Router::new()
        .nest("/users", users)
        .nest("/notes", notes)
        .method_not_allowed_fallback(method_not_allowed)
}

/// Fallback for unknown routes
pub async fn not_found() -> Error {
    Error::not_found("Not found")
}

/// Fallback for known routes requested with an unsupported method
pub async fn method_not_allowed() -> Error {
    Error::method_not_allowed("Method not allowed")
}
