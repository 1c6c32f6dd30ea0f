//! User API management

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::generate;
use crate::password::hash;
use crate::password::verify;
use crate::storage::ChangePasswordValues;
use crate::storage::CreateUserValues;
use crate::storage::Storage;
use crate::users::Role;
use crate::users::User;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::current_user::Token;
use super::current_user::generate_token;
use super::JwtKeys;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The username
    pub username: String,

    /// The role of the user
    pub role: Role,

    /// The password, if generated
    // Password should only be added when newly generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            password: None,
        }
    }

    /// Add a password to the user response
    ///
    /// This is an explicit extra action to take, to make sure this is really what you want to do
    fn set_password(&mut self, password: &str) {
        self.password = Some(password.to_string());
    }

    /// Create a user response from multiple [`User`](User)s
    fn from_user_multiple(mut users: Vec<User>) -> Vec<Self> {
        users.drain(..).map(Self::from_user).collect::<Vec<Self>>()
    }
}

/// Login form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// Username of the user
    username: String,
    /// Password of the user
    password: String,
}

/// Get a token for a user "session"
///
/// The token can then be used to access the rest of the API routes by using it in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "admin", "password": "verysecret" }' \
///     http://localhost:7000/api/users/token
/// ```
///
/// Response:
/// ```json
/// { "token_type": "Bearer", "expires_in": 3600, "access_token": "some token" }
/// ```
pub async fn token<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<LoginForm>,
) -> Result<Success<Token>, Error> {
    let user = storage
        .find_single_user_by_username(&form.username)
        .await
        .map_err(|err| {
            tracing::error!("Failed to look up user: {err}");
            Error::internal_server_error("Failed to look up user")
        })?;

    if let Some(user) = user {
        if verify(&user.hashed_password, &form.password) {
            let token = generate_token(&jwt_keys, &user)?;

            Ok(Success::ok(token))
        } else {
            Err(Error::bad_request("Invalid user"))
        }
    } else {
        Err(Error::bad_request("Invalid user"))
    }
}

/// List all users
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
) -> Result<Success<Vec<UserResponse>>, Error> {
    current_user.role.is_allowed(Role::Admin)?;

    let users = storage.find_all_users().await.map_err(|err| {
        tracing::error!("Failed to list users: {err}");
        Error::internal_server_error("Failed to list users")
    })?;

    Ok(Success::ok(UserResponse::from_user_multiple(users)))
}

/// Form to create a user
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserForm {
    /// Username of the new user
    username: String,

    /// Role of the new user
    role: Role,

    /// Optional password, a password is generated when absent
    password: Option<String>,
}

/// Create a new user
///
/// When no password is given, one is generated and included in the response,
/// the only time it is ever shown
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateUserForm>,
) -> Result<Success<UserResponse>, Error> {
    current_user.role.is_allowed(Role::Admin)?;

    if form.username.trim().is_empty() {
        return Err(Error::bad_request("Username can not be empty"));
    }

    let existing = storage
        .find_single_user_by_username(&form.username)
        .await
        .map_err(|err| {
            tracing::error!("Failed to look up user: {err}");
            Error::internal_server_error("Failed to look up user")
        })?;

    if existing.is_some() {
        return Err(Error::bad_request("Username is already taken"));
    }

    let (password, is_generated_password) = match &form.password {
        Some(password) if !password.is_empty() => (password.clone(), false),
        _ => (generate(), true),
    };

    let hashed_password = hash(&password);

    let values = CreateUserValues {
        session_id: &Uuid::new_v4(),
        role: form.role,
        username: &form.username,
        hashed_password: &hashed_password,
    };

    let user = storage.create_user(&values).await.map_err(|err| {
        tracing::error!("Failed to create user: {err}");
        Error::internal_server_error("Failed to create user")
    })?;

    let mut response = UserResponse::from_user(user);

    if is_generated_password {
        response.set_password(&password);
    }

    Ok(Success::created(response))
}

/// Get the current user
pub async fn me<S: Storage>(
    current_user: CurrentUser<S>,
) -> Result<Success<UserResponse>, Error> {
    Ok(Success::ok(UserResponse::from_user(
        current_user.clone_user(),
    )))
}

/// Get a single user
///
/// Users can fetch themselves, fetching others requires the admin role
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(user_id): PathParameters<Uuid>,
) -> Result<Success<UserResponse>, Error> {
    if user_id != current_user.id {
        current_user.role.is_allowed(Role::Admin)?;
    }

    let user = storage
        .find_single_user_by_id(&user_id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch user: {err}");
            Error::internal_server_error("Failed to fetch user")
        })?;

    user.map(|user| Success::ok(UserResponse::from_user(user)))
        .ok_or_else(|| Error::not_found("User not found"))
}

/// Form to change the current user's password
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    /// The current password, to prove ownership of the account
    current_password: String,

    /// The new password
    password: String,
}

/// Change the password of the current user
///
/// Rotates the session ID, invalidating all previously issued tokens, and
/// returns a fresh token
pub async fn change_password<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Success<Token>, Error> {
    if !verify(&current_user.hashed_password, &form.current_password) {
        return Err(Error::bad_request("Invalid current password"));
    }

    if form.password.is_empty() {
        return Err(Error::bad_request("Password can not be empty"));
    }

    let hashed_password = hash(&form.password);

    let values = ChangePasswordValues {
        session_id: &Uuid::new_v4(),
        hashed_password: &hashed_password,
    };

    let user = storage
        .change_password(&current_user, &values)
        .await
        .map_err(|err| {
            tracing::error!("Failed to change password: {err}");
            Error::internal_server_error("Failed to change password")
        })?;

    let token = generate_token(&jwt_keys, &user)?;

    Ok(Success::ok(token))
}

/// Delete a user
///
/// Requires the admin role, deleting yourself is not possible
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(user_id): PathParameters<Uuid>,
) -> Result<Success<&'static str>, Error> {
    current_user.role.is_allowed(Role::Admin)?;

    if user_id == current_user.id {
        return Err(Error::bad_request("Can not delete yourself"));
    }

    let user = storage
        .find_single_user_by_id(&user_id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch user: {err}");
            Error::internal_server_error("Failed to fetch user")
        })?
        .ok_or_else(|| Error::not_found("User not found"))?;

    storage.delete_user(&user).await.map_err(|err| {
        tracing::error!("Failed to delete user: {err}");
        Error::internal_server_error("Failed to delete user")
    })?;

    Ok(Success::<&'static str>::no_content())
}
