//! API response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::notes::FieldErrors;
use crate::users::Role;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: Option<V>,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data: Some(data),
        }
    }

    pub fn created(data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            data: Some(data),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status_code: StatusCode::NO_CONTENT,
            data: None,
        }
    }
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        if let Some(data) = self.data {
            (self.status_code, Json(data)).into_response()
        } else {
            self.status_code.into_response()
        }
    }
}

/// Hold data for a failed API interaction
pub struct Error {
    status_code: StatusCode,
    body: ErrorBody,
}

/// The two shapes a failure takes on the wire
enum ErrorBody {
    /// A single message, with an optional longer description
    Message {
        error: String,
        description: Option<String>,
    },

    /// Per-field validation messages
    Validation { errors: FieldErrors },
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::message(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::message(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::message(StatusCode::NOT_FOUND, message)
    }

    pub fn method_not_allowed<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::message(StatusCode::METHOD_NOT_ALLOWED, message)
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A validation failure, serialized as `{"success": false, "errors": ...}`
    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            body: ErrorBody::Validation { errors },
        }
    }

    pub fn with_description<M>(mut self, description: M) -> Self
    where
        M: ToString,
    {
        if let ErrorBody::Message {
            description: slot, ..
        } = &mut self.body
        {
            *slot = Some(description.to_string());
        }

        self
    }

    fn message<M>(status_code: StatusCode, message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code,
            body: ErrorBody::Message {
                error: message.to_string(),
                description: None,
            },
        }
    }
}

#[derive(Serialize)]
struct MessageWrapper {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct ValidationWrapper {
    success: bool,
    errors: FieldErrors,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.body {
            ErrorBody::Message { error, description } => (
                self.status_code,
                Json(MessageWrapper { error, description }),
            )
                .into_response(),
            ErrorBody::Validation { errors } => (
                self.status_code,
                Json(ValidationWrapper {
                    success: false,
                    errors,
                }),
            )
                .into_response(),
        }
    }
}

impl Role {
    pub fn is_allowed(self, target_role: Role) -> Result<(), Error> {
        match self {
            Role::Admin => Ok(()),
            Role::Manager => match target_role {
                Role::Admin => Err(Error::forbidden("Not allowed to access")),
                Role::Manager => Ok(()),
            },
        }
    }
}
