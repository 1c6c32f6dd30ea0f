//! Notes API management

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::notes::Note;
use crate::notes::NoteDraft;
use crate::notes::NotePatch;
use crate::storage::CreateNoteValues;
use crate::storage::Storage;
use crate::storage::UpdateNoteValues;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::PaginationQuery;
use super::PathParameters;
use super::Success;

/// The note response information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NoteResponse {
    fn from_note(note: Note) -> Self {
        Self {
            id: note.id,
            user_id: note.user_id,
            title: note.title,
            description: note.description,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    fn from_note_multiple(mut notes: Vec<Note>) -> Vec<Self> {
        notes.drain(..).map(Self::from_note).collect::<Vec<Self>>()
    }
}

/// A single page of notes
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesPageResponse {
    pub notes: Vec<NoteResponse>,
    pub total_pages: u64,
    pub page: u32,
}

/// Response for a freshly created note
#[derive(Debug, Serialize)]
pub struct CreatedNoteResponse {
    pub success: bool,
    pub note: NoteResponse,
}

/// List a page of the current user's notes
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:7000/api/notes?page=1&limit=10'
/// ```
///
/// Response:
/// ```json
/// { "notes": [ { "id": "<uuid>", "title": "Groceries", ... } ], "totalPages": 1, "page": 1 }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PaginationQuery(pagination): PaginationQuery,
) -> Result<Success<NotesPageResponse>, Error> {
    let page = storage
        .find_notes_by_user(&current_user.id, &pagination)
        .await
        .map_err(|err| {
            tracing::error!("Failed to list notes: {err}");
            Error::internal_server_error("Failed to list notes")
        })?;

    Ok(Success::ok(NotesPageResponse {
        notes: NoteResponse::from_note_multiple(page.notes),
        total_pages: page.total_pages,
        page: pagination.page(),
    }))
}

/// Raw create fields, both optional so validation can report them as missing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteForm {
    title: Option<String>,
    description: Option<String>,
}

/// Create a note owned by the current user
///
/// Response:
/// ```json
/// { "success": true, "note": { "id": "<uuid>", "title": "Groceries", ... } }
/// ```
///
/// Invalid fields give a 400 with per-field messages:
/// ```json
/// { "success": false, "errors": { "title": [ "Title is required" ] } }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateNoteForm>,
) -> Result<Success<CreatedNoteResponse>, Error> {
    let draft = NoteDraft::parse(form.title.as_deref(), form.description.as_deref())
        .map_err(Error::validation)?;

    let values = CreateNoteValues {
        user: &current_user,
        title: &draft.title,
        description: &draft.description,
    };

    let note = storage.create_note(&values).await.map_err(|err| {
        tracing::error!("Failed to create note: {err}");
        Error::internal_server_error("Failed to create note")
    })?;

    Ok(Success::ok(CreatedNoteResponse {
        success: true,
        note: NoteResponse::from_note(note),
    }))
}

/// Get a single note of the current user
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<NoteResponse>, Error> {
    let note = storage
        .find_single_note_by_id(&note_id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch note: {err}");
            Error::internal_server_error("Failed to fetch note")
        })?;

    // a foreign-owned note reads the same as an absent one
    match note {
        Some(note) if note.user_id == current_user.id => {
            Ok(Success::ok(NoteResponse::from_note(note)))
        }
        _ => Err(Error::not_found("Note not found")),
    }
}

/// Raw update fields, absent fields keep their current value
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteForm {
    title: Option<String>,
    description: Option<String>,
}

/// Partially update a note of the current user
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<UpdateNoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let patch = NotePatch::parse(form.title.as_deref(), form.description.as_deref())
        .map_err(Error::validation)?;

    let values = UpdateNoteValues {
        title: patch.title.as_deref(),
        description: patch.description.as_deref(),
    };

    let note = storage
        .update_note(&note_id, &current_user.id, &values)
        .await
        .map_err(|err| {
            tracing::error!("Failed to update note: {err}");
            Error::internal_server_error("Failed to update note")
        })?;

    note.map(|note| Success::ok(NoteResponse::from_note(note)))
        .ok_or_else(|| Error::not_found("Note not found"))
}

/// Delete a note of the current user
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<&'static str>, Error> {
    let deleted = storage
        .delete_note(&note_id, &current_user.id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to delete note: {err}");
            Error::internal_server_error("Failed to delete note")
        })?;

    if deleted {
        Ok(Success::<&'static str>::no_content())
    } else {
        Err(Error::not_found("Note not found"))
    }
}
