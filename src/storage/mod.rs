//! All things related to the storage of users and notes

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::notes::Note;
use crate::pagination::Pagination;
use crate::users::Role;
use crate::users::User;

#[cfg(not(feature = "postgres"))]
use memory::Memory;
#[cfg(feature = "postgres")]
use postgres::Postgres;

#[cfg(not(feature = "postgres"))]
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> Memory {
    Memory::new()
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup() -> Postgres {
    Postgres::new().await
}

/// Storage errors
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The role of the user
    pub role: Role,

    /// The username
    pub username: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to change a password of a user
pub struct ChangePasswordValues<'a> {
    /// New session ID to invalidate current tokens
    pub session_id: &'a Uuid,

    /// The new hashed password
    pub hashed_password: &'a str,
}

/// Values to create a Note
pub struct CreateNoteValues<'a> {
    /// User creating (and owning) the note
    pub user: &'a User,

    /// Title of the note
    pub title: &'a str,

    /// Description of the note
    pub description: &'a str,
}

/// Values to update a Note
///
/// Absent fields keep their current value
pub struct UpdateNoteValues<'a> {
    /// New title of the note
    pub title: Option<&'a str>,

    /// New description of the note
    pub description: Option<&'a str>,
}

/// A single page of notes, plus the page count over the whole set
pub struct NotePage {
    /// The notes on the requested page
    ///
    /// Empty when the page lies past the end, that is not an error
    pub notes: Vec<Note>,

    /// Total number of pages for the owning user, zero when they have no notes
    pub total_pages: u64,
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Find any single user
    ///
    /// Respects the soft-delete
    async fn find_any_single_user(&self) -> Result<Option<User>>;

    /// Finds all users
    ///
    /// Respects the soft-delete
    async fn find_all_users(&self) -> Result<Vec<User>>;

    /// Finds a single user by its username
    ///
    /// Respects the soft-delete
    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Finds a single user by its ID
    ///
    /// Respects the soft-delete
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Create a single user
    async fn create_user(&self, values: &CreateUserValues) -> Result<User>;

    /// Change the password of a user
    async fn change_password(&self, user: &User, values: &ChangePasswordValues) -> Result<User>;

    /// Soft-delete a user
    async fn delete_user(&self, user: &User) -> Result<()>;

    /// Find a page of notes belonging to a user, in insertion order
    async fn find_notes_by_user(
        &self,
        user_id: &Uuid,
        pagination: &Pagination,
    ) -> Result<NotePage>;

    /// Find a single note by its ID
    ///
    /// No ownership filter at this level, callers enforce ownership
    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>>;

    /// Create a note
    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note>;

    /// Update the note matching both ID and owning user
    ///
    /// Matching on both in a single predicate keeps a foreign-owned note
    /// indistinguishable from an absent one
    async fn update_note(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        values: &UpdateNoteValues,
    ) -> Result<Option<Note>>;

    /// Delete the note matching both ID and owning user
    ///
    /// Returns whether a note was actually deleted
    async fn delete_note(&self, id: &Uuid, user_id: &Uuid) -> Result<bool>;
}
