//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::notes::Note;
use crate::pagination::Pagination;
use crate::users::User;

use super::ChangePasswordValues;
use super::CreateNoteValues;
use super::CreateUserValues;
use super::NotePage;
use super::Result;
use super::Storage;
use super::UpdateNoteValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All notes in storage
    ///
    /// A `Vec` so listing order is insertion order
    notes: Arc<Mutex<Vec<Note>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
            notes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_any_single_user(&self) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.deleted_at.is_none())
            .cloned())
    }

    async fn find_all_users(&self) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|user| user.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.username == username && user.deleted_at.is_none())
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| &user.id == id && user.deleted_at.is_none())
            .cloned())
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            username: values.username.to_string(),
            hashed_password: values.hashed_password.to_string(),
            role: values.role,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
            deleted_at: None,
        };

        self.users.lock().await.insert(user.id, user.clone());

        Ok(user)
    }

    async fn change_password(&self, user: &User, values: &ChangePasswordValues) -> Result<User> {
        Ok(self
            .users
            .lock()
            .await
            .get_mut(&user.id)
            .map(|user| {
                user.session_id = *values.session_id;
                user.hashed_password = values.hashed_password.to_string();
                user.updated_at = Utc::now().naive_utc();

                user.clone()
            })
            .expect("HashMap is the source of the user"))
    }

    async fn delete_user(&self, user: &User) -> Result<()> {
        if let Some(user) = self.users.lock().await.get_mut(&user.id) {
            user.deleted_at = Some(Utc::now().naive_utc());
        }

        Ok(())
    }

    async fn find_notes_by_user(
        &self,
        user_id: &Uuid,
        pagination: &Pagination,
    ) -> Result<NotePage> {
        let notes = self.notes.lock().await;

        let owned = notes
            .iter()
            .filter(|note| &note.user_id == user_id)
            .cloned()
            .collect::<Vec<Note>>();

        let total_pages = pagination.total_pages(owned.len() as u64);

        #[allow(clippy::cast_possible_truncation)]
        let notes = owned
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();

        Ok(NotePage { notes, total_pages })
    }

    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .iter()
            .find(|note| &note.id == id)
            .cloned())
    }

    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note> {
        let note = Note {
            id: Uuid::new_v4(),
            user_id: values.user.id,
            title: values.title.to_string(),
            description: values.description.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        };

        self.notes.lock().await.push(note.clone());

        Ok(note)
    }

    async fn update_note(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        values: &UpdateNoteValues,
    ) -> Result<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .iter_mut()
            .find(|note| &note.id == id && &note.user_id == user_id)
            .map(|note| {
                if let Some(title) = values.title {
                    note.title = title.to_string();
                }

                if let Some(description) = values.description {
                    note.description = description.to_string();
                }

                note.updated_at = Utc::now().naive_utc();

                note.clone()
            }))
    }

    async fn delete_note(&self, id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let mut notes = self.notes.lock().await;

        let count_before = notes.len();
        notes.retain(|note| !(&note.id == id && &note.user_id == user_id));

        Ok(notes.len() != count_before)
    }
}
