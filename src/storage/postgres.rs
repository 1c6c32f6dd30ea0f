//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::notes::Note;
use crate::pagination::Pagination;
use crate::users::Role;
use crate::users::User;

use super::ChangePasswordValues;
use super::CreateNoteValues;
use super::CreateUserValues;
use super::Error;
use super::NotePage;
use super::Result;
use super::Storage;
use super::UpdateNoteValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres type for user role
#[derive(Debug, PartialEq, sqlx::Type)]
#[sqlx(type_name = "user_role_type")]
#[sqlx(rename_all = "kebab-case")]
enum UserRoleType {
    /// Admin
    Admin,

    /// Manager
    Manager,
}

impl UserRoleType {
    /// Create user role type from role
    fn from_role(role: Role) -> Self {
        match role {
            Role::Admin => UserRoleType::Admin,
            Role::Manager => UserRoleType::Manager,
        }
    }

    /// Create role from user role type
    fn to_role(&self) -> Role {
        match self {
            UserRoleType::Admin => Role::Admin,
            UserRoleType::Manager => Role::Manager,
        }
    }
}

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    pub async fn new() -> Self {
        let database_connection_string = std::env::var("DATABASE_URL").expect("Valid DATABASE_URL");

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await
            .expect("Valid connection");

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Self {
        let migration_result = MIGRATOR.run(&connection_pool).await;

        if let Err(err) = migration_result {
            panic!("Migrations could not run: {err}");
        }

        Self { connection_pool }
    }
}

/// Postgres version of user
#[derive(sqlx::FromRow)]
struct PostgresUser {
    /// User ID
    id: Uuid,

    /// Session ID
    session_id: Uuid,

    /// Username
    username: String,

    /// Hashed password
    hashed_password: String,

    /// User role
    role: UserRoleType,

    /// Creation date
    created_at: NaiveDateTime,

    /// Last updated at
    updated_at: NaiveDateTime,

    /// Deleted at
    deleted_at: Option<NaiveDateTime>,
}

impl User {
    /// Create user from postgres version
    fn from_postgres_user(user: PostgresUser) -> Self {
        Self {
            id: user.id,
            session_id: user.session_id,
            username: user.username,
            hashed_password: user.hashed_password,
            role: user.role.to_role(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: user.deleted_at,
        }
    }

    /// Maybe create user from postgres version
    fn from_postgres_user_optional(user: Option<PostgresUser>) -> Option<Self> {
        user.map(Self::from_postgres_user)
    }

    /// Create multiple users from postgres version
    fn from_postgres_user_multiple(mut users: Vec<PostgresUser>) -> Vec<Self> {
        users
            .drain(..)
            .map(Self::from_postgres_user)
            .collect::<Vec<Self>>()
    }
}

/// Postgres version of note
#[derive(sqlx::FromRow)]
struct PostgresNote {
    /// Note ID
    id: Uuid,

    /// Owning user ID
    user_id: Uuid,

    /// Title
    title: String,

    /// Description
    description: String,

    /// Creation date
    created_at: NaiveDateTime,

    /// Last updated at
    updated_at: NaiveDateTime,
}

impl Note {
    /// Create note from postgres version
    fn from_postgres_note(note: PostgresNote) -> Self {
        Self {
            id: note.id,
            user_id: note.user_id,
            title: note.title,
            description: note.description,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    /// Maybe create note from postgres version
    fn from_postgres_note_optional(note: Option<PostgresNote>) -> Option<Self> {
        note.map(Self::from_postgres_note)
    }

    /// Create multiple notes from postgres version
    fn from_postgres_note_multiple(mut notes: Vec<PostgresNote>) -> Vec<Self> {
        notes
            .drain(..)
            .map(Self::from_postgres_note)
            .collect::<Vec<Self>>()
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_any_single_user(&self) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, PostgresUser>(
            r"
            SELECT *
            FROM users
            WHERE deleted_at IS NULL
            LIMIT 1
            ",
        )
        .fetch_optional(&self.connection_pool)
        .await
        .map(User::from_postgres_user_optional)
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_all_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, PostgresUser>(
            r"
            SELECT *
            FROM users
            WHERE deleted_at IS NULL
            ",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map(User::from_postgres_user_multiple)
        .map_err(connection_error)?;

        Ok(users)
    }

    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, PostgresUser>(
            r"
            SELECT *
            FROM users
            WHERE deleted_at IS NULL
                AND username = $1
            LIMIT 1
            ",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await
        .map(User::from_postgres_user_optional)
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, PostgresUser>(
            r"
            SELECT *
            FROM users
            WHERE deleted_at IS NULL
                AND id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(User::from_postgres_user_optional)
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        let user = sqlx::query_as::<_, PostgresUser>(
            r"
            INSERT INTO users (id, session_id, username, hashed_password, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.username)
        .bind(values.hashed_password)
        .bind(UserRoleType::from_role(values.role))
        .fetch_one(&self.connection_pool)
        .await
        .map(User::from_postgres_user)
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn change_password(&self, user: &User, values: &ChangePasswordValues) -> Result<User> {
        let user = sqlx::query_as::<_, PostgresUser>(
            r"
            UPDATE users
            SET session_id = $1, hashed_password = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            RETURNING *
            ",
        )
        .bind(values.session_id)
        .bind(values.hashed_password)
        .bind(user.id)
        .fetch_one(&self.connection_pool)
        .await
        .map(User::from_postgres_user)
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn delete_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r"
            UPDATE users
            SET deleted_at = CURRENT_TIMESTAMP
            WHERE id = $1
            ",
        )
        .bind(user.id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn find_notes_by_user(
        &self,
        user_id: &Uuid,
        pagination: &Pagination,
    ) -> Result<NotePage> {
        #[allow(clippy::cast_possible_wrap)]
        let notes = sqlx::query_as::<_, PostgresNote>(
            r"
            SELECT *
            FROM notes
            WHERE user_id = $1
            ORDER BY created_at, id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(i64::from(pagination.limit()))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.connection_pool)
        .await
        .map(Note::from_postgres_note_multiple)
        .map_err(connection_error)?;

        let total_rows = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM notes
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        #[allow(clippy::cast_sign_loss)]
        let total_pages = pagination.total_pages(total_rows as u64);

        Ok(NotePage { notes, total_pages })
    }

    async fn find_single_note_by_id(&self, id: &Uuid) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, PostgresNote>(
            r"
            SELECT *
            FROM notes
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Note::from_postgres_note_optional)
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note> {
        let note = sqlx::query_as::<_, PostgresNote>(
            r"
            INSERT INTO notes (id, user_id, title, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.title)
        .bind(values.description)
        .fetch_one(&self.connection_pool)
        .await
        .map(Note::from_postgres_note)
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn update_note(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        values: &UpdateNoteValues,
    ) -> Result<Option<Note>> {
        // single predicate on id and user_id, keeping foreign-owned notes
        // indistinguishable from absent ones
        let note = sqlx::query_as::<_, PostgresNote>(
            r"
            UPDATE notes
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $3 AND user_id = $4
            RETURNING *
            ",
        )
        .bind(values.title)
        .bind(values.description)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Note::from_postgres_note_optional)
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn delete_note(&self, id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM notes
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
