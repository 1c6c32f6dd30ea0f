//! Notes and the validation of their fields

use std::collections::BTreeMap;

use chrono::naive::NaiveDateTime;
use uuid::Uuid;

/// A note, owned by a single user
#[derive(Clone, Debug)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Validation errors, keyed by field name
///
/// A `BTreeMap` to keep the serialized output deterministic
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// Validated fields for a new note
#[derive(Debug)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
}

impl NoteDraft {
    /// Validate raw create fields
    ///
    /// Missing or empty (after trimming) fields are rejected, all offending
    /// fields are reported at once
    pub fn parse(
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required("title", "Title", title, &mut errors);
        let description = required("description", "Description", description, &mut errors);

        match (title, description) {
            (Some(title), Some(description)) => Ok(Self { title, description }),
            _ => Err(errors),
        }
    }
}

/// Validated fields for a partial note update
///
/// Absent fields are left untouched, present fields still have to be non-empty
#[derive(Debug)]
pub struct NotePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl NotePatch {
    /// Validate raw update fields
    pub fn parse(
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = match title {
            Some(title) => Some(required("title", "Title", Some(title), &mut errors)),
            None => None,
        };

        let description = match description {
            Some(description) => Some(required(
                "description",
                "Description",
                Some(description),
                &mut errors,
            )),
            None => None,
        };

        if errors.is_empty() {
            Ok(Self {
                title: title.flatten(),
                description: description.flatten(),
            })
        } else {
            Err(errors)
        }
    }
}

/// Check a single required field, recording an error when it is missing or empty
fn required(
    field: &'static str,
    label: &str,
    value: Option<&str>,
    errors: &mut FieldErrors,
) -> Option<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Some(value.to_string()),
        _ => {
            errors
                .entry(field)
                .or_default()
                .push(format!("{label} is required"));

            None
        }
    }
}
