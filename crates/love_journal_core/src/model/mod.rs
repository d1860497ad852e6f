//! Journal domain model.
//!
//! # Responsibility
//! - Define the persisted shapes for love records, anniversaries and the
//!   operation log.
//! - Define create/patch input shapes and their validation rules.
//!
//! # Invariants
//! - Ids are storage-generated, immutable and never reused.
//! - Required text fields must be non-blank when written.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod anniversary;
pub mod love_record;
pub mod operation_log;

/// Validation failure for create/patch input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    BlankField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "field `{field}` must not be blank"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_text_if_set(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(value) => require_text(field, value),
        None => Ok(()),
    }
}
