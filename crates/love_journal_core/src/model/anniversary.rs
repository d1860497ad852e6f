//! Anniversary and reminder model.
//!
//! # Invariants
//! - `title` and `category` are non-blank once persisted.
//! - For recurring anniversaries only month/day of `date` are meaningful.
//! - `reminder_days` is informational; no query enforces it.

use super::{require_text, require_text_if_set, ValidationError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type AnniversaryId = i64;

/// Category assigned when the caller does not supply one.
pub const DEFAULT_ANNIVERSARY_CATEGORY: &str = "anniversary";

/// One persisted anniversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anniversary {
    pub id: AnniversaryId,
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: String,
    pub is_recurring: bool,
    pub reminder_days: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating an anniversary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAnniversary {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub reminder_days: i64,
}

impl NewAnniversary {
    /// Builds a one-off anniversary with default category and no reminder.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            description: None,
            category: default_category(),
            is_recurring: false,
            reminder_days: 0,
        }
    }

    /// Marks this anniversary as repeating every year on its month/day.
    pub fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("category", &self.category)?;
        Ok(())
    }
}

/// Partial update for an anniversary; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnniversaryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_days: Option<i64>,
}

impl AnniversaryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.is_recurring.is_none()
            && self.reminder_days.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text_if_set("title", self.title.as_deref())?;
        require_text_if_set("category", self.category.as_deref())?;
        Ok(())
    }
}

/// Anniversary due within an upcoming window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingAnniversary {
    #[serde(flatten)]
    pub anniversary: Anniversary,
    /// Days from today to the (projected) date; never negative.
    pub days_until: i64,
}

fn default_category() -> String {
    DEFAULT_ANNIVERSARY_CATEGORY.to_string()
}
