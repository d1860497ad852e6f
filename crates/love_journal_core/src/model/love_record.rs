//! Love record (journal entry) model.
//!
//! # Invariants
//! - `category`, `description` and `mood` are non-blank once persisted.
//! - `timestamp` is opaque client data and never drives ordering.

use super::{require_text, require_text_if_set, ValidationError};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type RecordId = i64;

/// One persisted journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoveRecord {
    pub id: RecordId,
    pub category: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub description: String,
    pub mood: String,
    /// Client-supplied integer, usually epoch milliseconds.
    pub timestamp: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoveRecord {
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
    pub mood: String,
    pub timestamp: i64,
}

impl NewLoveRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("category", &self.category)?;
        require_text("description", &self.description)?;
        require_text("mood", &self.mood)?;
        Ok(())
    }
}

/// Partial update for a journal entry.
///
/// Absent (or `null`) fields are left untouched. Serializing a patch only
/// emits the fields that were set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoveRecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl LoveRecordPatch {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.date.is_none()
            && self.description.is_none()
            && self.mood.is_none()
            && self.timestamp.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text_if_set("category", self.category.as_deref())?;
        require_text_if_set("description", self.description.as_deref())?;
        require_text_if_set("mood", self.mood.as_deref())?;
        Ok(())
    }
}

/// Optional conjunctive filters for listing records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordFilter {
    pub category: Option<String>,
    pub mood: Option<String>,
}

/// Row count for one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Row count for one mood value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodCount {
    pub mood: String,
    pub count: i64,
}

/// Aggregate view over all journal entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    pub total_records: i64,
    pub category_stats: Vec<CategoryCount>,
    pub mood_stats: Vec<MoodCount>,
    /// Entry with the latest date; highest id wins on equal dates.
    pub latest_record: Option<LoveRecord>,
}

/// Export envelope, records in ascending date order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordExport {
    pub export_time: NaiveDateTime,
    pub total_records: usize,
    pub category_filter: Option<String>,
    pub records: Vec<LoveRecord>,
}

#[cfg(test)]
mod tests {
    use super::{LoveRecordPatch, NewLoveRecord};
    use crate::model::ValidationError;
    use chrono::NaiveDate;

    fn sample() -> NewLoveRecord {
        NewLoveRecord {
            category: "gift".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
            description: "flowers".to_string(),
            mood: "happy".to_string(),
            timestamp: 1_707_868_800_000,
        }
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut record = sample();
        record.mood = "   ".to_string();
        assert_eq!(record.validate(), Err(ValidationError::BlankField("mood")));
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = LoveRecordPatch {
            mood: Some("sad".to_string()),
            ..LoveRecordPatch::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "mood": "sad" }));
        assert!(!patch.is_empty());
        assert!(LoveRecordPatch::default().is_empty());
    }

    #[test]
    fn patch_treats_null_as_unset() {
        let patch: LoveRecordPatch =
            serde_json::from_str(r#"{"category": null, "date": "2024-03-01"}"#).unwrap();
        assert!(patch.category.is_none());
        assert_eq!(patch.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
