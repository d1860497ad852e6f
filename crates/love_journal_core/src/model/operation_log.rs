//! Operation (audit) log model.
//!
//! # Responsibility
//! - Name the mutation kinds and target relations recorded in the log.
//! - Give audit payloads one in-process shape while storage keeps JSON text.
//!
//! # Invariants
//! - Log rows are append-only.
//! - `record_id` is a soft reference; the target row may no longer exist.
//! - Malformed stored payloads decode to `None`, never to an error.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Kind of mutation captured by the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Create,
    Update,
    Delete,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unknown operation type `{other}`")),
        }
    }
}

impl Serialize for OperationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Relation whose rows are being mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditTarget {
    LoveRecords,
    Anniversaries,
}

impl AuditTarget {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::LoveRecords => "love_records",
            Self::Anniversaries => "anniversaries",
        }
    }
}

/// Structured snapshot attached to an audit entry.
///
/// Stored as JSON text: snapshots verbatim, updates as
/// `{"old_data": ..., "new_data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuditPayload {
    /// Input that produced a new row.
    CreateSnapshot(Value),
    /// Full row before the update and only the fields that were set.
    UpdateDiff { old_data: Value, new_data: Value },
    /// Full row as it was before deletion.
    DeleteSnapshot(Value),
}

impl AuditPayload {
    /// Operation kind this payload shape belongs to.
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::CreateSnapshot(_) => OperationType::Create,
            Self::UpdateDiff { .. } => OperationType::Update,
            Self::DeleteSnapshot(_) => OperationType::Delete,
        }
    }

    /// Serializes the payload into its storage text form.
    pub fn to_storage_text(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes stored text for a row of the given operation kind.
    ///
    /// Returns `None` for invalid JSON or a shape that does not match the
    /// operation kind.
    pub fn decode(operation: OperationType, raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        match operation {
            OperationType::Create if value.is_object() => Some(Self::CreateSnapshot(value)),
            OperationType::Delete if value.is_object() => Some(Self::DeleteSnapshot(value)),
            OperationType::Update => match value {
                Value::Object(mut map) => {
                    let old_data = map.remove("old_data")?;
                    let new_data = map.remove("new_data")?;
                    Some(Self::UpdateDiff { old_data, new_data })
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Request metadata attached to audit entries when available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One persisted audit row as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationLogEntry {
    pub id: i64,
    pub operation_type: OperationType,
    pub table_name: String,
    pub record_id: Option<i64>,
    pub operation_data: Option<AuditPayload>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Paging and filter options for listing the operation log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationLogQuery {
    /// Defaults to 100, clamped to `1..=1000`.
    pub limit: Option<u32>,
    pub offset: u32,
    pub table_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationTypeCount {
    pub operation_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table_name: String,
    pub count: i64,
}

/// Aggregate counts over the operation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationLogStats {
    pub operation_stats: Vec<OperationTypeCount>,
    pub table_stats: Vec<TableCount>,
    /// Entries whose UTC creation date is today.
    pub today_count: i64,
}

#[cfg(test)]
mod tests {
    use super::{AuditPayload, OperationType};
    use serde_json::json;

    #[test]
    fn update_diff_uses_old_and_new_data_keys() {
        let payload = AuditPayload::UpdateDiff {
            old_data: json!({ "mood": "happy" }),
            new_data: json!({ "mood": "sad" }),
        };
        let text = payload.to_storage_text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["old_data"]["mood"], "happy");
        assert_eq!(value["new_data"]["mood"], "sad");

        let decoded = AuditPayload::decode(OperationType::Update, &text).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn snapshot_is_stored_verbatim() {
        let payload = AuditPayload::CreateSnapshot(json!({ "title": "wedding" }));
        assert_eq!(payload.to_storage_text().unwrap(), r#"{"title":"wedding"}"#);
        assert_eq!(payload.operation_type(), OperationType::Create);
    }

    #[test]
    fn malformed_or_mismatched_payloads_decode_to_none() {
        assert!(AuditPayload::decode(OperationType::Create, "{not json").is_none());
        assert!(AuditPayload::decode(OperationType::Delete, "42").is_none());
        assert!(AuditPayload::decode(OperationType::Update, r#"{"old_data": {}}"#).is_none());
    }

    #[test]
    fn operation_type_parses_stored_labels() {
        assert_eq!("DELETE".parse::<OperationType>(), Ok(OperationType::Delete));
        assert!("PATCH".parse::<OperationType>().is_err());
    }
}
