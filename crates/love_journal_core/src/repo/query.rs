//! Typed SQL fragment builders.
//!
//! # Responsibility
//! - Compose `WHERE` predicates and `SET` assignments from `(Column, value)`
//!   pairs that are present in the caller's input.
//!
//! # Invariants
//! - Only `Column` names are spliced into SQL text; values are always bound.
//! - Placeholders are numbered in push order starting at `?1`.

use chrono::NaiveDate;
use rusqlite::types::Value;

/// Columns that may appear in dynamically assembled statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Category,
    Mood,
    Date,
    Description,
    Timestamp,
    Title,
    IsRecurring,
    ReminderDays,
    TableName,
}

impl Column {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Mood => "mood",
            Self::Date => "date",
            Self::Description => "description",
            Self::Timestamp => "timestamp",
            Self::Title => "title",
            Self::IsRecurring => "is_recurring",
            Self::ReminderDays => "reminder_days",
            Self::TableName => "table_name",
        }
    }
}

/// Conjunction of equality predicates.
#[derive(Debug, Default)]
pub struct Filter {
    predicates: Vec<(Column, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column = value` when `value` is set and not blank.
    pub fn eq_text(mut self, column: Column, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|value| !value.trim().is_empty()) {
            self.predicates.push((column, Value::Text(value.to_string())));
        }
        self
    }

    /// Renders `" WHERE a = ?1 AND b = ?2"`, or an empty string.
    pub fn where_sql(&self) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }
        let clauses = self
            .predicates
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{} = ?{}", column.as_sql(), index + 1))
            .collect::<Vec<_>>();
        format!(" WHERE {}", clauses.join(" AND "))
    }

    /// Number of the first placeholder after this filter's own.
    pub fn next_placeholder(&self) -> usize {
        self.predicates.len() + 1
    }

    pub fn into_params(self) -> Vec<Value> {
        self.predicates.into_iter().map(|(_, value)| value).collect()
    }
}

/// Column assignments for a partial `UPDATE ... WHERE id = ?`.
#[derive(Debug, Default)]
pub struct Assignments {
    pairs: Vec<(Column, Value)>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, column: Column, value: Option<&str>) {
        if let Some(value) = value {
            self.pairs.push((column, Value::Text(value.to_string())));
        }
    }

    pub fn set_integer(&mut self, column: Column, value: Option<i64>) {
        if let Some(value) = value {
            self.pairs.push((column, Value::Integer(value)));
        }
    }

    pub fn set_bool(&mut self, column: Column, value: Option<bool>) {
        self.set_integer(column, value.map(i64::from));
    }

    pub fn set_date(&mut self, column: Column, value: Option<NaiveDate>) {
        if let Some(value) = value {
            self.pairs.push((column, date_value(value)));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Renders the update statement; `updated_at` is always refreshed.
    pub fn update_sql(&self, table: &str) -> String {
        let assignments = self
            .pairs
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{} = ?{}", column.as_sql(), index + 1))
            .collect::<Vec<_>>();
        format!(
            "UPDATE {table} SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ?{};",
            assignments.join(", "),
            self.pairs.len() + 1
        )
    }

    /// Returns bound values followed by the row id.
    pub fn into_params(self, id: i64) -> Vec<Value> {
        let mut params = self
            .pairs
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>();
        params.push(Value::Integer(id));
        params
    }
}

/// Storage form of a calendar date (`YYYY-MM-DD`).
pub fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::{Assignments, Column, Filter};
    use chrono::NaiveDate;
    use rusqlite::types::Value;

    #[test]
    fn empty_filter_renders_nothing() {
        let filter = Filter::new().eq_text(Column::Category, None);
        assert_eq!(filter.where_sql(), "");
        assert_eq!(filter.next_placeholder(), 1);
    }

    #[test]
    fn filter_skips_blank_values_and_numbers_placeholders() {
        let filter = Filter::new()
            .eq_text(Column::Category, Some(""))
            .eq_text(Column::Mood, Some("happy"))
            .eq_text(Column::TableName, Some("love_records"));
        assert_eq!(filter.where_sql(), " WHERE mood = ?1 AND table_name = ?2");
        assert_eq!(filter.next_placeholder(), 3);
        assert_eq!(
            filter.into_params(),
            vec![
                Value::Text("happy".to_string()),
                Value::Text("love_records".to_string())
            ]
        );
    }

    #[test]
    fn assignments_render_update_with_trailing_id() {
        let mut assignments = Assignments::new();
        assignments.set_text(Column::Mood, Some("sad"));
        assignments.set_date(Column::Date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assignments.set_bool(Column::IsRecurring, Some(true));
        assert_eq!(
            assignments.update_sql("anniversaries"),
            "UPDATE anniversaries SET mood = ?1, date = ?2, is_recurring = ?3, updated_at = CURRENT_TIMESTAMP WHERE id = ?4;"
        );
        let params = assignments.into_params(7);
        assert_eq!(params[1], Value::Text("2024-01-02".to_string()));
        assert_eq!(params[2], Value::Integer(1));
        assert_eq!(params[3], Value::Integer(7));
    }
}
