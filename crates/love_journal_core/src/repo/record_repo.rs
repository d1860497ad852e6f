//! Love record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and aggregate queries over `love_records`.
//!
//! # Invariants
//! - Writes never touch `id` or `created_at`.
//! - Every update refreshes `updated_at`.

use crate::model::love_record::{
    CategoryCount, LoveRecord, LoveRecordPatch, MoodCount, NewLoveRecord, RecordFilter, RecordId,
};
use crate::repo::query::{date_value, Assignments, Column, Filter};
use crate::repo::{DateOrder, RepoResult};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const TABLE: &str = "love_records";

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    category,
    date,
    description,
    mood,
    timestamp,
    created_at,
    updated_at
FROM love_records";

/// Repository interface for journal entries.
pub trait RecordRepository {
    fn list_records(&self, filter: &RecordFilter, order: DateOrder) -> RepoResult<Vec<LoveRecord>>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<LoveRecord>>;
    fn insert_record(&self, record: &NewLoveRecord) -> RepoResult<RecordId>;
    /// Applies the set fields of `patch`; returns the number of changed rows.
    fn update_record(&self, id: RecordId, patch: &LoveRecordPatch) -> RepoResult<usize>;
    /// Returns the number of deleted rows.
    fn delete_record(&self, id: RecordId) -> RepoResult<usize>;
    fn count_records(&self) -> RepoResult<i64>;
    fn category_counts(&self) -> RepoResult<Vec<CategoryCount>>;
    fn mood_counts(&self) -> RepoResult<Vec<MoodCount>>;
    fn latest_record(&self) -> RepoResult<Option<LoveRecord>>;
}

/// SQLite-backed journal entry repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn list_records(&self, filter: &RecordFilter, order: DateOrder) -> RepoResult<Vec<LoveRecord>> {
        let predicates = Filter::new()
            .eq_text(Column::Category, filter.category.as_deref())
            .eq_text(Column::Mood, filter.mood.as_deref());
        let sql = format!(
            "{RECORD_SELECT_SQL}{}{};",
            predicates.where_sql(),
            order.as_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(predicates.into_params()))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }
        Ok(records)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<LoveRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }
        Ok(None)
    }

    fn insert_record(&self, record: &NewLoveRecord) -> RepoResult<RecordId> {
        self.conn.execute(
            "INSERT INTO love_records (
                category,
                date,
                description,
                mood,
                timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.category.as_str(),
                date_value(record.date),
                record.description.as_str(),
                record.mood.as_str(),
                record.timestamp,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_record(&self, id: RecordId, patch: &LoveRecordPatch) -> RepoResult<usize> {
        let mut assignments = Assignments::new();
        assignments.set_text(Column::Category, patch.category.as_deref());
        assignments.set_date(Column::Date, patch.date);
        assignments.set_text(Column::Description, patch.description.as_deref());
        assignments.set_text(Column::Mood, patch.mood.as_deref());
        assignments.set_integer(Column::Timestamp, patch.timestamp);
        if assignments.is_empty() {
            return Ok(0);
        }

        let sql = assignments.update_sql(TABLE);
        let changed = self
            .conn
            .execute(&sql, params_from_iter(assignments.into_params(id)))?;
        Ok(changed)
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM love_records WHERE id = ?1;", [id])?;
        Ok(changed)
    }

    fn count_records(&self) -> RepoResult<i64> {
        let total = self
            .conn
            .query_row("SELECT COUNT(*) FROM love_records;", [], |row| row.get(0))?;
        Ok(total)
    }

    fn category_counts(&self) -> RepoResult<Vec<CategoryCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*) AS count
             FROM love_records
             GROUP BY category
             ORDER BY count DESC, category ASC;",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok(CategoryCount {
                    category: row.get("category")?,
                    count: row.get("count")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn mood_counts(&self) -> RepoResult<Vec<MoodCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT mood, COUNT(*) AS count
             FROM love_records
             GROUP BY mood
             ORDER BY count DESC, mood ASC;",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok(MoodCount {
                    mood: row.get("mood")?,
                    count: row.get("count")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    fn latest_record(&self) -> RepoResult<Option<LoveRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}{} LIMIT 1;",
            DateOrder::Descending.as_sql()
        ))?;
        let record = stmt
            .query_row([], |row| Ok(parse_record_row(row)))
            .optional()?
            .transpose()?;
        Ok(record)
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<LoveRecord> {
    Ok(LoveRecord {
        id: row.get("id")?,
        category: row.get("category")?,
        date: row.get("date")?,
        description: row.get("description")?,
        mood: row.get("mood")?,
        timestamp: row.get("timestamp")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
