//! Anniversary repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `is_recurring` is persisted as `0|1`; any other value is corrupt data.
//! - Listing is ordered by stored date ascending, then id.

use crate::model::anniversary::{Anniversary, AnniversaryId, AnniversaryPatch, NewAnniversary};
use crate::repo::query::{date_value, Assignments, Column, Filter};
use crate::repo::{parse_bool, DateOrder, RepoResult};
use rusqlite::{params, params_from_iter, Connection, Row};

const TABLE: &str = "anniversaries";

const ANNIVERSARY_SELECT_SQL: &str = "SELECT
    id,
    title,
    date,
    description,
    category,
    is_recurring,
    reminder_days,
    created_at,
    updated_at
FROM anniversaries";

/// Repository interface for anniversaries.
pub trait AnniversaryRepository {
    fn list_anniversaries(&self, category: Option<&str>) -> RepoResult<Vec<Anniversary>>;
    fn get_anniversary(&self, id: AnniversaryId) -> RepoResult<Option<Anniversary>>;
    fn insert_anniversary(&self, anniversary: &NewAnniversary) -> RepoResult<AnniversaryId>;
    fn update_anniversary(&self, id: AnniversaryId, patch: &AnniversaryPatch)
        -> RepoResult<usize>;
    fn delete_anniversary(&self, id: AnniversaryId) -> RepoResult<usize>;
}

/// SQLite-backed anniversary repository.
pub struct SqliteAnniversaryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAnniversaryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AnniversaryRepository for SqliteAnniversaryRepository<'_> {
    fn list_anniversaries(&self, category: Option<&str>) -> RepoResult<Vec<Anniversary>> {
        let predicates = Filter::new().eq_text(Column::Category, category);
        let sql = format!(
            "{ANNIVERSARY_SELECT_SQL}{}{};",
            predicates.where_sql(),
            DateOrder::Ascending.as_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(predicates.into_params()))?;
        let mut anniversaries = Vec::new();
        while let Some(row) = rows.next()? {
            anniversaries.push(parse_anniversary_row(row)?);
        }
        Ok(anniversaries)
    }

    fn get_anniversary(&self, id: AnniversaryId) -> RepoResult<Option<Anniversary>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ANNIVERSARY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_anniversary_row(row)?));
        }
        Ok(None)
    }

    fn insert_anniversary(&self, anniversary: &NewAnniversary) -> RepoResult<AnniversaryId> {
        self.conn.execute(
            "INSERT INTO anniversaries (
                title,
                date,
                description,
                category,
                is_recurring,
                reminder_days
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                anniversary.title.as_str(),
                date_value(anniversary.date),
                anniversary.description.as_deref(),
                anniversary.category.as_str(),
                i64::from(anniversary.is_recurring),
                anniversary.reminder_days,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_anniversary(
        &self,
        id: AnniversaryId,
        patch: &AnniversaryPatch,
    ) -> RepoResult<usize> {
        let mut assignments = Assignments::new();
        assignments.set_text(Column::Title, patch.title.as_deref());
        assignments.set_date(Column::Date, patch.date);
        assignments.set_text(Column::Description, patch.description.as_deref());
        assignments.set_text(Column::Category, patch.category.as_deref());
        assignments.set_bool(Column::IsRecurring, patch.is_recurring);
        assignments.set_integer(Column::ReminderDays, patch.reminder_days);
        if assignments.is_empty() {
            return Ok(0);
        }

        let sql = assignments.update_sql(TABLE);
        let changed = self
            .conn
            .execute(&sql, params_from_iter(assignments.into_params(id)))?;
        Ok(changed)
    }

    fn delete_anniversary(&self, id: AnniversaryId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM anniversaries WHERE id = ?1;", [id])?;
        Ok(changed)
    }
}

fn parse_anniversary_row(row: &Row<'_>) -> RepoResult<Anniversary> {
    let is_recurring = parse_bool(row.get("is_recurring")?, "anniversaries.is_recurring")?;
    Ok(Anniversary {
        id: row.get("id")?,
        title: row.get("title")?,
        date: row.get("date")?,
        description: row.get("description")?,
        category: row.get("category")?,
        is_recurring,
        reminder_days: row.get("reminder_days")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
