//! Operation log repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append audit rows and serve the listing/stats read paths.
//!
//! # Invariants
//! - Rows are only ever inserted; there is no update or delete path.
//! - Stored payload text that fails to decode is surfaced as `None`.

use crate::model::operation_log::{
    AuditPayload, OperationLogEntry, OperationLogQuery, OperationLogStats, OperationType,
    OperationTypeCount, TableCount,
};
use crate::repo::query::{Column, Filter};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const DEFAULT_LIST_LIMIT: u32 = 100;
const MAX_LIST_LIMIT: u32 = 1000;

/// Insert shape for one audit row.
#[derive(Debug, Clone, Copy)]
pub struct NewOperationLog<'a> {
    pub operation_type: OperationType,
    pub table_name: &'a str,
    pub record_id: Option<i64>,
    pub operation_data: Option<&'a str>,
    pub ip_address: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Repository interface for the operation log.
pub trait OperationLogRepository {
    fn append(&self, entry: &NewOperationLog<'_>) -> RepoResult<i64>;
    fn list(&self, query: &OperationLogQuery) -> RepoResult<Vec<OperationLogEntry>>;
    fn stats(&self) -> RepoResult<OperationLogStats>;
}

/// SQLite-backed operation log repository.
pub struct SqliteOperationLogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOperationLogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl OperationLogRepository for SqliteOperationLogRepository<'_> {
    fn append(&self, entry: &NewOperationLog<'_>) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO operation_logs (
                operation_type,
                table_name,
                record_id,
                operation_data,
                ip_address,
                user_agent
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.operation_type.as_str(),
                entry.table_name,
                entry.record_id,
                entry.operation_data,
                entry.ip_address,
                entry.user_agent,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list(&self, query: &OperationLogQuery) -> RepoResult<Vec<OperationLogEntry>> {
        let predicates = Filter::new().eq_text(Column::TableName, query.table_name.as_deref());
        let next_placeholder = predicates.next_placeholder();
        let sql = format!(
            "SELECT
                id,
                operation_type,
                table_name,
                record_id,
                operation_data,
                ip_address,
                user_agent,
                created_at
             FROM operation_logs{}
             ORDER BY created_at DESC, id DESC
             LIMIT ?{} OFFSET ?{};",
            predicates.where_sql(),
            next_placeholder,
            next_placeholder + 1
        );

        let mut bind_values = predicates.into_params();
        bind_values.push(Value::Integer(i64::from(normalize_list_limit(query.limit))));
        bind_values.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_log_row(row)?);
        }
        Ok(entries)
    }

    fn stats(&self) -> RepoResult<OperationLogStats> {
        let mut stmt = self.conn.prepare(
            "SELECT operation_type, COUNT(*) AS count
             FROM operation_logs
             GROUP BY operation_type
             ORDER BY count DESC, operation_type ASC;",
        )?;
        let operation_stats = stmt
            .query_map([], |row| {
                Ok(OperationTypeCount {
                    operation_type: row.get("operation_type")?,
                    count: row.get("count")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT table_name, COUNT(*) AS count
             FROM operation_logs
             GROUP BY table_name
             ORDER BY count DESC, table_name ASC;",
        )?;
        let table_stats = stmt
            .query_map([], |row| {
                Ok(TableCount {
                    table_name: row.get("table_name")?,
                    count: row.get("count")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let today_count = self.conn.query_row(
            "SELECT COUNT(*) FROM operation_logs WHERE date(created_at) = date('now');",
            [],
            |row| row.get(0),
        )?;

        Ok(OperationLogStats {
            operation_stats,
            table_stats,
            today_count,
        })
    }
}

/// Normalizes the listing limit: default 100, clamped to `1..=1000`.
pub fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => DEFAULT_LIST_LIMIT,
        Some(value) if value > MAX_LIST_LIMIT => MAX_LIST_LIMIT,
        Some(value) => value,
    }
}

fn parse_log_row(row: &Row<'_>) -> RepoResult<OperationLogEntry> {
    let type_text: String = row.get("operation_type")?;
    let operation_type = type_text.parse::<OperationType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid operation type `{type_text}` in operation_logs.operation_type"
        ))
    })?;

    let operation_data = row
        .get::<_, Option<String>>("operation_data")?
        .and_then(|raw| AuditPayload::decode(operation_type, &raw));

    Ok(OperationLogEntry {
        id: row.get("id")?,
        operation_type,
        table_name: row.get("table_name")?,
        record_id: row.get("record_id")?,
        operation_data,
        ip_address: row.get("ip_address")?,
        user_agent: row.get("user_agent")?,
        created_at: row.get("created_at")?,
    })
}
