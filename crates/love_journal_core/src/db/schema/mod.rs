//! Idempotent creation of the journal relations.
//!
//! # Responsibility
//! - Ensure `love_records`, `anniversaries` and `operation_logs` exist.
//! - Tolerate concurrent schema checks racing on the same file.
//!
//! # Invariants
//! - Every statement is `IF NOT EXISTS`; re-running is a no-op.
//! - An "already exists" failure is logged and skipped, never fatal.

use crate::config::DatabaseConfig;
use crate::db::{DbError, DbResult};
use log::{error, info, warn};
use rusqlite::Connection;

/// Names of every relation owned by the core, in creation order.
pub const TABLE_NAMES: [&str; 3] = ["love_records", "anniversaries", "operation_logs"];

struct TableSchema {
    name: &'static str,
    create_sql: &'static str,
    index_sql: &'static str,
}

const TABLES: &[TableSchema] = &[
    TableSchema {
        name: "love_records",
        create_sql: include_str!("love_records.sql"),
        index_sql: "CREATE INDEX IF NOT EXISTS idx_love_records_date ON love_records (date);",
    },
    TableSchema {
        name: "anniversaries",
        create_sql: include_str!("anniversaries.sql"),
        index_sql: "CREATE INDEX IF NOT EXISTS idx_anniversaries_date ON anniversaries (date);",
    },
    TableSchema {
        name: "operation_logs",
        create_sql: include_str!("operation_logs.sql"),
        index_sql:
            "CREATE INDEX IF NOT EXISTS idx_operation_logs_created_at ON operation_logs (created_at);",
    },
];

/// Creates every missing journal relation on `conn`.
///
/// # Errors
/// - Returns `DbError::Schema` for any failure other than "already exists".
pub fn ensure_schema(conn: &Connection, config: &DatabaseConfig) -> DbResult<()> {
    for table in TABLES {
        let sql = table_ddl(table, config.strict());
        match conn.execute_batch(&sql) {
            Ok(()) => {
                info!(
                    "event=schema_check module=db status=ok table={} strict={}",
                    table.name,
                    config.strict()
                );
            }
            Err(err) if is_already_exists(&err) => {
                warn!(
                    "event=schema_check module=db status=skipped table={} reason=already_exists error={}",
                    table.name, err
                );
            }
            Err(err) => {
                error!(
                    "event=schema_check module=db status=error table={} error={}",
                    table.name, err
                );
                return Err(DbError::Schema {
                    table: table.name,
                    source: err,
                });
            }
        }
    }

    info!("event=schema_ready module=db status=ok");
    Ok(())
}

fn table_ddl(table: &TableSchema, strict: bool) -> String {
    let create = table.create_sql.trim().trim_end_matches(';');
    let suffix = if strict { " STRICT" } else { "" };
    format!("{create}{suffix};\n{}", table.index_sql)
}

fn is_already_exists(err: &rusqlite::Error) -> bool {
    err.to_string().contains("already exists")
}
