// sqlx::Error -> AppError mapping with SQLite result-code classification
// (orphan rules prevent a From impl here)

use playdeck_core::error::AppError;

/// SQLite extended codes for UNIQUE / PRIMARY KEY violations
const UNIQUE_VIOLATION_CODES: [&str; 2] = ["2067", "1555"];

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => {
                let code_str = code.as_ref();
                match code_str {
                    c if UNIQUE_VIOLATION_CODES.contains(&c) => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "787" | "3850" => AppError::Database(format!(
                        "Foreign key constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            }
            None => AppError::Database(format!("Database error: {}", db_err.message())),
        },
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// True if the error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| UNIQUE_VIOLATION_CODES.contains(&code.as_ref()))
            .unwrap_or(false),
        _ => false,
    }
}

/// Stored row that no longer parses into a domain value
pub(crate) fn corrupt_row(table: &str, id: i64, detail: impl std::fmt::Display) -> AppError {
    AppError::Database(format!("Corrupt row {} in {}: {}", id, table, detail))
}
