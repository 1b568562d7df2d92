pub mod slot;
pub mod slot_request;
pub mod user;

/// Postgres SQLSTATE for `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

fn violated_constraint(err: &eyre::Report, code: &str) -> Option<String> {
    match err.downcast_ref::<sqlx::Error>()? {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(code) => {
            Some(db_err.constraint().unwrap_or("constraint").to_string())
        }
        _ => None,
    }
}

/// Returns the violated constraint's name if `err` wraps a unique violation.
pub fn unique_violation(err: &eyre::Report) -> Option<String> {
    violated_constraint(err, UNIQUE_VIOLATION)
}

/// Returns the violated constraint's name if `err` wraps a foreign key violation.
pub fn foreign_key_violation(err: &eyre::Report) -> Option<String> {
    violated_constraint(err, FOREIGN_KEY_VIOLATION)
}
