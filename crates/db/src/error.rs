use panels_core::error::CoreError;

/// Error type returned by repositories, the transaction scope, and the
/// service facade.
///
/// Domain failures are classified into [`CoreError`]; every other storage
/// fault passes through unmodified as [`RepoError::Database`].
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Whether `err` is a unique-constraint violation on one of our `uq_`
/// constraints.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err
                    .constraint()
                    .is_some_and(|constraint| constraint.starts_with("uq_"))
        }
        _ => false,
    }
}
