use thiserror::Error;

/// Error types for enrollment and listing operations.
#[derive(Error, Debug)]
pub enum EnrollmentError {
    /// Malformed or inconsistent input, e.g. workout ids that do not
    /// resolve to workouts owned by the caller.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity is absent. Delete operations also use this
    /// for foreign-owned targets so ownership is not leaked.
    #[error("not found: {0}")]
    NotFound(String),

    /// Role or ownership check failed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Duplicate or missing membership state for enroll/unenroll.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Error from the underlying store, surfaced as-is and never
    /// retried.
    #[error("store error: {0}")]
    Store(#[from] sea_orm::DbErr),
}

/// Type alias for Result with EnrollmentError.
pub type Result<T> = std::result::Result<T, EnrollmentError>;
