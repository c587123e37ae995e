use std::fmt;

use thiserror::Error;

/// Stable machine-readable failure codes returned to clients.
pub(crate) mod codes {
    pub(crate) const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub(crate) const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

    pub(crate) const INVITE_NOT_FOUND: &str = "INVITE_NOT_FOUND";
    pub(crate) const INVITE_EXPIRED: &str = "INVITE_EXPIRED";
    pub(crate) const INVITE_ALREADY_USED: &str = "INVITE_ALREADY_USED";
    pub(crate) const INVITE_DELIVERY_FAILED: &str = "INVITE_DELIVERY_FAILED";
    pub(crate) const INVITE_ACCEPT_FAILED: &str = "INVITE_ACCEPT_FAILED";
    pub(crate) const EMAIL_ALREADY_REGISTERED: &str = "EMAIL_ALREADY_REGISTERED";
    pub(crate) const EMAIL_ALREADY_INVITED: &str = "EMAIL_ALREADY_INVITED";
    pub(crate) const USER_ALREADY_EXISTS: &str = "USER_ALREADY_EXISTS";
    pub(crate) const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub(crate) const USERNAME_TAKEN: &str = "USERNAME_TAKEN";
    pub(crate) const USERNAME_GENERATION_FAILED: &str = "USERNAME_GENERATION_FAILED";
    pub(crate) const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub(crate) const INACTIVE_ACCOUNT: &str = "INACTIVE_ACCOUNT";

    pub(crate) const CLASS_NOT_FOUND: &str = "CLASS_NOT_FOUND";
    pub(crate) const CLASS_ALREADY_EXISTS: &str = "CLASS_ALREADY_EXISTS";
    pub(crate) const STUDENT_NOT_FOUND: &str = "STUDENT_NOT_FOUND";
    pub(crate) const STUDENT_ALREADY_IN_CLASS: &str = "STUDENT_ALREADY_IN_CLASS";

    pub(crate) const ACADEMIC_YEAR_NOT_FOUND: &str = "ACADEMIC_YEAR_NOT_FOUND";
    pub(crate) const ACADEMIC_PERIOD_NOT_FOUND: &str = "ACADEMIC_PERIOD_NOT_FOUND";
    pub(crate) const NO_CURRENT_ACADEMIC_YEAR_FOUND: &str = "NO_CURRENT_ACADEMIC_YEAR_FOUND";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Unauthorized,
    DependencyFailure,
    Internal,
}

impl ErrorKind {
    pub(crate) fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::DependencyFailure => 502,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub(crate) struct DomainError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
}

impl DomainError {
    pub(crate) fn new(kind: ErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self { kind, code, message: message.into() }
    }

    pub(crate) fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code, message)
    }

    pub(crate) fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, code, message)
    }

    /// Malformed input: bad dates, empty names, short passwords.
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, codes::VALIDATION_ERROR, message)
    }

    /// Input that is well-formed but collides with stored calendar data.
    pub(crate) fn collision(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, codes::VALIDATION_ERROR, message)
    }

    pub(crate) fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, code, message)
    }

    pub(crate) fn dependency(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DependencyFailure, code, message)
    }

    /// Logs `err` and returns an opaque internal failure; the cause never reaches clients.
    pub(crate) fn internal(
        err: impl fmt::Display,
        code: &'static str,
        context: &'static str,
    ) -> Self {
        tracing::error!(error = %err, code, "{context}");
        Self::new(ErrorKind::Internal, code, context)
    }

    /// Store failure with the generic internal code.
    pub(crate) fn store(err: sqlx::Error, context: &'static str) -> Self {
        Self::internal(err, codes::INTERNAL_ERROR, context)
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub(crate) fn code(&self) -> &'static str {
        self.code
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

/// Whether `err` is a unique violation on the named index.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error()
        .filter(|db_err| db_err.is_unique_violation())
        .and_then(|db_err| db_err.constraint())
        .is_some_and(|name| name == constraint)
}
