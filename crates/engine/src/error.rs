//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] cheap local checks rejected the request before the store was touched.
//! - [`NotFound`] a referenced row does not exist for the owner.
//! - [`ConstraintViolation`] the store rejected a statement on a unique or foreign key.
//! - [`Connectivity`] the store could not be reached or a statement could not run.
//! - [`CommitFailure`] every statement of an atomic unit ran but the commit failed.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`ConstraintViolation`]: EngineError::ConstraintViolation
//!  [`Connectivity`]: EngineError::Connectivity
//!  [`CommitFailure`]: EngineError::CommitFailure
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Constraint violation while {step}: {source}")]
    ConstraintViolation { step: String, source: DbErr },
    #[error("Store unavailable while {step}: {source}")]
    Connectivity { step: String, source: DbErr },
    #[error("Commit failed: {0}")]
    CommitFailure(DbErr),
}

impl EngineError {
    /// Classify a store error raised while executing `step` and log it.
    ///
    /// The classification relies on the kind reported by the driver, never
    /// on the error text.
    pub(crate) fn store(step: impl Into<String>, err: DbErr) -> Self {
        let step = step.into();
        tracing::error!("error {step}: {err}");

        if err.sql_err().is_some() {
            return Self::ConstraintViolation { step, source: err };
        }
        match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => Self::NotFound(step),
            other => Self::Connectivity {
                step,
                source: other,
            },
        }
    }

    /// Label of the store step that failed, if the error came from the store.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::ConstraintViolation { step, .. } | Self::Connectivity { step, .. } => {
                Some(step.as_str())
            }
            _ => None,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (
                Self::ConstraintViolation { step: a, source: x },
                Self::ConstraintViolation { step: b, source: y },
            )
            | (
                Self::Connectivity { step: a, source: x },
                Self::Connectivity { step: b, source: y },
            ) => a == b && x.to_string() == y.to_string(),
            (Self::CommitFailure(a), Self::CommitFailure(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_is_not_found() {
        let err = EngineError::store("fetching wallet", DbErr::RecordNotFound("x".to_string()));
        assert_eq!(err, EngineError::NotFound("fetching wallet".to_string()));
    }

    #[test]
    fn connection_errors_keep_their_step() {
        let err = EngineError::store(
            "inserting transaction",
            DbErr::Custom("connection refused".to_string()),
        );
        assert!(matches!(err, EngineError::Connectivity { .. }));
        assert_eq!(err.step(), Some("inserting transaction"));
    }

    #[test]
    fn validation_has_no_step() {
        assert_eq!(EngineError::Validation("x".to_string()).step(), None);
    }
}
