use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmployeesError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{message}")]
    Conflict { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl EmployeesError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for EmployeesError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            PersonNotFound { id } => Self::not_found("Person", id),
            DepartmentNotFound { id } => Self::not_found("Department", id),
            NoteNotFound { id } => Self::not_found("Note", id),
            e @ (EmailAlreadyExists { .. }
            | EmployeeIdAlreadyExists { .. }
            | DepartmentNameExists { .. }
            | IdentifierExhausted { .. }) => Self::conflict(e.to_string()),
            Validation { violations } => Self::validation(
                violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Database { .. } => Self::internal(),
        }
    }
}
