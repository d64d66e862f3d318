use thiserror::Error;
use uuid::Uuid;

use crate::domain::validation::FieldViolation;

fn join(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Person not found: {id}")]
    PersonNotFound { id: Uuid },

    #[error("Department not found: {id}")]
    DepartmentNotFound { id: Uuid },

    #[error("Note not found: {id}")]
    NoteNotFound { id: Uuid },

    #[error("A person with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("A person with employee ID '{employee_id}' already exists")]
    EmployeeIdAlreadyExists { employee_id: String },

    #[error("A department named '{name}' already exists")]
    DepartmentNameExists { name: String },

    #[error("Could not allocate a unique employee ID from '{base}' after {attempts} attempts")]
    IdentifierExhausted { base: String, attempts: u32 },

    #[error("Validation failed: {}", join(.violations))]
    Validation { violations: Vec<FieldViolation> },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn person_not_found(id: Uuid) -> Self {
        Self::PersonNotFound { id }
    }

    pub fn department_not_found(id: Uuid) -> Self {
        Self::DepartmentNotFound { id }
    }

    pub fn note_not_found(id: Uuid) -> Self {
        Self::NoteNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn employee_id_already_exists(employee_id: impl Into<String>) -> Self {
        Self::EmployeeIdAlreadyExists {
            employee_id: employee_id.into(),
        }
    }

    pub fn department_name_exists(name: impl Into<String>) -> Self {
        Self::DepartmentNameExists { name: name.into() }
    }

    pub fn identifier_exhausted(base: impl Into<String>, attempts: u32) -> Self {
        Self::IdentifierExhausted {
            base: base.into(),
            attempts,
        }
    }

    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self::Validation { violations }
    }

    /// Single-field validation failure.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![FieldViolation::new(field, message)],
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<Vec<FieldViolation>> for DomainError {
    fn from(violations: Vec<FieldViolation>) -> Self {
        Self::validation(violations)
    }
}
