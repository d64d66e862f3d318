use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use http_problem::{ProblemResponse, ValidationError};
use std::convert::Infallible;

use crate::domain::error::DomainError;
use crate::errors::ErrorCode;

/// Request context attached to every problem: the path as `instance` and the
/// id set by the ingress `x-request-id` layer.
#[derive(Debug, Clone, Default)]
pub struct RequestCtx {
    pub path: String,
    pub request_id: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestCtx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Ok(Self {
            path: parts.uri.path().to_owned(),
            request_id,
        })
    }
}

impl RequestCtx {
    pub fn problem(&self, code: ErrorCode, detail: impl Into<String>) -> ProblemResponse {
        code.to_response(detail, &self.path, self.request_id.clone())
    }

    /// 400 for query values that parse but make no sense.
    pub fn bad_request(&self, detail: impl Into<String>) -> ProblemResponse {
        let mut resp = http_problem::bad_request(detail);
        resp.0 = resp.0.with_instance(self.path.clone());
        if let Some(id) = &self.request_id {
            resp.0 = resp.0.with_request_id(id.clone());
        }
        resp
    }
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, ctx: &RequestCtx) -> ProblemResponse {
    match e {
        DomainError::PersonNotFound { id } => ctx.problem(
            ErrorCode::employees_person_not_found_v1,
            format!("Employee with id {id} was not found"),
        ),
        DomainError::DepartmentNotFound { id } => ctx.problem(
            ErrorCode::employees_department_not_found_v1,
            format!("Department with id {id} was not found"),
        ),
        DomainError::NoteNotFound { id } => ctx.problem(
            ErrorCode::employees_note_not_found_v1,
            format!("Note with id {id} was not found"),
        ),
        DomainError::EmailAlreadyExists { email } => ctx.problem(
            ErrorCode::employees_person_email_conflict_v1,
            format!("Email '{email}' is already in use"),
        ),
        DomainError::EmployeeIdAlreadyExists { employee_id } => ctx.problem(
            ErrorCode::employees_person_employee_id_conflict_v1,
            format!("Employee ID '{employee_id}' is already in use"),
        ),
        DomainError::DepartmentNameExists { name } => ctx.problem(
            ErrorCode::employees_department_name_conflict_v1,
            format!("A department named '{name}' already exists"),
        ),
        DomainError::IdentifierExhausted { .. } => {
            tracing::warn!(error = %e, "Employee ID allocation gave up");
            ctx.problem(ErrorCode::employees_person_identifier_exhausted_v1, e.to_string())
        }
        DomainError::Validation { violations } => {
            let errors = violations
                .iter()
                .map(|v| ValidationError {
                    detail: v.message.clone(),
                    pointer: format!("/{}", v.field),
                })
                .collect();
            let mut resp = ctx.problem(ErrorCode::employees_validation_v1, e.to_string());
            resp.0 = resp.0.with_errors(errors);
            resp
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            ctx.problem(
                ErrorCode::employees_internal_database_v1,
                "An internal database error occurred",
            )
        }
    }
}
