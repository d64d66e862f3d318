//! Error catalog of the employees module. Every problem the REST layer emits
//! carries one of these codes.

use http_problem::{ErrDef, Problem, ProblemResponse};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    employees_validation_v1,
    employees_person_not_found_v1,
    employees_department_not_found_v1,
    employees_note_not_found_v1,
    employees_person_email_conflict_v1,
    employees_person_employee_id_conflict_v1,
    employees_person_identifier_exhausted_v1,
    employees_department_name_conflict_v1,
    employees_internal_database_v1,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 9] = [
        ErrorCode::employees_validation_v1,
        ErrorCode::employees_person_not_found_v1,
        ErrorCode::employees_department_not_found_v1,
        ErrorCode::employees_note_not_found_v1,
        ErrorCode::employees_person_email_conflict_v1,
        ErrorCode::employees_person_employee_id_conflict_v1,
        ErrorCode::employees_person_identifier_exhausted_v1,
        ErrorCode::employees_department_name_conflict_v1,
        ErrorCode::employees_internal_database_v1,
    ];

    pub const fn def(&self) -> ErrDef {
        match self {
            ErrorCode::employees_validation_v1 => ErrDef {
                status: 422,
                title: "Validation Failed",
                code: "employees.validation.v1",
            },
            ErrorCode::employees_person_not_found_v1 => ErrDef {
                status: 404,
                title: "Employee Not Found",
                code: "employees.person.not_found.v1",
            },
            ErrorCode::employees_department_not_found_v1 => ErrDef {
                status: 404,
                title: "Department Not Found",
                code: "employees.department.not_found.v1",
            },
            ErrorCode::employees_note_not_found_v1 => ErrDef {
                status: 404,
                title: "Note Not Found",
                code: "employees.note.not_found.v1",
            },
            ErrorCode::employees_person_email_conflict_v1 => ErrDef {
                status: 409,
                title: "Email Already Exists",
                code: "employees.person.email_conflict.v1",
            },
            ErrorCode::employees_person_employee_id_conflict_v1 => ErrDef {
                status: 409,
                title: "Employee ID Already Exists",
                code: "employees.person.employee_id_conflict.v1",
            },
            ErrorCode::employees_person_identifier_exhausted_v1 => ErrDef {
                status: 409,
                title: "Employee ID Allocation Failed",
                code: "employees.person.identifier_exhausted.v1",
            },
            ErrorCode::employees_department_name_conflict_v1 => ErrDef {
                status: 409,
                title: "Department Already Exists",
                code: "employees.department.name_conflict.v1",
            },
            ErrorCode::employees_internal_database_v1 => ErrDef {
                status: 500,
                title: "Internal Server Error",
                code: "employees.internal.database.v1",
            },
        }
    }

    #[inline]
    pub fn status(&self) -> u16 {
        self.def().status
    }

    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        self.def().to_problem(detail)
    }

    /// Problem response with the request context attached.
    pub fn to_response(
        &self,
        detail: impl Into<String>,
        instance: &str,
        request_id: Option<String>,
    ) -> ProblemResponse {
        let mut problem = self.to_problem(detail).with_instance(instance);
        if let Some(id) = request_id {
            problem = problem.with_request_id(id);
        }
        ProblemResponse(problem)
    }
}
