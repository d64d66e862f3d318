use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use axum::{http::StatusCode, response::Response, Extension, Json};
use http_problem::{Problem, ProblemResponse};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    BulkDeleteDto, BulkDeleteReq, CheckEmailQuery, CheckEmployeeIdQuery, CreateDepartmentReq,
    CreateNoteReq, CreatePersonReq, DashboardDto, DepartmentDetailDto, DepartmentDto,
    DepartmentReportRowDto, DepartmentSummaryDto, ExistsDto, GenerateIdQuery, GeneratedIdDto,
    ListPeopleQuery, NoteDto, PersonDetailDto, PersonDto, PersonListDto, SalaryReportDto,
    SearchHitDto, SearchQuery, StatusReportRowDto, UpdateDepartmentReq, UpdatePersonReq,
};
use crate::api::rest::error::{map_domain_error, RequestCtx};
use crate::api::rest::export;
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::contract::model::{NewPerson, PageRequest, PersonFilter};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

type Svc = Extension<Arc<Service>>;

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Blank means "no filter"; anything else must parse.
fn parse_param<T>(raw: Option<String>, name: &str, ctx: &RequestCtx) -> Result<Option<T>, ProblemResponse>
where
    T: FromStr,
    T::Err: Display,
{
    non_blank(raw)
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| ctx.bad_request(format!("Invalid value for '{name}': {e}")))
        })
        .transpose()
}

fn fail(what: &str, e: DomainError, ctx: &RequestCtx) -> ProblemResponse {
    error!("Failed to {}: {}", what, e);
    map_domain_error(&e, ctx)
}

// ---------------------------------------------------------------- people

/// List employees with search, filters and pagination
#[utoipa::path(get, path = "/employees", tag = "employees",
    params(ListPeopleQuery),
    responses(
        (status = 200, description = "One page of employees", body = PersonListDto),
        (status = 400, description = "Bad filter value", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn list_people(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiQuery(query): ApiQuery<ListPeopleQuery>,
) -> Result<Json<PersonListDto>, ProblemResponse> {
    info!("Listing employees with query: {:?}", query);

    let filter = PersonFilter {
        search: non_blank(query.search),
        department: non_blank(query.department),
        status: parse_param(query.status, "status", &ctx)?,
        gender: parse_param(query.gender, "gender", &ctx)?,
    };
    let page = PageRequest {
        page: non_blank(query.page).and_then(|p| p.parse().ok()),
        page_size: non_blank(query.page_size).and_then(|p| p.parse().ok()),
    };

    match svc.list_people(filter, page).await {
        Ok(page) => Ok(Json(page.into())),
        Err(e) => Err(fail("list employees", e, &ctx)),
    }
}

/// Create an employee; the employee ID is generated when omitted
#[utoipa::path(post, path = "/employees", tag = "employees",
    request_body = CreatePersonReq,
    responses(
        (status = 201, description = "Created", body = PersonDto),
        (status = 409, description = "Duplicate email or employee ID", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn create_person(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiJson(req): ApiJson<CreatePersonReq>,
) -> Result<(StatusCode, Json<PersonDto>), ProblemResponse> {
    info!("Creating employee with email: {}", req.email);

    let result = match NewPerson::try_from(req) {
        Ok(new_person) => svc.create_person(new_person).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(person) => Ok((StatusCode::CREATED, Json(person.into()))),
        Err(e) => Err(fail("create employee", e, &ctx)),
    }
}

/// Employee detail with notes and derived fields
#[utoipa::path(get, path = "/employees/{id}", tag = "employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee found", body = PersonDetailDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn get_person(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<PersonDetailDto>, ProblemResponse> {
    info!("Getting employee with id: {}", id);

    match svc.get_person_detail(id).await {
        Ok(detail) => Ok(Json(detail.into())),
        Err(e) => Err(fail("get employee", e, &ctx)),
    }
}

/// Partially update an employee
#[utoipa::path(put, path = "/employees/{id}", tag = "employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    request_body = UpdatePersonReq,
    responses(
        (status = 200, description = "Updated", body = PersonDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Duplicate email or employee ID", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn update_person(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdatePersonReq>,
) -> Result<Json<PersonDto>, ProblemResponse> {
    info!("Updating employee {}", id);

    match svc.update_person(id, req.into()).await {
        Ok(person) => Ok(Json(person.into())),
        Err(e) => Err(fail("update employee", e, &ctx)),
    }
}

/// Delete an employee, their notes and any manager references to them
#[utoipa::path(delete, path = "/employees/{id}", tag = "employees",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn delete_person(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting employee: {}", id);

    match svc.delete_person(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(fail("delete employee", e, &ctx)),
    }
}

#[utoipa::path(post, path = "/employees/bulk-delete", tag = "employees",
    request_body = BulkDeleteReq,
    responses(
        (status = 200, description = "Deleted count and names", body = BulkDeleteDto),
        (status = 422, description = "No ids given", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn bulk_delete(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiJson(req): ApiJson<BulkDeleteReq>,
) -> Result<Json<BulkDeleteDto>, ProblemResponse> {
    info!("Bulk deleting {} employees", req.ids.len());

    match svc.bulk_delete(req.ids).await {
        Ok(outcome) => Ok(Json(outcome.into())),
        Err(e) => Err(fail("bulk delete employees", e, &ctx)),
    }
}

/// Quick search by name, email or employee ID
#[utoipa::path(get, path = "/employees/search", tag = "employees",
    params(SearchQuery),
    responses((status = 200, description = "Matches", body = [SearchHitDto])))]
pub async fn search_people(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<SearchHitDto>>, ProblemResponse> {
    let q = query.q.unwrap_or_default();
    match svc.search_people(&q).await {
        Ok(people) => Ok(Json(people.into_iter().map(Into::into).collect())),
        Err(e) => Err(fail("search employees", e, &ctx)),
    }
}

#[utoipa::path(get, path = "/employees/export", tag = "employees",
    responses((status = 200, description = "CSV file", content_type = "text/csv", body = String)))]
pub async fn export_people(Extension(svc): Svc, ctx: RequestCtx) -> Result<Response, ProblemResponse> {
    info!("Exporting employees as CSV");

    let people = svc
        .export_people()
        .await
        .map_err(|e| fail("export employees", e, &ctx))?;
    let body = export::people_to_csv(&people)
        .map_err(|e| fail("render CSV", DomainError::database(format!("{e:#}")), &ctx))?;
    Ok(export::csv_response(body))
}

#[utoipa::path(get, path = "/employees/check-email", tag = "employees",
    params(CheckEmailQuery),
    responses((status = 200, description = "Whether the email is taken", body = ExistsDto)))]
pub async fn check_email(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiQuery(query): ApiQuery<CheckEmailQuery>,
) -> Result<Json<ExistsDto>, ProblemResponse> {
    let exclude = parse_param::<Uuid>(query.exclude_id, "exclude_id", &ctx)?;
    let email = query.email.unwrap_or_default();
    match svc.email_taken(&email, exclude).await {
        Ok(exists) => Ok(Json(ExistsDto { exists })),
        Err(e) => Err(fail("check email", e, &ctx)),
    }
}

#[utoipa::path(get, path = "/employees/check-employee-id", tag = "employees",
    params(CheckEmployeeIdQuery),
    responses((status = 200, description = "Whether the employee ID is taken", body = ExistsDto)))]
pub async fn check_employee_id(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiQuery(query): ApiQuery<CheckEmployeeIdQuery>,
) -> Result<Json<ExistsDto>, ProblemResponse> {
    let exclude = parse_param::<Uuid>(query.exclude_id, "exclude_id", &ctx)?;
    let employee_id = query.employee_id.unwrap_or_default();
    match svc.employee_id_taken(&employee_id, exclude).await {
        Ok(exists) => Ok(Json(ExistsDto { exists })),
        Err(e) => Err(fail("check employee ID", e, &ctx)),
    }
}

/// Preview of the employee ID a new record with these names would receive
#[utoipa::path(get, path = "/employees/generate-id", tag = "employees",
    params(GenerateIdQuery),
    responses((status = 200, description = "Generated ID, empty when a name is missing", body = GeneratedIdDto)))]
pub async fn generate_id(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiQuery(query): ApiQuery<GenerateIdQuery>,
) -> Result<Json<GeneratedIdDto>, ProblemResponse> {
    let given = query.firstname.unwrap_or_default();
    let family = query.lastname.unwrap_or_default();
    match svc.preview_identifier(&given, &family).await {
        Ok(employee_id) => Ok(Json(GeneratedIdDto { employee_id })),
        Err(e) => Err(fail("generate employee ID", e, &ctx)),
    }
}

// ----------------------------------------------------------------- notes

#[utoipa::path(get, path = "/employees/{id}/notes", tag = "notes",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Notes, newest first", body = [NoteDto]),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn list_notes(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<NoteDto>>, ProblemResponse> {
    match svc.list_notes(id).await {
        Ok(notes) => Ok(Json(notes.into_iter().map(Into::into).collect())),
        Err(e) => Err(fail("list notes", e, &ctx)),
    }
}

#[utoipa::path(post, path = "/employees/{id}/notes", tag = "notes",
    params(("id" = Uuid, Path, description = "Employee id")),
    request_body = CreateNoteReq,
    responses(
        (status = 201, description = "Created", body = NoteDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn add_note(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CreateNoteReq>,
) -> Result<(StatusCode, Json<NoteDto>), ProblemResponse> {
    info!("Adding note to employee {}", id);

    match svc.add_note(id, req.into()).await {
        Ok(note) => Ok((StatusCode::CREATED, Json(note.into()))),
        Err(e) => Err(fail("add note", e, &ctx)),
    }
}

#[utoipa::path(delete, path = "/employees/{id}/notes/{note_id}", tag = "notes",
    params(
        ("id" = Uuid, Path, description = "Employee id"),
        ("note_id" = Uuid, Path, description = "Note id"),
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn delete_note(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath((id, note_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting note {} of employee {}", note_id, id);

    match svc.delete_note(id, note_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(fail("delete note", e, &ctx)),
    }
}

// ----------------------------------------------------------- departments

#[utoipa::path(get, path = "/departments", tag = "departments",
    responses((status = 200, description = "Departments with headcount", body = [DepartmentSummaryDto])))]
pub async fn list_departments(
    Extension(svc): Svc,
    ctx: RequestCtx,
) -> Result<Json<Vec<DepartmentSummaryDto>>, ProblemResponse> {
    match svc.list_departments().await {
        Ok(list) => Ok(Json(list.into_iter().map(Into::into).collect())),
        Err(e) => Err(fail("list departments", e, &ctx)),
    }
}

#[utoipa::path(post, path = "/departments", tag = "departments",
    request_body = CreateDepartmentReq,
    responses(
        (status = 201, description = "Created", body = DepartmentDto),
        (status = 409, description = "Name taken", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn create_department(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiJson(req): ApiJson<CreateDepartmentReq>,
) -> Result<(StatusCode, Json<DepartmentDto>), ProblemResponse> {
    info!("Creating department: {}", req.name);

    match svc.create_department(req.into()).await {
        Ok(department) => Ok((StatusCode::CREATED, Json(department.into()))),
        Err(e) => Err(fail("create department", e, &ctx)),
    }
}

#[utoipa::path(get, path = "/departments/{id}", tag = "departments",
    params(("id" = Uuid, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department with members", body = DepartmentDetailDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn get_department(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DepartmentDetailDto>, ProblemResponse> {
    match svc.get_department_detail(id).await {
        Ok(detail) => Ok(Json(detail.into())),
        Err(e) => Err(fail("get department", e, &ctx)),
    }
}

#[utoipa::path(put, path = "/departments/{id}", tag = "departments",
    params(("id" = Uuid, Path, description = "Department id")),
    request_body = UpdateDepartmentReq,
    responses(
        (status = 200, description = "Updated", body = DepartmentDto),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Name taken", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn update_department(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateDepartmentReq>,
) -> Result<Json<DepartmentDto>, ProblemResponse> {
    info!("Updating department {}", id);

    match svc.update_department(id, req.into()).await {
        Ok(department) => Ok(Json(department.into())),
        Err(e) => Err(fail("update department", e, &ctx)),
    }
}

#[utoipa::path(delete, path = "/departments/{id}", tag = "departments",
    params(("id" = Uuid, Path, description = "Department id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    ))]
pub async fn delete_department(
    Extension(svc): Svc,
    ctx: RequestCtx,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting department: {}", id);

    match svc.delete_department(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(fail("delete department", e, &ctx)),
    }
}

// --------------------------------------------------------------- reports

#[utoipa::path(get, path = "/reports/dashboard", tag = "reports",
    responses((status = 200, description = "Dashboard summary", body = DashboardDto)))]
pub async fn dashboard(Extension(svc): Svc, ctx: RequestCtx) -> Result<Json<DashboardDto>, ProblemResponse> {
    match svc.dashboard().await {
        Ok(report) => Ok(Json(report.into())),
        Err(e) => Err(fail("build dashboard", e, &ctx)),
    }
}

#[utoipa::path(get, path = "/reports/departments", tag = "reports",
    responses((status = 200, description = "Headcount and average salary per department", body = [DepartmentReportRowDto])))]
pub async fn department_report(
    Extension(svc): Svc,
    ctx: RequestCtx,
) -> Result<Json<Vec<DepartmentReportRowDto>>, ProblemResponse> {
    match svc.department_report().await {
        Ok(rows) => Ok(Json(rows.into_iter().map(Into::into).collect())),
        Err(e) => Err(fail("build department report", e, &ctx)),
    }
}

#[utoipa::path(get, path = "/reports/status", tag = "reports",
    responses((status = 200, description = "Headcount and average salary per status", body = [StatusReportRowDto])))]
pub async fn status_report(
    Extension(svc): Svc,
    ctx: RequestCtx,
) -> Result<Json<Vec<StatusReportRowDto>>, ProblemResponse> {
    match svc.status_report().await {
        Ok(rows) => Ok(Json(rows.into_iter().map(Into::into).collect())),
        Err(e) => Err(fail("build status report", e, &ctx)),
    }
}

#[utoipa::path(get, path = "/reports/salary", tag = "reports",
    responses((status = 200, description = "Salary statistics", body = SalaryReportDto)))]
pub async fn salary_report(
    Extension(svc): Svc,
    ctx: RequestCtx,
) -> Result<Json<SalaryReportDto>, ProblemResponse> {
    match svc.salary_report().await {
        Ok(report) => Ok(Json(report.into())),
        Err(e) => Err(fail("build salary report", e, &ctx)),
    }
}
