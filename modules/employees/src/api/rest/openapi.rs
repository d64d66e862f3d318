use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};

/// OpenAPI document of the employees REST surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staffdesk API",
        description = "Employee, department and report management"
    ),
    paths(
        handlers::list_people,
        handlers::create_person,
        handlers::get_person,
        handlers::update_person,
        handlers::delete_person,
        handlers::bulk_delete,
        handlers::search_people,
        handlers::export_people,
        handlers::check_email,
        handlers::check_employee_id,
        handlers::generate_id,
        handlers::list_notes,
        handlers::add_note,
        handlers::delete_note,
        handlers::list_departments,
        handlers::create_department,
        handlers::get_department,
        handlers::update_department,
        handlers::delete_department,
        handlers::dashboard,
        handlers::department_report,
        handlers::status_report,
        handlers::salary_report,
    ),
    components(schemas(
        http_problem::Problem,
        http_problem::ValidationError,
        dto::GenderDto,
        dto::StatusDto,
        dto::PersonDto,
        dto::PersonDetailDto,
        dto::PersonListDto,
        dto::CreatePersonReq,
        dto::UpdatePersonReq,
        dto::SearchHitDto,
        dto::ExistsDto,
        dto::GeneratedIdDto,
        dto::BulkDeleteReq,
        dto::BulkDeleteDto,
        dto::NoteDto,
        dto::CreateNoteReq,
        dto::DepartmentDto,
        dto::DepartmentSummaryDto,
        dto::DepartmentDetailDto,
        dto::CreateDepartmentReq,
        dto::UpdateDepartmentReq,
        dto::DashboardDto,
        dto::DepartmentReportRowDto,
        dto::StatusReportRowDto,
        dto::SalaryReportDto,
    )),
    tags(
        (name = "employees", description = "Employee records"),
        (name = "notes", description = "Notes attached to employees"),
        (name = "departments", description = "Departments"),
        (name = "reports", description = "Aggregated reports"),
    )
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
