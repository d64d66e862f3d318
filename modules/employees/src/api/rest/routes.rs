use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mounts the employees REST surface on `router`. Static segments such as
/// `/employees/search` take precedence over `/employees/{id}`.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let routes = Router::new()
        .route(
            "/employees",
            get(handlers::list_people).post(handlers::create_person),
        )
        .route("/employees/bulk-delete", post(handlers::bulk_delete))
        .route("/employees/search", get(handlers::search_people))
        .route("/employees/export", get(handlers::export_people))
        .route("/employees/check-email", get(handlers::check_email))
        .route("/employees/check-employee-id", get(handlers::check_employee_id))
        .route("/employees/generate-id", get(handlers::generate_id))
        .route(
            "/employees/{id}",
            get(handlers::get_person)
                .put(handlers::update_person)
                .delete(handlers::delete_person),
        )
        .route(
            "/employees/{id}/notes",
            get(handlers::list_notes).post(handlers::add_note),
        )
        .route(
            "/employees/{id}/notes/{note_id}",
            axum::routing::delete(handlers::delete_note),
        )
        .route(
            "/departments",
            get(handlers::list_departments).post(handlers::create_department),
        )
        .route(
            "/departments/{id}",
            get(handlers::get_department)
                .put(handlers::update_department)
                .delete(handlers::delete_department),
        )
        .route("/reports/dashboard", get(handlers::dashboard))
        .route("/reports/departments", get(handlers::department_report))
        .route("/reports/status", get(handlers::status_report))
        .route("/reports/salary", get(handlers::salary_report))
        .layer(Extension(service));

    router.merge(routes)
}
