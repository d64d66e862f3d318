#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::NaiveDate;
use db::{ConnectOpts, DbHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;

use employees::{
    contract::model::{Gender, NewPerson},
    domain::service::{Service, ServiceConfig},
    infra::storage::{migrations::Migrator, SeaOrmRepository},
    Employees, EmployeesConfig,
};

/// Create a fresh test database for each test (in-memory SQLite) and run migrations.
pub async fn create_test_db() -> DatabaseConnection {
    // DbHandle pins in-memory SQLite to a single pooled connection.
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database")
        .sea();
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_test_service_with(config: ServiceConfig) -> Arc<Service> {
    let repo = Arc::new(SeaOrmRepository::new(create_test_db().await));
    Arc::new(Service::new(repo.clone(), repo.clone(), repo, config))
}

pub async fn create_test_service() -> Arc<Service> {
    create_test_service_with(ServiceConfig::default()).await
}

/// Module routes behind the real ingress middleware, so problems carry request ids.
pub async fn create_test_router() -> Router {
    let module = Employees::init(EmployeesConfig::default(), create_test_db().await);
    let routes = module.register_rest(Router::new());
    api_ingress::ApiIngress::new(api_ingress::ApiIngressConfig::default())
        .build_router(routes, Employees::openapi())
}

pub fn new_person(given: &str, family: &str, email: &str) -> NewPerson {
    NewPerson {
        given_name: given.to_string(),
        family_name: family.to_string(),
        other_name: None,
        email: email.to_string(),
        phone: None,
        employee_id: None,
        department: "Engineering".to_string(),
        role: "Engineer".to_string(),
        join_date: NaiveDate::from_ymd_opt(2020, 1, 15),
        salary: None,
        date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 20).expect("valid date"),
        gender: Gender::Female,
        state: "Lagos".to_string(),
        lga: "Ikeja".to_string(),
        ward: "Ward 1".to_string(),
        status: None,
    }
}

pub fn person_json(given: &str, family: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "given_name": given,
        "family_name": family,
        "email": email,
        "department": "Engineering",
        "role": "Engineer",
        "date_of_birth": "1990-05-20",
        "gender": "Female",
        "state": "Lagos",
        "lga": "Ikeja",
        "ward": "Ward 1"
    })
}

pub async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
    router.clone().oneshot(req).await.expect("router call failed")
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("json body")
}
