use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{openapi, routes};
use crate::config::EmployeesConfig;
use crate::contract::client::EmployeesApi;
use crate::domain::service::Service;
use crate::gateways::local::EmployeesLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::SeaOrmRepository;

/// Employees module: wires storage to the domain service and exposes it over
/// REST and as an in-process client.
#[derive(Clone)]
pub struct Employees {
    service: Arc<Service>,
}

impl Employees {
    pub const NAME: &'static str = "employees";

    /// Builds the module on an open connection. Run [`Employees::migrate`] first.
    pub fn init(cfg: EmployeesConfig, conn: DatabaseConnection) -> Self {
        info!("Initializing employees module");
        debug!(
            "Loaded employees config: default_page_size={}, max_page_size={}, prefix={}",
            cfg.default_page_size, cfg.max_page_size, cfg.identifier_prefix
        );

        // One repository value serves all three ports.
        let repo = Arc::new(SeaOrmRepository::new(conn));
        let service = Service::new(repo.clone(), repo.clone(), repo, cfg.into());
        Self {
            service: Arc::new(service),
        }
    }

    pub async fn migrate(conn: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running employees database migrations");
        Migrator::up(conn, None).await?;
        info!("Employees database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn EmployeesApi> {
        Arc::new(EmployeesLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: Router) -> Router {
        info!("Registering employees REST routes");
        routes::register_routes(router, self.service.clone())
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        openapi::openapi()
    }
}
