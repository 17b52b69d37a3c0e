use std::sync::Arc;

use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::{openapi, routes};
use crate::config::SubscriptionsConfig;
use crate::contract::client::SubscriptionsApi;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::SubscriptionsLocalClient;
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmSubscriptionsRepository;

/// Wires storage, domain service, in-process client and REST surface.
#[derive(Clone)]
pub struct Subscriptions {
    service: Arc<Service>,
}

impl Subscriptions {
    pub fn init(db: DatabaseConnection, cfg: &SubscriptionsConfig) -> Self {
        info!("Initializing subscriptions module");
        debug!(
            "Loaded subscriptions config: max_service_name_length={}",
            cfg.max_service_name_length
        );

        // Wire repository (infra) to domain service (port)
        let repo = SeaOrmSubscriptionsRepository::new(db);
        let service = Service::new(Arc::new(repo), ServiceConfig::from(cfg));

        Self {
            service: Arc::new(service),
        }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running subscriptions database migrations");
        Migrator::up(db, None).await?;
        info!("Subscriptions database migrations completed successfully");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Local in-process client implementation
    pub fn client(&self) -> Arc<dyn SubscriptionsApi> {
        Arc::new(SubscriptionsLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering subscriptions REST routes");
        routes::register_routes(router, self.service.clone())
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        openapi::openapi()
    }
}
