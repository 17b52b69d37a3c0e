use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub const BASE_PATH: &str = "/api/v1/subscriptions";

/// REST routes for the module. PUT and PATCH share the partial-update handler.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let routes = Router::new()
        .route(
            BASE_PATH,
            post(handlers::create_subscription).get(handlers::list_subscriptions),
        )
        .route(&format!("{BASE_PATH}/sum"), get(handlers::sum_prices))
        .route(
            &format!("{BASE_PATH}/{{id}}"),
            get(handlers::get_subscription)
                .put(handlers::update_subscription)
                .patch(handlers::update_subscription)
                .delete(handlers::delete_subscription),
        )
        .layer(Extension(service));

    router.merge(routes)
}
