use api_ingress::problem::{Problem, ValidationViolation};
use utoipa::OpenApi;

use crate::api::rest::dto::{CreateSubscriptionReq, SubscriptionDto, SumDto, UpdateSubscriptionReq};
use crate::api::rest::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "Subscriptions API", description = "Subscription records with month-precision periods"),
    paths(
        handlers::create_subscription,
        handlers::list_subscriptions,
        handlers::sum_prices,
        handlers::get_subscription,
        handlers::update_subscription,
        handlers::delete_subscription,
    ),
    components(schemas(
        SubscriptionDto,
        CreateSubscriptionReq,
        UpdateSubscriptionReq,
        SumDto,
        Problem,
        ValidationViolation,
    )),
    tags((name = "subscriptions", description = "Subscription lifecycle, listing and price totals"))
)]
pub struct SubscriptionsApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    SubscriptionsApiDoc::openapi()
}
