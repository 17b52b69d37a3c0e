use std::sync::Arc;

use api_ingress::problem::{Problem, ProblemResponse};
use axum::{
    extract::{rejection::JsonRejection, Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    CreateSubscriptionReq, SubscriptionDto, SubscriptionFilterQuery, SumDto,
    UpdateSubscriptionReq,
};
use crate::api::rest::error::{bad_request, map_domain_error, not_found};
use crate::contract::model::SubscriptionFilter;
use crate::domain::service::Service;

fn parse_id(raw: &str, instance: &str) -> Result<Uuid, ProblemResponse> {
    Uuid::parse_str(raw)
        .map_err(|_| bad_request(format!("'{}' is not a valid subscription id", raw), instance))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>, instance: &str) -> Result<T, ProblemResponse> {
    payload
        .map(|Json(v)| v)
        .map_err(|rej| bad_request(rej.body_text(), instance))
}

/// Create a new subscription
#[utoipa::path(
    post,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    operation_id = "subscriptions.create_subscription",
    request_body = CreateSubscriptionReq,
    responses(
        (status = 201, description = "Created subscription", body = SubscriptionDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn create_subscription(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreateSubscriptionReq>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscriptionDto>), ProblemResponse> {
    let req = json_body(payload, uri.path())?;
    info!("Creating subscription: {:?}", req);

    match svc.create_subscription(req.into()).await {
        Ok(sub) => Ok((StatusCode::CREATED, Json(SubscriptionDto::from(sub)))),
        Err(e) => {
            error!("Failed to create subscription: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific subscription by ID
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    operation_id = "subscriptions.get_subscription",
    params(("id" = Uuid, Path, description = "Subscription UUID")),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionDto),
        (status = 400, description = "Malformed id", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn get_subscription(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionDto>, ProblemResponse> {
    let id = parse_id(&id, uri.path())?;
    info!("Getting subscription with id: {}", id);

    match svc.get_subscription(id).await {
        Ok(Some(sub)) => Ok(Json(SubscriptionDto::from(sub))),
        Ok(None) => Err(not_found(id, uri.path())),
        Err(e) => {
            error!("Failed to get subscription {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Partially update a subscription; serves both PUT and PATCH
#[utoipa::path(
    patch,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    operation_id = "subscriptions.update_subscription",
    params(("id" = Uuid, Path, description = "Subscription UUID")),
    request_body = UpdateSubscriptionReq,
    responses(
        (status = 200, description = "Updated subscription", body = SubscriptionDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn update_subscription(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSubscriptionReq>, JsonRejection>,
) -> Result<Json<SubscriptionDto>, ProblemResponse> {
    let id = parse_id(&id, uri.path())?;
    let req = json_body(payload, uri.path())?;
    info!("Updating subscription {} with: {:?}", id, req);

    match svc.update_subscription(id, req.into()).await {
        Ok(sub) => Ok(Json(SubscriptionDto::from(sub))),
        Err(e) => {
            error!("Failed to update subscription {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a subscription by ID; absent ids also return 204
#[utoipa::path(
    delete,
    path = "/api/v1/subscriptions/{id}",
    tag = "subscriptions",
    operation_id = "subscriptions.delete_subscription",
    params(("id" = Uuid, Path, description = "Subscription UUID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn delete_subscription(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ProblemResponse> {
    let id = parse_id(&id, uri.path())?;
    info!("Deleting subscription: {}", id);

    match svc.delete_subscription(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete subscription {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List subscriptions matching the filter
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions",
    tag = "subscriptions",
    operation_id = "subscriptions.list_subscriptions",
    params(SubscriptionFilterQuery),
    responses(
        (status = 200, description = "Matching subscriptions", body = [SubscriptionDto]),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn list_subscriptions(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SubscriptionFilterQuery>,
) -> Result<Json<Vec<SubscriptionDto>>, ProblemResponse> {
    info!("Listing subscriptions with query: {:?}", query);
    let filter = SubscriptionFilter::from(&query);

    match svc.list_subscriptions(&filter).await {
        Ok(items) => Ok(Json(items.into_iter().map(SubscriptionDto::from).collect())),
        Err(e) => {
            error!("Failed to list subscriptions: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Total price of the subscriptions matching the filter
#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/sum",
    tag = "subscriptions",
    operation_id = "subscriptions.sum_prices",
    params(SubscriptionFilterQuery),
    responses(
        (status = 200, description = "Sum of matching prices, 0 when none match", body = SumDto),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json")
    )
)]
pub async fn sum_prices(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<SubscriptionFilterQuery>,
) -> Result<Json<SumDto>, ProblemResponse> {
    info!("Summing subscription prices with query: {:?}", query);
    let filter = SubscriptionFilter::from(&query);

    match svc.sum_prices(&filter).await {
        Ok(sum) => Ok(Json(SumDto { sum })),
        Err(e) => {
            error!("Failed to sum subscription prices: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
