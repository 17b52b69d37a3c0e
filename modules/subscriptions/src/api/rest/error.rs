use api_ingress::problem::{Problem, ProblemResponse, ValidationViolation};
use axum::http::StatusCode;

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);

    // Add trace ID from current tracing span if available
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_trace_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::SubscriptionNotFound { id } => not_found(*id, instance),
        DomainError::Validation { field, message } => {
            let ProblemResponse(problem) = from_parts(
                StatusCode::BAD_REQUEST,
                "SUBSCRIPTIONS_VALIDATION",
                "Validation error",
                format!("{}", e),
                instance,
            );
            ProblemResponse(problem.with_errors(vec![ValidationViolation {
                detail: message.clone(),
                pointer: format!("/{field}"),
            }]))
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    }
}

pub fn not_found(id: uuid::Uuid, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::NOT_FOUND,
        "SUBSCRIPTIONS_NOT_FOUND",
        "Subscription not found",
        format!("Subscription with id {} was not found", id),
        instance,
    )
}

/// Malformed request body or path parameter.
pub fn bad_request(detail: impl Into<String>, instance: &str) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "SUBSCRIPTIONS_BAD_REQUEST",
        "Bad request",
        detail,
        instance,
    )
}
