use std::sync::Arc;

mod availability;
mod booking;
mod session;

use axum::{body::Body, middleware, response::Response, Router};
use http::StatusCode;
use serde::Serialize;
use service::ServiceError;
use thiserror::Error;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

pub use session::{context_extractor, Context, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Service error")]
    ServiceError(#[from] ServiceError),

    #[error("Inconsistent id. Got {0} in path but {1} in body")]
    InconsistentId(Uuid, Uuid),

    #[error("Could not serialize response: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Could not build response: {0}")]
    HttpError(#[from] http::Error),
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response, RestError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::new(serde_json::to_string(value)?))?)
}

fn empty_response(status: StatusCode) -> Result<Response, RestError> {
    Ok(Response::builder().status(status).body(Body::empty())?)
}

fn text_response(status: StatusCode, text: String) -> Response {
    let mut response = Response::new(Body::new(text));
    *response.status_mut() = status;
    response
}

fn error_handler(result: Result<Response, RestError>) -> Response {
    match result {
        Ok(response) => response,
        Err(err @ RestError::InconsistentId(_, _)) => {
            text_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(err @ (RestError::SerializationError(_) | RestError::HttpError(_))) => {
            error!("Failed to build response: {err}");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        Err(RestError::ServiceError(err)) => service_error_response(err),
    }
}

fn service_error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Forbidden => StatusCode::FORBIDDEN,
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::EntityNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::EntityAlreadyExists(_)
        | ServiceError::EntityConflicts(_, _, _)
        | ServiceError::SlotUnavailable { .. }
        | ServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
        ServiceError::ValidationError(_)
        | ServiceError::IdSetOnCreate
        | ServiceError::VersionSetOnCreate
        | ServiceError::TimeOrderWrong(_, _)
        | ServiceError::DateOrderWrong(_, _) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::DatabaseQueryError(_) | ServiceError::InternalError => {
            error!("Request failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    match err {
        ServiceError::Forbidden | ServiceError::Unauthorized => text_response(status, String::new()),
        ServiceError::EntityNotFound(id) | ServiceError::EntityAlreadyExists(id) => {
            text_response(status, id.to_string())
        }
        err => text_response(status, err.to_string()),
    }
}

pub trait RestStateDef: Clone + Send + Sync + 'static {
    type AvailabilityService: service::availability::AvailabilityService<Context = Context>
        + Send
        + Sync
        + 'static;
    type AvailabilityBulkService: service::availability_bulk::AvailabilityBulkService<Context = Context>
        + Send
        + Sync
        + 'static;
    type SlotResolutionService: service::slot_resolution::SlotResolutionService<Context = Context>
        + Send
        + Sync
        + 'static;
    type BookingService: service::booking::BookingService<Context = Context>
        + Send
        + Sync
        + 'static;

    fn availability_service(&self) -> Arc<Self::AvailabilityService>;
    fn availability_bulk_service(&self) -> Arc<Self::AvailabilityBulkService>;
    fn slot_resolution_service(&self) -> Arc<Self::SlotResolutionService>;
    fn booking_service(&self) -> Arc<Self::BookingService>;
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fitbook Scheduler API",
        description = "Trainer availability and session booking",
    ),
    nest(
        (path = "/availability", api = availability::AvailabilityApiDoc),
        (path = "/booking", api = booking::BookingApiDoc),
    )
)]
pub struct ApiDoc;

/// All routes behind the actor middleware plus the API documentation.
pub fn build_router<RestState: RestStateDef>(rest_state: RestState) -> Router {
    let api = Router::new()
        .nest("/availability", availability::generate_route())
        .nest("/booking", booking::generate_route())
        .layer(middleware::from_fn(context_extractor))
        .with_state(rest_state);
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
}

pub async fn start_server<RestState: RestStateDef>(
    rest_state: RestState,
    address: &str,
) -> Result<(), std::io::Error> {
    let app = build_router(rest_state);
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}
