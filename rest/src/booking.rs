use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{get, post, put},
    Extension, Json, Router,
};
use http::StatusCode;
use rest_types::{
    BookingStatusTO, BookingTO, CancelBookingTO, CompleteBookingTO, SessionTypeTO,
    TrainerEarningsTO, UpdateStatusTO,
};
use serde::Deserialize;
use service::booking::BookingService;
use time::Date;
use tracing::instrument;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use crate::{error_handler, json_response, Context, RestStateDef};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .route("/", post(create_booking::<RestState>))
        .route("/{id}", get(get_booking::<RestState>))
        .route("/{id}/status", put(update_status::<RestState>))
        .route("/{id}/confirm", post(confirm_booking::<RestState>))
        .route("/{id}/cancel", post(cancel_booking::<RestState>))
        .route("/{id}/complete", post(complete_booking::<RestState>))
        .route(
            "/trainer/{trainer_id}",
            get(get_bookings_for_trainer::<RestState>),
        )
        .route(
            "/trainer/{trainer_id}/earnings",
            get(get_trainer_earnings::<RestState>),
        )
        .route(
            "/client/{client_id}",
            get(get_bookings_for_client::<RestState>),
        )
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EarningsQueryParams {
    #[param(value_type = String, example = "2024-06-01")]
    pub from: Date,
    #[param(value_type = String, example = "2024-06-30")]
    pub to: Date,
}

fn booking_response(status: StatusCode, booking: &service::booking::Booking) -> Response {
    error_handler(json_response(status, &BookingTO::from(booking)))
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post,
    path = "",
    tags = ["Booking"],
    request_body = BookingTO,
    responses(
        (status = 201, description = "Booking created as pending", body = BookingTO),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Slot no longer available, please pick another time"),
        (status = 422, description = "Invalid booking"),
    ),
)]
pub async fn create_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Json(booking): Json<BookingTO>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .create(&(&booking).into(), context.into(), None)
                .await?;
            Ok(booking_response(StatusCode::CREATED, &booking))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Booking"],
    params(("id", description = "Booking id")),
    responses(
        (status = 200, description = "Booking found", body = BookingTO),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Booking not found"),
    ),
)]
pub async fn get_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .get(id, context.into(), None)
                .await?;
            Ok(booking_response(StatusCode::OK, &booking))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    put,
    path = "/{id}/status",
    tags = ["Booking"],
    params(("id", description = "Booking id")),
    request_body = UpdateStatusTO,
    responses(
        (status = 200, description = "Status changed", body = BookingTO),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Transition not allowed or concurrent update"),
        (status = 422, description = "Cancellation reason missing"),
    ),
)]
pub async fn update_status<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateStatusTO>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .update_status(id, update.status.into(), update.reason, context.into(), None)
                .await?;
            Ok(booking_response(StatusCode::OK, &booking))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post,
    path = "/{id}/confirm",
    tags = ["Booking"],
    params(("id", description = "Booking id")),
    responses(
        (status = 200, description = "Booking confirmed", body = BookingTO),
        (status = 403, description = "Only the trainer confirms"),
        (status = 409, description = "Booking is not pending"),
    ),
)]
pub async fn confirm_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .confirm(id, context.into(), None)
                .await?;
            Ok(booking_response(StatusCode::OK, &booking))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tags = ["Booking"],
    params(("id", description = "Booking id")),
    request_body = CancelBookingTO,
    responses(
        (status = 200, description = "Booking cancelled", body = BookingTO),
        (status = 409, description = "Booking already finished"),
        (status = 422, description = "Reason missing"),
    ),
)]
pub async fn cancel_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(cancel): Json<CancelBookingTO>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .cancel(id, cancel.reason, context.into(), None)
                .await?;
            Ok(booking_response(StatusCode::OK, &booking))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post,
    path = "/{id}/complete",
    tags = ["Booking"],
    params(("id", description = "Booking id")),
    request_body = CompleteBookingTO,
    responses(
        (status = 200, description = "Session completed", body = BookingTO),
        (status = 403, description = "Only the trainer completes"),
        (status = 409, description = "Booking is not confirmed"),
    ),
)]
pub async fn complete_booking<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
    Json(complete): Json<CompleteBookingTO>,
) -> Response {
    error_handler(
        (async {
            let booking = rest_state
                .booking_service()
                .complete(id, complete.trainer_notes, context.into(), None)
                .await?;
            Ok(booking_response(StatusCode::OK, &booking))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get,
    path = "/trainer/{trainer_id}",
    tags = ["Booking"],
    params(("trainer_id", description = "Trainer id")),
    responses(
        (status = 200, description = "Bookings ordered by date and start time", body = [BookingTO]),
        (status = 403, description = "Forbidden"),
    ),
)]
pub async fn get_bookings_for_trainer<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(trainer_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let bookings: Arc<[BookingTO]> = rest_state
                .booking_service()
                .get_for_trainer(trainer_id, context.into(), None)
                .await?
                .iter()
                .map(BookingTO::from)
                .collect();
            json_response(StatusCode::OK, &bookings)
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get,
    path = "/client/{client_id}",
    tags = ["Booking"],
    params(("client_id", description = "Client id")),
    responses(
        (status = 200, description = "Bookings ordered by date and start time", body = [BookingTO]),
        (status = 403, description = "Forbidden"),
    ),
)]
pub async fn get_bookings_for_client<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(client_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let bookings: Arc<[BookingTO]> = rest_state
                .booking_service()
                .get_for_client(client_id, context.into(), None)
                .await?
                .iter()
                .map(BookingTO::from)
                .collect();
            json_response(StatusCode::OK, &bookings)
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get,
    path = "/trainer/{trainer_id}/earnings",
    tags = ["Booking"],
    params(("trainer_id", description = "Trainer id"), EarningsQueryParams),
    responses(
        (status = 200, description = "Completed sessions and their total price", body = TrainerEarningsTO),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid range"),
    ),
)]
pub async fn get_trainer_earnings<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(trainer_id): Path<Uuid>,
    Query(range): Query<EarningsQueryParams>,
) -> Response {
    error_handler(
        (async {
            let earnings = rest_state
                .booking_service()
                .get_trainer_earnings(trainer_id, range.from, range.to, context.into(), None)
                .await?;
            json_response(StatusCode::OK, &TrainerEarningsTO::from(&earnings))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_booking,
        get_booking,
        update_status,
        confirm_booking,
        cancel_booking,
        complete_booking,
        get_bookings_for_trainer,
        get_bookings_for_client,
        get_trainer_earnings,
    ),
    components(schemas(
        BookingTO,
        BookingStatusTO,
        SessionTypeTO,
        UpdateStatusTO,
        CancelBookingTO,
        CompleteBookingTO,
        TrainerEarningsTO,
    ))
)]
pub struct BookingApiDoc;
