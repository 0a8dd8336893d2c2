use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use http::StatusCode;
use rest_types::{
    AvailabilitySlotTO, BulkAvailabilityRequestTO, BulkResultTO, CopyWeekTO, DateAvailabilityTO,
    DayAvailabilityTO, SetAvailabilitySlotTO, TimeWindowTO,
};
use serde::Deserialize;
use service::availability::AvailabilityService;
use service::availability_bulk::AvailabilityBulkService;
use service::slot_resolution::SlotResolutionService;
use time::Date;
use tracing::instrument;
use utoipa::{IntoParams, OpenApi};
use uuid::Uuid;

use crate::{empty_response, error_handler, json_response, Context, RestError, RestStateDef};

pub fn generate_route<RestState: RestStateDef>() -> Router<RestState> {
    Router::new()
        .route(
            "/trainer/{trainer_id}",
            put(set_availability_slot::<RestState>),
        )
        .route(
            "/trainer/{trainer_id}",
            get(get_trainer_availability::<RestState>),
        )
        .route(
            "/trainer/{trainer_id}/range",
            get(get_trainer_slots_for_range::<RestState>),
        )
        .route(
            "/trainer/{trainer_id}/free/{date}",
            get(get_available_slots::<RestState>),
        )
        .route(
            "/trainer/{trainer_id}/bulk",
            post(bulk_create::<RestState>),
        )
        .route(
            "/trainer/{trainer_id}/copy-week",
            post(copy_week::<RestState>),
        )
        .route("/slot/{id}", delete(remove_availability_slot::<RestState>))
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQueryParams {
    #[param(value_type = String, example = "2024-06-03")]
    pub start_date: Date,
    #[param(value_type = String, example = "2024-06-09")]
    pub end_date: Date,
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    put,
    path = "/trainer/{trainer_id}",
    tags = ["Availability"],
    params(("trainer_id", description = "Trainer id")),
    request_body = SetAvailabilitySlotTO,
    responses(
        (status = 200, description = "Slot stored", body = AvailabilitySlotTO),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Date-specific slot already exists"),
        (status = 422, description = "Invalid slot"),
    ),
)]
pub async fn set_availability_slot<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(trainer_id): Path<Uuid>,
    Json(slot): Json<SetAvailabilitySlotTO>,
) -> Response {
    error_handler(
        (async {
            let slot = rest_state
                .availability_service()
                .set_availability_slot(
                    trainer_id,
                    slot.day_of_week.into(),
                    slot.start_time,
                    slot.end_time,
                    slot.specific_date,
                    context.into(),
                    None,
                )
                .await?;
            json_response(StatusCode::OK, &AvailabilitySlotTO::from(&slot))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    delete,
    path = "/slot/{id}",
    tags = ["Availability"],
    params(("id", description = "Availability slot id")),
    responses(
        (status = 204, description = "Slot removed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Slot not found"),
    ),
)]
pub async fn remove_availability_slot<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            rest_state
                .availability_service()
                .remove_availability_slot(id, context.into(), None)
                .await?;
            empty_response(StatusCode::NO_CONTENT)
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get,
    path = "/trainer/{trainer_id}",
    tags = ["Availability"],
    params(("trainer_id", description = "Trainer id")),
    responses(
        (status = 200, description = "Weekly template grouped by weekday", body = [DayAvailabilityTO]),
    ),
)]
pub async fn get_trainer_availability<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(trainer_id): Path<Uuid>,
) -> Response {
    error_handler(
        (async {
            let template: Arc<[DayAvailabilityTO]> = rest_state
                .availability_service()
                .get_trainer_availability(trainer_id, context.into(), None)
                .await?
                .iter()
                .map(|(day_of_week, slots)| DayAvailabilityTO {
                    day_of_week: (*day_of_week).into(),
                    slots: slots.iter().map(AvailabilitySlotTO::from).collect(),
                })
                .collect();
            json_response(StatusCode::OK, &template)
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get,
    path = "/trainer/{trainer_id}/range",
    tags = ["Availability"],
    params(("trainer_id", description = "Trainer id"), DateRangeQueryParams),
    responses(
        (status = 200, description = "Declared slots for every date in the range", body = [DateAvailabilityTO]),
        (status = 422, description = "Invalid range"),
    ),
)]
pub async fn get_trainer_slots_for_range<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(trainer_id): Path<Uuid>,
    Query(range): Query<DateRangeQueryParams>,
) -> Response {
    error_handler(
        (async {
            let slots: Arc<[DateAvailabilityTO]> = rest_state
                .availability_service()
                .get_trainer_slots_for_range(
                    trainer_id,
                    range.start_date,
                    range.end_date,
                    context.into(),
                    None,
                )
                .await?
                .iter()
                .map(|(date, slots)| DateAvailabilityTO {
                    date: *date,
                    slots: slots.iter().map(AvailabilitySlotTO::from).collect(),
                })
                .collect();
            json_response(StatusCode::OK, &slots)
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    get,
    path = "/trainer/{trainer_id}/free/{date}",
    tags = ["Availability"],
    params(
        ("trainer_id", description = "Trainer id"),
        ("date", description = "Date", example = "2024-06-03"),
    ),
    responses(
        (status = 200, description = "Bookable windows ordered by start time", body = [TimeWindowTO]),
    ),
)]
pub async fn get_available_slots<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path((trainer_id, date)): Path<(Uuid, Date)>,
) -> Response {
    error_handler(
        (async {
            let windows: Arc<[TimeWindowTO]> = rest_state
                .slot_resolution_service()
                .get_available_slots(trainer_id, date, context.into(), None)
                .await?
                .iter()
                .map(TimeWindowTO::from)
                .collect();
            json_response(StatusCode::OK, &windows)
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post,
    path = "/trainer/{trainer_id}/bulk",
    tags = ["Availability"],
    params(("trainer_id", description = "Trainer id")),
    request_body = BulkAvailabilityRequestTO,
    responses(
        (status = 200, description = "Creation counts", body = BulkResultTO),
        (status = 400, description = "Trainer id in body differs from path"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Invalid request"),
    ),
)]
pub async fn bulk_create<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(trainer_id): Path<Uuid>,
    Json(mut request): Json<BulkAvailabilityRequestTO>,
) -> Response {
    error_handler(
        (async {
            if request.trainer_id.is_nil() {
                request.trainer_id = trainer_id;
            } else if request.trainer_id != trainer_id {
                return Err(RestError::InconsistentId(trainer_id, request.trainer_id));
            }
            let result = rest_state
                .availability_bulk_service()
                .bulk_create(&(&request).into(), context.into())
                .await?;
            json_response(StatusCode::OK, &BulkResultTO::from(&result))
        })
        .await,
    )
}

#[instrument(skip(rest_state))]
#[utoipa::path(
    post,
    path = "/trainer/{trainer_id}/copy-week",
    tags = ["Availability"],
    params(("trainer_id", description = "Trainer id")),
    request_body = CopyWeekTO,
    responses(
        (status = 200, description = "Copy counts", body = BulkResultTO),
        (status = 403, description = "Forbidden"),
    ),
)]
pub async fn copy_week<RestState: RestStateDef>(
    rest_state: State<RestState>,
    Extension(context): Extension<Context>,
    Path(trainer_id): Path<Uuid>,
    Json(copy): Json<CopyWeekTO>,
) -> Response {
    error_handler(
        (async {
            let result = rest_state
                .availability_bulk_service()
                .copy_week(
                    trainer_id,
                    copy.source_week_start,
                    copy.target_week_start,
                    context.into(),
                )
                .await?;
            json_response(StatusCode::OK, &BulkResultTO::from(&result))
        })
        .await,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        set_availability_slot,
        remove_availability_slot,
        get_trainer_availability,
        get_trainer_slots_for_range,
        get_available_slots,
        bulk_create,
        copy_week,
    ),
    components(schemas(
        AvailabilitySlotTO,
        SetAvailabilitySlotTO,
        DayAvailabilityTO,
        DateAvailabilityTO,
        TimeWindowTO,
        BulkAvailabilityRequestTO,
        BulkResultTO,
        CopyWeekTO,
    ))
)]
pub struct AvailabilityApiDoc;
