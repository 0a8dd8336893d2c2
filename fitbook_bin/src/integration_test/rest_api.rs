use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rest::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use rest_types::{
    BookingStatusTO, BookingTO, BulkResultTO, DayOfWeekTO, SetAvailabilitySlotTO, TimeWindowTO,
};
use serde_json::json;
use time::macros::time;
use tower::ServiceExt;
use uuid::Uuid;

use crate::integration_test::{client_id, other_client_id, trainer_id, TestSetup};

fn router(setup: &TestSetup) -> Router {
    rest::build_router(setup.rest_state.clone())
}

fn request(method: &str, uri: &str, actor: Option<(Uuid, &str)>, body: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder
            .header(ACTOR_ID_HEADER, id.to_string())
            .header(ACTOR_ROLE_HEADER, role);
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn monday_booking(client_id: Uuid) -> String {
    json!({
        "client_id": client_id,
        "trainer_id": trainer_id(),
        "booking_date": "2024-06-03",
        "start_time": "09:00",
        "end_time": "10:00",
        "duration_minutes": 60,
        "session_type": "virtual",
        "hourly_rate_cents": 6000,
        "total_price_cents": 6000,
        "client_notes": "First session"
    })
    .to_string()
}

async fn declare_monday_slot(setup: &TestSetup) {
    let slot = SetAvailabilitySlotTO {
        day_of_week: DayOfWeekTO::Monday,
        start_time: time!(09:00),
        end_time: time!(10:00),
        specific_date: None,
    };
    let response = router(setup)
        .oneshot(request(
            "PUT",
            &format!("/availability/trainer/{}", trainer_id()),
            Some((trainer_id(), "trainer")),
            Some(serde_json::to_string(&slot).unwrap()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_request_without_actor_is_unauthorized() {
    let setup = TestSetup::new().await;
    let response = router(&setup)
        .oneshot(request(
            "GET",
            &format!("/availability/trainer/{}", trainer_id()),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_openapi_document_is_served_without_actor() {
    let setup = TestSetup::new().await;
    let response = router(&setup)
        .oneshot(request("GET", "/api-docs/openapi.json", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let document: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(document["paths"]
        .as_object()
        .unwrap()
        .contains_key("/booking/{id}/confirm"));
}

#[tokio::test]
async fn test_booking_flow_over_http() {
    let setup = TestSetup::new().await;
    declare_monday_slot(&setup).await;

    let response = router(&setup)
        .oneshot(request(
            "GET",
            &format!("/availability/trainer/{}/free/2024-06-03", trainer_id()),
            Some((client_id(), "client")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let free: Vec<TimeWindowTO> = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        free,
        vec![TimeWindowTO {
            start_time: time!(09:00),
            end_time: time!(10:00)
        }]
    );

    let response = router(&setup)
        .oneshot(request(
            "POST",
            "/booking",
            Some((client_id(), "client")),
            Some(monday_booking(client_id())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking: BookingTO = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(booking.status, BookingStatusTO::Pending);
    assert_ne!(booking.id, Uuid::nil());

    let response = router(&setup)
        .oneshot(request(
            "POST",
            "/booking",
            Some((other_client_id(), "client")),
            Some(monday_booking(other_client_id())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_string(response)
        .await
        .contains("please pick another time"));

    let response = router(&setup)
        .oneshot(request(
            "POST",
            &format!("/booking/{}/confirm", booking.id),
            Some((client_id(), "client")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router(&setup)
        .oneshot(request(
            "POST",
            &format!("/booking/{}/confirm", booking.id),
            Some((trainer_id(), "trainer")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router(&setup)
        .oneshot(request(
            "POST",
            &format!("/booking/{}/cancel", booking.id),
            Some((client_id(), "client")),
            Some(json!({ "reason": "" }).to_string()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router(&setup)
        .oneshot(request(
            "PUT",
            &format!("/booking/{}/status", booking.id),
            Some((trainer_id(), "trainer")),
            Some(json!({ "status": "pending" }).to_string()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router(&setup)
        .oneshot(request(
            "GET",
            &format!("/booking/{}", Uuid::new_v4()),
            Some((client_id(), "client")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_create_over_http() {
    let setup = TestSetup::new().await;
    let body = json!({
        "start_date": "2024-06-03",
        "end_date": "2024-06-09",
        "weekdays": ["Monday", "Thursday"],
        "start_time": "08:00",
        "end_time": "10:00",
        "slot_duration_minutes": 30
    })
    .to_string();

    let response = router(&setup)
        .oneshot(request(
            "POST",
            &format!("/availability/trainer/{}/bulk", trainer_id()),
            Some((trainer_id(), "trainer")),
            Some(body.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result: BulkResultTO = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        result,
        BulkResultTO {
            success_count: 8,
            failure_count: 0
        }
    );

    let response = router(&setup)
        .oneshot(request(
            "POST",
            &format!("/availability/trainer/{}/bulk", Uuid::new_v4()),
            Some((trainer_id(), "trainer")),
            Some(body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
