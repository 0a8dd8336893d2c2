use std::sync::Arc;

use fitbook_utils::{DayOfWeek, TimeWindow};
use rest::RestStateDef;
use service::availability::AvailabilityService;
use service::availability_bulk::{AvailabilityBulkService, BulkAvailabilityRequest, BulkResult};
use service::booking::BookingService;
use service::slot_resolution::SlotResolutionService;
use service::ServiceError;
use time::macros::{date, time};

use crate::integration_test::{
    as_client, as_other_client, as_trainer, booking_request, client_id, declare_monday_morning,
    trainer_id, TestSetup, MONDAY,
};

#[tokio::test]
async fn test_recurring_slot_upsert_is_idempotent() {
    let setup = TestSetup::new().await;
    let service = setup.rest_state.availability_service();

    let first = service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Monday,
            time!(09:00),
            time!(10:00),
            None,
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    let second = service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Monday,
            time!(09:00),
            time!(10:00),
            None,
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(first, second);

    let extended = service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Monday,
            time!(09:00),
            time!(11:00),
            None,
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(extended.id, first.id);
    assert_eq!(extended.end_time, time!(11:00));
    assert_ne!(extended.version, first.version);

    let template = service
        .get_trainer_availability(trainer_id(), as_client(), None)
        .await
        .unwrap();
    assert_eq!(template.len(), 7);
    assert_eq!(template[&DayOfWeek::Monday].as_ref(), &[extended]);
    assert!(template[&DayOfWeek::Tuesday].is_empty());
}

#[tokio::test]
async fn test_only_the_trainer_declares_availability() {
    let setup = TestSetup::new().await;
    let result = setup
        .rest_state
        .availability_service()
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Monday,
            time!(09:00),
            time!(10:00),
            None,
            as_client(),
            None,
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden)));
}

#[tokio::test]
async fn test_specific_date_duplicate_is_rejected() {
    let setup = TestSetup::new().await;
    let service = setup.rest_state.availability_service();
    let slot = service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Wednesday,
            time!(14:00),
            time!(15:00),
            Some(date!(2024 - 06 - 05)),
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    assert!(!slot.is_recurring);

    let result = service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Wednesday,
            time!(14:00),
            time!(16:00),
            Some(date!(2024 - 06 - 05)),
            as_trainer(),
            None,
        )
        .await;
    assert!(matches!(result, Err(ServiceError::EntityAlreadyExists(id)) if id == slot.id));
}

#[tokio::test]
async fn test_range_merges_recurring_and_specific_slots() {
    let setup = TestSetup::new().await;
    let service = setup.rest_state.availability_service();
    declare_monday_morning(&setup).await;
    service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Monday,
            time!(09:00),
            time!(10:00),
            Some(MONDAY),
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Tuesday,
            time!(18:00),
            time!(19:00),
            Some(date!(2024 - 06 - 04)),
            as_trainer(),
            None,
        )
        .await
        .unwrap();

    let slots = service
        .get_trainer_slots_for_range(
            trainer_id(),
            MONDAY,
            date!(2024 - 06 - 10),
            as_client(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(slots.len(), 8);
    // The date-specific 09:00-10:00 duplicates the recurring one.
    assert_eq!(slots[&MONDAY].len(), 3);
    assert_eq!(slots[&date!(2024 - 06 - 04)].len(), 1);
    assert!(slots[&date!(2024 - 06 - 05)].is_empty());
    assert_eq!(slots[&date!(2024 - 06 - 10)].len(), 3);
}

#[tokio::test]
async fn test_monday_free_slots_exclude_booked_window() {
    let setup = TestSetup::new().await;
    declare_monday_morning(&setup).await;
    setup
        .rest_state
        .booking_service()
        .create(
            &booking_request(client_id(), time!(10:00), time!(11:00)),
            as_client(),
            None,
        )
        .await
        .unwrap();

    let free = setup
        .rest_state
        .slot_resolution_service()
        .get_available_slots(trainer_id(), MONDAY, as_other_client(), None)
        .await
        .unwrap();
    assert_eq!(
        free.as_ref(),
        &[
            TimeWindow::new(time!(09:00), time!(10:00)).unwrap(),
            TimeWindow::new(time!(11:00), time!(12:00)).unwrap(),
        ]
    );

    let next_monday = setup
        .rest_state
        .slot_resolution_service()
        .get_available_slots(trainer_id(), date!(2024 - 06 - 10), as_other_client(), None)
        .await
        .unwrap();
    assert_eq!(next_monday.len(), 3);
}

#[tokio::test]
async fn test_removed_slot_is_no_longer_offered() {
    let setup = TestSetup::new().await;
    let service = setup.rest_state.availability_service();
    let slot = service
        .set_availability_slot(
            trainer_id(),
            DayOfWeek::Monday,
            time!(09:00),
            time!(10:00),
            None,
            as_trainer(),
            None,
        )
        .await
        .unwrap();

    let result = service
        .remove_availability_slot(slot.id, as_client(), None)
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden)));

    service
        .remove_availability_slot(slot.id, as_trainer(), None)
        .await
        .unwrap();
    let free = setup
        .rest_state
        .slot_resolution_service()
        .get_available_slots(trainer_id(), MONDAY, as_client(), None)
        .await
        .unwrap();
    assert!(free.is_empty());

    let result = service
        .remove_availability_slot(slot.id, as_trainer(), None)
        .await;
    assert!(matches!(result, Err(ServiceError::EntityNotFound(id)) if id == slot.id));
}

fn two_weeks_of_weekdays() -> BulkAvailabilityRequest {
    BulkAvailabilityRequest {
        trainer_id: trainer_id(),
        start_date: MONDAY,
        end_date: date!(2024 - 06 - 14),
        weekdays: Arc::from([
            DayOfWeek::Monday,
            DayOfWeek::Tuesday,
            DayOfWeek::Wednesday,
            DayOfWeek::Thursday,
            DayOfWeek::Friday,
        ]),
        start_time: time!(09:00),
        end_time: time!(17:00),
        slot_duration_minutes: 60,
    }
}

#[tokio::test]
async fn test_bulk_create_counts_existing_slots_as_failures() {
    let setup = TestSetup::new().await;
    let service = setup.rest_state.availability_service();
    for (date, day_of_week) in [
        (MONDAY, DayOfWeek::Monday),
        (date!(2024 - 06 - 05), DayOfWeek::Wednesday),
        (date!(2024 - 06 - 14), DayOfWeek::Friday),
    ] {
        service
            .set_availability_slot(
                trainer_id(),
                day_of_week,
                time!(12:00),
                time!(13:00),
                Some(date),
                as_trainer(),
                None,
            )
            .await
            .unwrap();
    }

    let result = setup
        .rest_state
        .availability_bulk_service()
        .bulk_create(&two_weeks_of_weekdays(), as_trainer())
        .await
        .unwrap();
    assert_eq!(
        result,
        BulkResult {
            success_count: 77,
            failure_count: 3
        }
    );

    let rerun = setup
        .rest_state
        .availability_bulk_service()
        .bulk_create(&two_weeks_of_weekdays(), as_trainer())
        .await
        .unwrap();
    assert_eq!(
        rerun,
        BulkResult {
            success_count: 0,
            failure_count: 80
        }
    );

    let slots = service
        .get_trainer_slots_for_range(
            trainer_id(),
            MONDAY,
            date!(2024 - 06 - 16),
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(slots[&MONDAY].len(), 8);
    assert!(slots[&date!(2024 - 06 - 08)].is_empty());
    assert!(slots[&date!(2024 - 06 - 09)].is_empty());
}

#[tokio::test]
async fn test_copy_week_replays_weekdays() {
    let setup = TestSetup::new().await;
    let service = setup.rest_state.availability_service();
    for (date, day_of_week, from, to) in [
        (MONDAY, DayOfWeek::Monday, time!(09:00), time!(10:00)),
        (
            date!(2024 - 06 - 05),
            DayOfWeek::Wednesday,
            time!(14:00),
            time!(15:00),
        ),
    ] {
        service
            .set_availability_slot(
                trainer_id(),
                day_of_week,
                from,
                to,
                Some(date),
                as_trainer(),
                None,
            )
            .await
            .unwrap();
    }

    let result = setup
        .rest_state
        .availability_bulk_service()
        .copy_week(trainer_id(), MONDAY, date!(2024 - 06 - 17), as_trainer())
        .await
        .unwrap();
    assert_eq!(
        result,
        BulkResult {
            success_count: 2,
            failure_count: 0
        }
    );

    let target = service
        .get_trainer_slots_for_range(
            trainer_id(),
            date!(2024 - 06 - 17),
            date!(2024 - 06 - 23),
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(target[&date!(2024 - 06 - 17)][0].start_time, time!(09:00));
    assert_eq!(target[&date!(2024 - 06 - 19)][0].start_time, time!(14:00));
    assert_eq!(target[&date!(2024 - 06 - 19)][0].end_time, time!(15:00));
    assert!(target[&date!(2024 - 06 - 18)].is_empty());

    let again = setup
        .rest_state
        .availability_bulk_service()
        .copy_week(trainer_id(), MONDAY, date!(2024 - 06 - 17), as_trainer())
        .await
        .unwrap();
    assert_eq!(
        again,
        BulkResult {
            success_count: 0,
            failure_count: 2
        }
    );
}
