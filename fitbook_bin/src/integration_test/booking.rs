use dao::booking::{BookingDao, BookingEntity, BookingStatusEntity};
use dao::{DaoError, TransactionDao};
use dao_impl_sqlite::{booking::BookingDaoImpl, TransactionDaoImpl};
use rest::RestStateDef;
use service::booking::{Booking, BookingService, BookingStatus};
use service::optimistic::Optimistic;
use service::permission::Authentication;
use service::slot_resolution::SlotResolutionService;
use service::ServiceError;
use time::macros::{date, datetime, time};
use uuid::Uuid;

use crate::integration_test::{
    as_client, as_other_client, as_trainer, booking_request, client_id, declare_monday_morning,
    other_client_id, trainer_id, TestSetup, MONDAY,
};

#[tokio::test]
async fn test_booking_lifecycle() {
    let setup = TestSetup::new().await;
    declare_monday_morning(&setup).await;
    let service = setup.rest_state.booking_service();
    let mut transitions = setup
        .rest_state
        .booking_notification_service()
        .subscribe();

    let booking = service
        .create(
            &booking_request(client_id(), time!(10:00), time!(11:00)),
            as_client(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_price_cents, 6000);
    assert!(booking.created.is_some());

    let result = service.confirm(booking.id, as_client(), None).await;
    assert!(matches!(result, Err(ServiceError::Forbidden)));

    let confirmed = service
        .confirm(booking.id, as_trainer(), None)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_ne!(confirmed.version, booking.version);

    let completed = service
        .complete(booking.id, Some("Good form".into()), as_trainer(), None)
        .await
        .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);
    assert_eq!(completed.trainer_notes.as_deref(), Some("Good form"));
    assert!(service.session_has_started(&completed));

    let result = service
        .cancel(booking.id, "Too late".into(), as_client(), None)
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::InvalidTransition {
            from: BookingStatus::Completed,
            to: BookingStatus::Cancelled,
            ..
        })
    ));

    let stored = service.get(booking.id, as_client(), None).await.unwrap();
    assert_eq!(stored, completed);

    let events: Vec<_> = std::iter::from_fn(|| transitions.try_recv().ok()).collect();
    let steps: Vec<_> = events.iter().map(|event| (event.from, event.to)).collect();
    assert_eq!(
        steps,
        vec![
            (None, BookingStatus::Pending),
            (Some(BookingStatus::Pending), BookingStatus::Confirmed),
            (Some(BookingStatus::Confirmed), BookingStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_cancelled_booking_frees_the_slot() {
    let setup = TestSetup::new().await;
    declare_monday_morning(&setup).await;
    let service = setup.rest_state.booking_service();
    let booking = service
        .create(
            &booking_request(client_id(), time!(09:00), time!(10:00)),
            as_client(),
            None,
        )
        .await
        .unwrap();

    let result = service.cancel(booking.id, "  ".into(), as_client(), None).await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));

    let cancelled = service
        .cancel(booking.id, "Sick".into(), as_client(), None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Sick"));

    let free = setup
        .rest_state
        .slot_resolution_service()
        .get_available_slots(trainer_id(), MONDAY, as_other_client(), None)
        .await
        .unwrap();
    assert_eq!(free.len(), 3);

    service
        .create(
            &booking_request(other_client_id(), time!(09:00), time!(10:00)),
            as_other_client(),
            None,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_booking_outside_declared_availability_fails() {
    let setup = TestSetup::new().await;
    declare_monday_morning(&setup).await;
    let result = setup
        .rest_state
        .booking_service()
        .create(
            &booking_request(client_id(), time!(13:00), time!(14:00)),
            as_client(),
            None,
        )
        .await;
    assert!(matches!(result, Err(ServiceError::SlotUnavailable { .. })));
}

#[tokio::test]
async fn test_concurrent_double_booking_admits_one() {
    let setup = TestSetup::new().await;
    declare_monday_morning(&setup).await;
    let service = setup.rest_state.booking_service();
    let first = booking_request(client_id(), time!(11:00), time!(12:00));
    let second = booking_request(other_client_id(), time!(11:00), time!(12:00));

    let (first, second) = tokio::join!(
        service.create(&first, as_client(), None),
        service.create(&second, as_other_client(), None),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|result| matches!(result, Err(ServiceError::SlotUnavailable { .. }))));

    let bookings = service
        .get_for_trainer(trainer_id(), as_trainer(), None)
        .await
        .unwrap();
    assert_eq!(bookings.len(), 1);
}

#[tokio::test]
async fn test_concurrent_double_booking_on_shared_database_file() {
    let setup = TestSetup::file_backed().await;
    declare_monday_morning(&setup).await;
    let service = setup.rest_state.booking_service();
    let first = booking_request(client_id(), time!(11:00), time!(12:00));
    let second = booking_request(other_client_id(), time!(11:00), time!(12:00));

    let (first, second) = tokio::join!(
        service.create(&first, as_client(), None),
        service.create(&second, as_other_client(), None),
    );

    let results = [first, second];
    assert_eq!(
        results.iter().filter(|result| result.is_ok()).count(),
        1,
        "{results:?}"
    );
    assert!(
        results
            .iter()
            .any(|result| matches!(result, Err(ServiceError::SlotUnavailable { .. }))),
        "{results:?}"
    );
    let bookings = service
        .get_for_trainer(trainer_id(), as_trainer(), None)
        .await
        .unwrap();
    assert_eq!(bookings.len(), 1);
}

fn stored_booking(client_id: Uuid, status: BookingStatusEntity) -> BookingEntity {
    BookingEntity {
        id: Uuid::new_v4(),
        client_id,
        trainer_id: trainer_id(),
        booking_date: MONDAY,
        start_time: time!(09:00),
        end_time: time!(10:00),
        duration_minutes: 60,
        session_type: dao::booking::SessionTypeEntity::Virtual,
        hourly_rate_cents: 5000,
        total_price_cents: 5000,
        client_notes: None,
        trainer_notes: None,
        cancellation_reason: None,
        status,
        created: datetime!(2024 - 06 - 01 12:00),
        updated: datetime!(2024 - 06 - 01 12:00),
        version: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn test_storage_rejects_second_active_booking_for_same_start() {
    let setup = TestSetup::new().await;
    let transaction_dao = TransactionDaoImpl::new(setup.pool.clone());
    let booking_dao = BookingDaoImpl::new(setup.pool.clone());

    let tx = transaction_dao.new_transaction().await.unwrap();
    booking_dao
        .create(
            &stored_booking(client_id(), BookingStatusEntity::Cancelled),
            "test",
            tx.clone(),
        )
        .await
        .unwrap();
    booking_dao
        .create(
            &stored_booking(client_id(), BookingStatusEntity::Pending),
            "test",
            tx.clone(),
        )
        .await
        .unwrap();
    let result = booking_dao
        .create(
            &stored_booking(other_client_id(), BookingStatusEntity::Confirmed),
            "test",
            tx.clone(),
        )
        .await;
    assert!(matches!(
        result,
        Err(DaoError::UniqueConstraintViolation(_))
    ));
    transaction_dao.commit(tx).await.unwrap();
}

#[tokio::test]
async fn test_status_update_with_stale_version_is_rejected() {
    let setup = TestSetup::new().await;
    let transaction_dao = TransactionDaoImpl::new(setup.pool.clone());
    let booking_dao = BookingDaoImpl::new(setup.pool.clone());
    let booking = stored_booking(client_id(), BookingStatusEntity::Pending);

    let tx = transaction_dao.new_transaction().await.unwrap();
    booking_dao.create(&booking, "test", tx.clone()).await.unwrap();
    let confirmed = BookingEntity {
        status: BookingStatusEntity::Confirmed,
        version: Uuid::new_v4(),
        ..booking.clone()
    };
    booking_dao
        .update(&confirmed, booking.version, "test", tx.clone())
        .await
        .unwrap();
    let cancelled = BookingEntity {
        status: BookingStatusEntity::Cancelled,
        version: Uuid::new_v4(),
        ..booking.clone()
    };
    let result = booking_dao
        .update(&cancelled, booking.version, "test", tx.clone())
        .await;
    assert!(matches!(result, Err(DaoError::VersionConflict(id)) if id == booking.id));
    let stored = booking_dao
        .find_by_id(booking.id, tx.clone())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, BookingStatusEntity::Confirmed);
    transaction_dao.commit(tx).await.unwrap();
}

#[tokio::test]
async fn test_optimistic_booking_reconciles_with_real_result() {
    let setup = TestSetup::new().await;
    declare_monday_morning(&setup).await;
    let service = setup.rest_state.booking_service();
    let draft = booking_request(client_id(), time!(09:00), time!(10:00));

    let state: Optimistic<Booking, Booking> = Optimistic::pending(draft.clone());
    assert!(state.persisted().is_none());
    let state = state.reconcile(service.create(&draft, as_client(), None).await);
    let persisted = state.persisted().expect("booking is persisted");
    assert_eq!(persisted.status, BookingStatus::Pending);

    let competing = booking_request(other_client_id(), time!(09:00), time!(10:00));
    let state: Optimistic<Booking, Booking> = Optimistic::pending(competing.clone());
    let state = state.reconcile(service.create(&competing, as_other_client(), None).await);
    match state {
        Optimistic::RolledBack { draft, reason } => {
            assert_eq!(draft, competing);
            assert!(reason.contains("please pick another time"));
        }
        other => panic!("Expected rollback, got {other:?}"),
    }
}

#[tokio::test]
async fn test_trainer_earnings_sum_completed_sessions() {
    let setup = TestSetup::new().await;
    declare_monday_morning(&setup).await;
    let service = setup.rest_state.booking_service();

    let mut completed = Vec::new();
    for (client, context, from, to) in [
        (client_id(), as_client(), time!(09:00), time!(10:00)),
        (other_client_id(), as_other_client(), time!(10:00), time!(11:00)),
    ] {
        let booking = service
            .create(&booking_request(client, from, to), context, None)
            .await
            .unwrap();
        service
            .confirm(booking.id, as_trainer(), None)
            .await
            .unwrap();
        completed.push(
            service
                .complete(booking.id, None, as_trainer(), None)
                .await
                .unwrap(),
        );
    }
    let pending = service
        .create(
            &booking_request(client_id(), time!(11:00), time!(12:00)),
            as_client(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(pending.status, BookingStatus::Pending);

    let earnings = service
        .get_trainer_earnings(
            trainer_id(),
            date!(2024 - 06 - 01),
            date!(2024 - 06 - 30),
            as_trainer(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(earnings.completed_sessions, 2);
    assert_eq!(earnings.total_price_cents, 12000);

    let result = service
        .get_trainer_earnings(
            trainer_id(),
            date!(2024 - 06 - 01),
            date!(2024 - 06 - 30),
            as_client(),
            None,
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Forbidden)));

    let all = service
        .get_for_trainer(trainer_id(), Authentication::Full, None)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all
        .windows(2)
        .all(|pair| pair[0].start_time <= pair[1].start_time));
}
