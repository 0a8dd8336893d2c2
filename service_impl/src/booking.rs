use std::sync::Arc;

use crate::gen_service_impl;
use async_trait::async_trait;
use dao::booking::BookingDao;
use dao::{DaoError, TransactionDao};
use fitbook_utils::TimeWindow;
use service::{
    booking::{Booking, BookingService, BookingStatus, TrainerEarnings},
    clock::ClockService,
    notification::{BookingNotificationService, BookingTransition},
    permission::Authentication,
    slot_resolution::SlotResolutionService,
    uuid_service::UuidService,
    PermissionService, ServiceError, ValidationFailureItem,
};
use time::Date;
use tokio::join;
use tracing::{info, warn};
use uuid::Uuid;

const BOOKING_SERVICE_PROCESS: &str = "booking-service";

gen_service_impl! {
    struct BookingServiceImpl: BookingService = BookingServiceDeps {
        BookingDao: BookingDao<Transaction = Self::Transaction> = booking_dao,
        SlotResolutionService: SlotResolutionService<Context = Self::Context, Transaction = Self::Transaction> = slot_resolution_service,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        BookingNotificationService: BookingNotificationService = booking_notification_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

fn validate_new_booking(booking: &Booking) -> Result<TimeWindow, ServiceError> {
    if booking.id != Uuid::nil() {
        return Err(ServiceError::IdSetOnCreate);
    }
    if booking.version != Uuid::nil() {
        return Err(ServiceError::VersionSetOnCreate);
    }
    let window = TimeWindow::new(booking.start_time, booking.end_time)?;

    let mut validation = Vec::with_capacity(8);
    if booking.client_id == Uuid::nil() {
        validation.push(ValidationFailureItem::MissingValue("client_id".into()));
    }
    if booking.trainer_id == Uuid::nil() {
        validation.push(ValidationFailureItem::MissingValue("trainer_id".into()));
    }
    if booking.client_id == booking.trainer_id {
        validation.push(ValidationFailureItem::InvalidValue("client_id".into()));
    }
    if window.duration_minutes() != booking.duration_minutes as i64 {
        validation.push(ValidationFailureItem::InvalidValue(
            "duration_minutes".into(),
        ));
    }
    if booking.hourly_rate_cents < 0 {
        validation.push(ValidationFailureItem::InvalidValue(
            "hourly_rate_cents".into(),
        ));
    }
    if booking.total_price_cents < 0 {
        validation.push(ValidationFailureItem::InvalidValue(
            "total_price_cents".into(),
        ));
    }
    if booking.status != BookingStatus::Pending {
        validation.push(ValidationFailureItem::InvalidValue("status".into()));
    }
    if booking.created.is_some() {
        validation.push(ValidationFailureItem::InvalidValue("created".into()));
    }
    if booking.trainer_notes.is_some() {
        validation.push(ValidationFailureItem::ModificationNotAllowed(
            "trainer_notes".into(),
        ));
    }
    if booking.cancellation_reason.is_some() {
        validation.push(ValidationFailureItem::ModificationNotAllowed(
            "cancellation_reason".into(),
        ));
    }
    if !validation.is_empty() {
        return Err(ServiceError::ValidationError(validation.into()));
    }
    Ok(window)
}

impl<Deps: BookingServiceDeps> BookingServiceImpl<Deps> {
    async fn check_participant(
        &self,
        booking: &Booking,
        context: Authentication<Deps::Context>,
    ) -> Result<(), ServiceError> {
        let (as_trainer, as_client) = join!(
            self.permission_service
                .check_trainer(booking.trainer_id, context.clone()),
            self.permission_service
                .check_user(booking.client_id, context),
        );
        as_trainer.or(as_client)
    }

    async fn publish(&self, transition: BookingTransition) {
        let booking_id = transition.booking_id;
        if let Err(err) = self.booking_notification_service.notify(transition).await {
            warn!(%booking_id, "Booking notification failed: {err}");
        }
    }
}

#[async_trait]
impl<Deps: BookingServiceDeps> BookingService for BookingServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let booking = self
            .booking_dao
            .find_by_id(id, tx.clone())
            .await?
            .map(Booking::from)
            .ok_or(ServiceError::EntityNotFound(id))?;
        self.check_participant(&booking, context).await?;
        self.transaction_dao.commit(tx).await?;
        Ok(booking)
    }

    async fn get_for_trainer(
        &self,
        trainer_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError> {
        self.permission_service
            .check_trainer(trainer_id, context)
            .await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self
            .booking_dao
            .find_by_trainer(trainer_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(bookings.iter().map(Booking::from).collect())
    }

    async fn get_for_client(
        &self,
        client_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError> {
        self.permission_service
            .check_user(client_id, context)
            .await?;
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self
            .booking_dao
            .find_by_client(client_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        Ok(bookings.iter().map(Booking::from).collect())
    }

    async fn create(
        &self,
        booking: &Booking,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_user(booking.client_id, context.clone())
            .await?;
        let window = validate_new_booking(booking)?;
        let slot_unavailable = || ServiceError::SlotUnavailable {
            trainer_id: booking.trainer_id,
            date: booking.booking_date,
            from: booking.start_time,
            to: booking.end_time,
        };

        let tx = self.transaction_dao.use_write_transaction(tx).await?;
        let free = self
            .slot_resolution_service
            .get_available_slots(
                booking.trainer_id,
                booking.booking_date,
                context,
                Some(tx.clone()),
            )
            .await?;
        if !free.iter().any(|free_window| free_window.contains(&window)) {
            return Err(slot_unavailable());
        }

        let now = self.clock_service.date_time_now();
        let new_booking = Booking {
            id: self
                .uuid_service
                .new_uuid(&format!("{}::create id", BOOKING_SERVICE_PROCESS)),
            version: self
                .uuid_service
                .new_uuid(&format!("{}::create version", BOOKING_SERVICE_PROCESS)),
            status: BookingStatus::Pending,
            created: Some(now),
            updated: Some(now),
            ..booking.clone()
        };
        match self
            .booking_dao
            .create(
                &(&new_booking).try_into()?,
                BOOKING_SERVICE_PROCESS,
                tx.clone(),
            )
            .await
        {
            Err(DaoError::UniqueConstraintViolation(_)) => return Err(slot_unavailable()),
            result => result?,
        }
        self.transaction_dao.commit(tx).await?;
        info!(
            booking_id = %new_booking.id,
            trainer_id = %new_booking.trainer_id,
            client_id = %new_booking.client_id,
            date = %new_booking.booking_date,
            %window,
            "Booking created"
        );

        self.publish(BookingTransition {
            booking_id: new_booking.id,
            trainer_id: new_booking.trainer_id,
            client_id: new_booking.client_id,
            from: None,
            to: BookingStatus::Pending,
            reason: None,
        })
        .await;
        Ok(new_booking)
    }

    async fn update_status(
        &self,
        id: Uuid,
        new_status: BookingStatus,
        reason: Option<Arc<str>>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        let tx = self.transaction_dao.use_write_transaction(tx).await?;
        let booking = self
            .booking_dao
            .find_by_id(id, tx.clone())
            .await?
            .map(Booking::from)
            .ok_or(ServiceError::EntityNotFound(id))?;

        match new_status {
            BookingStatus::Confirmed | BookingStatus::Completed => {
                self.permission_service
                    .check_trainer(booking.trainer_id, context)
                    .await?
            }
            BookingStatus::Pending | BookingStatus::Cancelled => {
                self.check_participant(&booking, context).await?
            }
        }
        if !booking.status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidTransition {
                id,
                from: booking.status,
                to: new_status,
            });
        }

        let reason = reason.filter(|reason| !reason.trim().is_empty());
        let mut updated = booking.clone();
        match new_status {
            BookingStatus::Cancelled => {
                let Some(reason) = reason.clone() else {
                    return Err(ServiceError::ValidationError(
                        [ValidationFailureItem::MissingValue(
                            "cancellation_reason".into(),
                        )]
                        .into(),
                    ));
                };
                updated.cancellation_reason = Some(reason);
            }
            BookingStatus::Completed => {
                if !self.session_has_started(&booking) {
                    warn!(booking_id = %id, "Completing a session which has not started yet");
                }
                if reason.is_some() {
                    updated.trainer_notes = reason.clone();
                }
            }
            BookingStatus::Pending | BookingStatus::Confirmed => {}
        }
        updated.status = new_status;
        updated.updated = Some(self.clock_service.date_time_now());
        updated.version = self
            .uuid_service
            .new_uuid(&format!("{}::update version", BOOKING_SERVICE_PROCESS));

        match self
            .booking_dao
            .update(
                &(&updated).try_into()?,
                booking.version,
                BOOKING_SERVICE_PROCESS,
                tx.clone(),
            )
            .await
        {
            Err(DaoError::VersionConflict(_)) => {
                let actual_version = self
                    .booking_dao
                    .find_by_id(id, tx.clone())
                    .await?
                    .map(|entity| entity.version)
                    .unwrap_or_default();
                return Err(ServiceError::EntityConflicts(
                    id,
                    booking.version,
                    actual_version,
                ));
            }
            result => result?,
        }
        self.transaction_dao.commit(tx).await?;
        info!(booking_id = %id, from = %booking.status, to = %new_status, "Booking status changed");

        self.publish(BookingTransition {
            booking_id: id,
            trainer_id: updated.trainer_id,
            client_id: updated.client_id,
            from: Some(booking.status),
            to: new_status,
            reason,
        })
        .await;
        Ok(updated)
    }

    async fn confirm(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        self.update_status(id, BookingStatus::Confirmed, None, context, tx)
            .await
    }

    async fn cancel(
        &self,
        id: Uuid,
        reason: Arc<str>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        self.update_status(id, BookingStatus::Cancelled, Some(reason), context, tx)
            .await
    }

    async fn complete(
        &self,
        id: Uuid,
        notes: Option<Arc<str>>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError> {
        self.update_status(id, BookingStatus::Completed, notes, context, tx)
            .await
    }

    fn session_has_started(&self, booking: &Booking) -> bool {
        booking.starts_at() <= self.clock_service.date_time_now()
    }

    async fn get_trainer_earnings(
        &self,
        trainer_id: Uuid,
        from: Date,
        to: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TrainerEarnings, ServiceError> {
        self.permission_service
            .check_trainer(trainer_id, context)
            .await?;
        if to < from {
            return Err(ServiceError::DateOrderWrong(from, to));
        }
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let bookings = self
            .booking_dao
            .find_by_trainer(trainer_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        let completed = bookings.iter().filter(|booking| {
            BookingStatus::from(booking.status) == BookingStatus::Completed
                && from <= booking.booking_date
                && booking.booking_date <= to
        });
        let (completed_sessions, total_price_cents) = completed
            .fold((0u32, 0i64), |(count, sum), booking| {
                (count + 1, sum + booking.total_price_cents)
            });
        Ok(TrainerEarnings {
            trainer_id,
            from,
            to,
            completed_sessions,
            total_price_cents,
        })
    }
}
