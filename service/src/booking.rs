use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use dao::booking::{BookingEntity, BookingStatusEntity, SessionTypeEntity};
use dao::MockTransaction;
use fitbook_utils::TimeWindow;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Active bookings block their window for other clients.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    pub fn can_transition_to(&self, to: BookingStatus) -> bool {
        matches!(
            (self, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(BookingStatusEntity::from(*self).as_str())
    }
}

impl From<BookingStatusEntity> for BookingStatus {
    fn from(status: BookingStatusEntity) -> Self {
        match status {
            BookingStatusEntity::Pending => Self::Pending,
            BookingStatusEntity::Confirmed => Self::Confirmed,
            BookingStatusEntity::Cancelled => Self::Cancelled,
            BookingStatusEntity::Completed => Self::Completed,
        }
    }
}
impl From<BookingStatus> for BookingStatusEntity {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::Cancelled => Self::Cancelled,
            BookingStatus::Completed => Self::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionType {
    Virtual,
    InPerson,
}
impl From<SessionTypeEntity> for SessionType {
    fn from(session_type: SessionTypeEntity) -> Self {
        match session_type {
            SessionTypeEntity::Virtual => Self::Virtual,
            SessionTypeEntity::InPerson => Self::InPerson,
        }
    }
}
impl From<SessionType> for SessionTypeEntity {
    fn from(session_type: SessionType) -> Self {
        match session_type {
            SessionType::Virtual => Self::Virtual,
            SessionType::InPerson => Self::InPerson,
        }
    }
}

/// A reserved session. Prices are cents and snapshot the rate at booking time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub trainer_id: Uuid,
    pub booking_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub duration_minutes: u32,
    pub session_type: SessionType,
    pub hourly_rate_cents: i64,
    pub total_price_cents: i64,
    pub client_notes: Option<Arc<str>>,
    pub trainer_notes: Option<Arc<str>>,
    pub cancellation_reason: Option<Arc<str>>,
    pub status: BookingStatus,
    pub created: Option<PrimitiveDateTime>,
    pub updated: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl Booking {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            from: self.start_time,
            to: self.end_time,
        }
    }

    pub fn starts_at(&self) -> PrimitiveDateTime {
        PrimitiveDateTime::new(self.booking_date, self.start_time)
    }
}

impl From<&BookingEntity> for Booking {
    fn from(entity: &BookingEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            trainer_id: entity.trainer_id,
            booking_date: entity.booking_date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            duration_minutes: entity.duration_minutes,
            session_type: entity.session_type.into(),
            hourly_rate_cents: entity.hourly_rate_cents,
            total_price_cents: entity.total_price_cents,
            client_notes: entity.client_notes.clone(),
            trainer_notes: entity.trainer_notes.clone(),
            cancellation_reason: entity.cancellation_reason.clone(),
            status: entity.status.into(),
            created: Some(entity.created),
            updated: Some(entity.updated),
            version: entity.version,
        }
    }
}

fitbook_utils::derive_from_reference!(BookingEntity, Booking);

impl TryFrom<&Booking> for BookingEntity {
    type Error = ServiceError;
    fn try_from(booking: &Booking) -> Result<Self, Self::Error> {
        Ok(Self {
            id: booking.id,
            client_id: booking.client_id,
            trainer_id: booking.trainer_id,
            booking_date: booking.booking_date,
            start_time: booking.start_time,
            end_time: booking.end_time,
            duration_minutes: booking.duration_minutes,
            session_type: booking.session_type.into(),
            hourly_rate_cents: booking.hourly_rate_cents,
            total_price_cents: booking.total_price_cents,
            client_notes: booking.client_notes.clone(),
            trainer_notes: booking.trainer_notes.clone(),
            cancellation_reason: booking.cancellation_reason.clone(),
            status: booking.status.into(),
            created: booking.created.ok_or(ServiceError::InternalError)?,
            updated: booking.updated.ok_or(ServiceError::InternalError)?,
            version: booking.version,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainerEarnings {
    pub trainer_id: Uuid,
    pub from: Date,
    pub to: Date,
    pub completed_sessions: u32,
    pub total_price_cents: i64,
}

#[automock(type Context=(); type Transaction=MockTransaction;)]
#[async_trait]
pub trait BookingService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn get_for_trainer(
        &self,
        trainer_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError>;

    async fn get_for_client(
        &self,
        client_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[Booking]>, ServiceError>;

    /// Creates a pending booking if the window is still free.
    async fn create(
        &self,
        booking: &Booking,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    /// `reason` is the cancellation reason when cancelling and the session
    /// notes when completing.
    async fn update_status(
        &self,
        id: Uuid,
        new_status: BookingStatus,
        reason: Option<Arc<str>>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn confirm(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn cancel(
        &self,
        id: Uuid,
        reason: Arc<str>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    async fn complete(
        &self,
        id: Uuid,
        notes: Option<Arc<str>>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Booking, ServiceError>;

    /// True once the booked date and start time lie in the past.
    fn session_has_started(&self, booking: &Booking) -> bool;

    /// Sums the price snapshots of completed bookings in `[from, to]`.
    async fn get_trainer_earnings(
        &self,
        trainer_id: Uuid,
        from: Date,
        to: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<TrainerEarnings, ServiceError>;
}
