use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStatusEntity {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatusEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatusEntity::Pending => "pending",
            BookingStatusEntity::Confirmed => "confirmed",
            BookingStatusEntity::Cancelled => "cancelled",
            BookingStatusEntity::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DaoError> {
        match value {
            "pending" => Ok(BookingStatusEntity::Pending),
            "confirmed" => Ok(BookingStatusEntity::Confirmed),
            "cancelled" => Ok(BookingStatusEntity::Cancelled),
            "completed" => Ok(BookingStatusEntity::Completed),
            _ => Err(DaoError::EnumValueNotFound(value.into())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTypeEntity {
    Virtual,
    InPerson,
}

impl SessionTypeEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionTypeEntity::Virtual => "virtual",
            SessionTypeEntity::InPerson => "in_person",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DaoError> {
        match value {
            "virtual" => Ok(SessionTypeEntity::Virtual),
            "in_person" => Ok(SessionTypeEntity::InPerson),
            _ => Err(DaoError::EnumValueNotFound(value.into())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingEntity {
    pub id: Uuid,
    pub client_id: Uuid,
    pub trainer_id: Uuid,
    pub booking_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub duration_minutes: u32,
    pub session_type: SessionTypeEntity,
    pub hourly_rate_cents: i64,
    pub total_price_cents: i64,
    pub client_notes: Option<Arc<str>>,
    pub trainer_notes: Option<Arc<str>>,
    pub cancellation_reason: Option<Arc<str>>,
    pub status: BookingStatusEntity,
    pub created: PrimitiveDateTime,
    pub updated: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait BookingDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError>;

    /// Pending and confirmed bookings of a trainer on a date.
    async fn find_active_by_trainer_and_date(
        &self,
        trainer_id: Uuid,
        booking_date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;

    async fn find_by_trainer(
        &self,
        trainer_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;

    async fn find_by_client(
        &self,
        client_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;

    /// Fails with `DaoError::UniqueConstraintViolation` if another active
    /// booking already starts at the same trainer, date and time.
    async fn create(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    /// Writes status, notes and version if the stored version still equals
    /// `previous_version`, otherwise fails with `DaoError::VersionConflict`.
    async fn update(
        &self,
        entity: &BookingEntity,
        previous_version: Uuid,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
