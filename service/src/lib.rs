use std::sync::Arc;

use fitbook_utils::FitbookUtilsError;
use thiserror::Error;
use time::{Date, Time};
use uuid::Uuid;

pub mod availability;
pub mod availability_bulk;
pub mod booking;
pub mod clock;
pub mod config;
pub mod identity;
pub mod notification;
pub mod optimistic;
pub mod permission;
pub mod slot_resolution;
pub mod uuid_service;

pub use permission::MockPermissionService;
pub use permission::PermissionService;

use crate::booking::BookingStatus;

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationFailureItem {
    ModificationNotAllowed(Arc<str>),
    InvalidValue(Arc<str>),
    MissingValue(Arc<str>),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),

    #[error("Forbidden")]
    Forbidden,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Entity {0} aready exists")]
    EntityAlreadyExists(Uuid),

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("Entity {0} conflicts, expected version {1} but got {2}")]
    EntityConflicts(Uuid, Uuid, Uuid),

    #[error("Validation error: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),

    #[error("ID cannot be set on create")]
    IdSetOnCreate,

    #[error("Version cannot be set on create")]
    VersionSetOnCreate,

    #[error("Time order wrong. {0} must be before {1}")]
    TimeOrderWrong(Time, Time),

    #[error("Date order wrong. {0} must be before {1}")]
    DateOrderWrong(Date, Date),

    #[error("Slot {from}-{to} on {date} is not available for trainer {trainer_id}, please pick another time")]
    SlotUnavailable {
        trainer_id: Uuid,
        date: Date,
        from: Time,
        to: Time,
    },

    #[error("Booking {id} cannot change from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Internal error")]
    InternalError,
}

impl ServiceError {
    /// Malformed input which the caller has to fix before trying again.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ServiceError::ValidationError(_)
                | ServiceError::TimeOrderWrong(_, _)
                | ServiceError::DateOrderWrong(_, _)
                | ServiceError::IdSetOnCreate
                | ServiceError::VersionSetOnCreate
        )
    }

    /// Store failures which are safe to retry for read operations.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::DatabaseQueryError(dao::DaoError::DatabaseQueryError(_))
        )
    }
}

impl From<FitbookUtilsError> for ServiceError {
    fn from(err: FitbookUtilsError) -> Self {
        match err {
            FitbookUtilsError::TimeOrderWrong(from, to) => ServiceError::TimeOrderWrong(from, to),
            FitbookUtilsError::InvalidDayOfWeek(number) => ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue(
                    format!("day_of_week {number}").into(),
                )]
                .into(),
            ),
            FitbookUtilsError::ZeroSlotDuration => ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue(
                    "slot_duration_minutes".into(),
                )]
                .into(),
            ),
            FitbookUtilsError::DateOutOfRange => ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue("date".into())].into(),
            ),
        }
    }
}
