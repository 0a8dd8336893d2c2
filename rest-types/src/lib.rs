use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime, Time};
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "service-impl")]
use fitbook_utils::{DayOfWeek, TimeWindow};
#[cfg(feature = "service-impl")]
use service::{
    availability::AvailabilitySlot,
    availability_bulk::{BulkAvailabilityRequest, BulkResult},
    booking::{Booking, BookingStatus, SessionType, TrainerEarnings},
};

time::serde::format_description!(hh_mm, Time, "[hour]:[minute]");

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub enum DayOfWeekTO {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}
#[cfg(feature = "service-impl")]
impl From<DayOfWeek> for DayOfWeekTO {
    fn from(day_of_week: DayOfWeek) -> Self {
        match day_of_week {
            DayOfWeek::Sunday => Self::Sunday,
            DayOfWeek::Monday => Self::Monday,
            DayOfWeek::Tuesday => Self::Tuesday,
            DayOfWeek::Wednesday => Self::Wednesday,
            DayOfWeek::Thursday => Self::Thursday,
            DayOfWeek::Friday => Self::Friday,
            DayOfWeek::Saturday => Self::Saturday,
        }
    }
}
#[cfg(feature = "service-impl")]
impl From<DayOfWeekTO> for DayOfWeek {
    fn from(day_of_week: DayOfWeekTO) -> Self {
        match day_of_week {
            DayOfWeekTO::Sunday => Self::Sunday,
            DayOfWeekTO::Monday => Self::Monday,
            DayOfWeekTO::Tuesday => Self::Tuesday,
            DayOfWeekTO::Wednesday => Self::Wednesday,
            DayOfWeekTO::Thursday => Self::Thursday,
            DayOfWeekTO::Friday => Self::Friday,
            DayOfWeekTO::Saturday => Self::Saturday,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilitySlotTO {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub day_of_week: DayOfWeekTO,
    #[serde(default)]
    pub specific_date: Option<Date>,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: Time,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "10:00")]
    pub end_time: Time,
    pub is_recurring: bool,
    #[serde(default)]
    pub updated: Option<PrimitiveDateTime>,
    #[serde(rename = "$version")]
    #[serde(default)]
    pub version: Uuid,
}
#[cfg(feature = "service-impl")]
impl From<&AvailabilitySlot> for AvailabilitySlotTO {
    fn from(slot: &AvailabilitySlot) -> Self {
        Self {
            id: slot.id,
            trainer_id: slot.trainer_id,
            day_of_week: slot.day_of_week.into(),
            specific_date: slot.specific_date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            is_recurring: slot.is_recurring,
            updated: slot.updated,
            version: slot.version,
        }
    }
}

/// Declares a recurring window, or a one-off window if `specific_date` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SetAvailabilitySlotTO {
    pub day_of_week: DayOfWeekTO,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: Time,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "12:00")]
    pub end_time: Time,
    #[serde(default)]
    pub specific_date: Option<Date>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DayAvailabilityTO {
    pub day_of_week: DayOfWeekTO,
    pub slots: Arc<[AvailabilitySlotTO]>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateAvailabilityTO {
    pub date: Date,
    pub slots: Arc<[AvailabilitySlotTO]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeWindowTO {
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: Time,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "10:00")]
    pub end_time: Time,
}
#[cfg(feature = "service-impl")]
impl From<&TimeWindow> for TimeWindowTO {
    fn from(window: &TimeWindow) -> Self {
        Self {
            start_time: window.from,
            end_time: window.to,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkAvailabilityRequestTO {
    #[serde(default)]
    pub trainer_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub weekdays: Arc<[DayOfWeekTO]>,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "09:00")]
    pub start_time: Time,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "17:00")]
    pub end_time: Time,
    #[schema(example = 60)]
    pub slot_duration_minutes: u16,
}
#[cfg(feature = "service-impl")]
impl From<&BulkAvailabilityRequestTO> for BulkAvailabilityRequest {
    fn from(request: &BulkAvailabilityRequestTO) -> Self {
        Self {
            trainer_id: request.trainer_id,
            start_date: request.start_date,
            end_date: request.end_date,
            weekdays: request
                .weekdays
                .iter()
                .map(|day_of_week| DayOfWeek::from(*day_of_week))
                .collect(),
            start_time: request.start_time,
            end_time: request.end_time,
            slot_duration_minutes: request.slot_duration_minutes,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkResultTO {
    pub success_count: u32,
    pub failure_count: u32,
}
#[cfg(feature = "service-impl")]
impl From<&BulkResult> for BulkResultTO {
    fn from(result: &BulkResult) -> Self {
        Self {
            success_count: result.success_count,
            failure_count: result.failure_count,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CopyWeekTO {
    pub source_week_start: Date,
    pub target_week_start: Date,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatusTO {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}
#[cfg(feature = "service-impl")]
impl From<BookingStatus> for BookingStatusTO {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Confirmed => Self::Confirmed,
            BookingStatus::Cancelled => Self::Cancelled,
            BookingStatus::Completed => Self::Completed,
        }
    }
}
#[cfg(feature = "service-impl")]
impl From<BookingStatusTO> for BookingStatus {
    fn from(status: BookingStatusTO) -> Self {
        match status {
            BookingStatusTO::Pending => Self::Pending,
            BookingStatusTO::Confirmed => Self::Confirmed,
            BookingStatusTO::Cancelled => Self::Cancelled,
            BookingStatusTO::Completed => Self::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionTypeTO {
    Virtual,
    InPerson,
}
#[cfg(feature = "service-impl")]
impl From<SessionType> for SessionTypeTO {
    fn from(session_type: SessionType) -> Self {
        match session_type {
            SessionType::Virtual => Self::Virtual,
            SessionType::InPerson => Self::InPerson,
        }
    }
}
#[cfg(feature = "service-impl")]
impl From<SessionTypeTO> for SessionType {
    fn from(session_type: SessionTypeTO) -> Self {
        match session_type {
            SessionTypeTO::Virtual => Self::Virtual,
            SessionTypeTO::InPerson => Self::InPerson,
        }
    }
}

fn default_status() -> BookingStatusTO {
    BookingStatusTO::Pending
}

/// Prices are in cents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookingTO {
    #[serde(default)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub trainer_id: Uuid,
    pub booking_date: Date,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: Time,
    #[serde(with = "hh_mm")]
    #[schema(value_type = String, example = "11:00")]
    pub end_time: Time,
    pub duration_minutes: u32,
    pub session_type: SessionTypeTO,
    pub hourly_rate_cents: i64,
    pub total_price_cents: i64,
    #[serde(default)]
    pub client_notes: Option<Arc<str>>,
    #[serde(default)]
    pub trainer_notes: Option<Arc<str>>,
    #[serde(default)]
    pub cancellation_reason: Option<Arc<str>>,
    #[serde(default = "default_status")]
    pub status: BookingStatusTO,
    #[serde(default)]
    pub created: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub updated: Option<PrimitiveDateTime>,
    #[serde(rename = "$version")]
    #[serde(default)]
    pub version: Uuid,
}
#[cfg(feature = "service-impl")]
impl From<&Booking> for BookingTO {
    fn from(booking: &Booking) -> Self {
        Self {
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
            created: booking.created,
            updated: booking.updated,
            version: booking.version,
        }
    }
}
#[cfg(feature = "service-impl")]
impl From<&BookingTO> for Booking {
    fn from(booking: &BookingTO) -> Self {
        Self {
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
            created: booking.created,
            updated: booking.updated,
            version: booking.version,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusTO {
    pub status: BookingStatusTO,
    #[serde(default)]
    pub reason: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CancelBookingTO {
    pub reason: Arc<str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompleteBookingTO {
    #[serde(default)]
    pub trainer_notes: Option<Arc<str>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrainerEarningsTO {
    pub trainer_id: Uuid,
    pub from: Date,
    pub to: Date,
    pub completed_sessions: u32,
    pub total_price_cents: i64,
}
#[cfg(feature = "service-impl")]
impl From<&TrainerEarnings> for TrainerEarningsTO {
    fn from(earnings: &TrainerEarnings) -> Self {
        Self {
            trainer_id: earnings.trainer_id,
            from: earnings.from,
            to: earnings.to,
            completed_sessions: earnings.completed_sessions,
            total_price_cents: earnings.total_price_cents,
        }
    }
}
