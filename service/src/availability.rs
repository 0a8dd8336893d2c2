use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::availability_slot::AvailabilitySlotEntity;
use dao::MockTransaction;
use fitbook_utils::{DayOfWeek, TimeWindow};
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub specific_date: Option<Date>,
    pub start_time: Time,
    pub end_time: Time,
    pub is_recurring: bool,
    pub updated: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl AvailabilitySlot {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            from: self.start_time,
            to: self.end_time,
        }
    }
}

impl From<&AvailabilitySlotEntity> for AvailabilitySlot {
    fn from(entity: &AvailabilitySlotEntity) -> Self {
        Self {
            id: entity.id,
            trainer_id: entity.trainer_id,
            day_of_week: entity.day_of_week,
            specific_date: entity.specific_date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            is_recurring: entity.is_recurring,
            updated: Some(entity.updated),
            version: entity.version,
        }
    }
}

fitbook_utils::derive_from_reference!(AvailabilitySlotEntity, AvailabilitySlot);

impl TryFrom<&AvailabilitySlot> for AvailabilitySlotEntity {
    type Error = ServiceError;
    fn try_from(slot: &AvailabilitySlot) -> Result<Self, Self::Error> {
        Ok(Self {
            id: slot.id,
            trainer_id: slot.trainer_id,
            day_of_week: slot.day_of_week,
            specific_date: slot.specific_date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            is_recurring: slot.is_recurring,
            updated: slot.updated.ok_or(ServiceError::InternalError)?,
            version: slot.version,
        })
    }
}

/// Recurring templates for every weekday, each list ordered by start time.
pub type WeekTemplate = BTreeMap<DayOfWeek, Arc<[AvailabilitySlot]>>;

/// Declared slots per calendar date, each list ordered by start time.
pub type DateIndexedSlots = BTreeMap<Date, Arc<[AvailabilitySlot]>>;

#[automock(type Context=(); type Transaction=MockTransaction;)]
#[async_trait]
pub trait AvailabilityService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    /// Without `specific_date` the slot is a weekly template and re-adding the
    /// same weekday and start time replaces the end time. With
    /// `specific_date` it only applies to that date and `day_of_week` must
    /// match the date.
    async fn set_availability_slot(
        &self,
        trainer_id: Uuid,
        day_of_week: DayOfWeek,
        start_time: Time,
        end_time: Time,
        specific_date: Option<Date>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<AvailabilitySlot, ServiceError>;

    async fn remove_availability_slot(
        &self,
        slot_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError>;

    async fn get_trainer_availability(
        &self,
        trainer_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<WeekTemplate, ServiceError>;

    /// Every date in `[start_date, end_date]` gets an entry, possibly empty.
    async fn get_trainer_slots_for_range(
        &self,
        trainer_id: Uuid,
        start_date: Date,
        end_date: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<DateIndexedSlots, ServiceError>;
}
