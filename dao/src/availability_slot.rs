use std::sync::Arc;

use async_trait::async_trait;
use fitbook_utils::DayOfWeek;
use mockall::automock;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvailabilitySlotEntity {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub specific_date: Option<Date>,
    pub start_time: Time,
    pub end_time: Time,
    pub is_recurring: bool,
    pub updated: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait AvailabilitySlotDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<AvailabilitySlotEntity>, DaoError>;

    /// Weekly templates of a trainer ordered by weekday and start time.
    async fn find_recurring_by_trainer(
        &self,
        trainer_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[AvailabilitySlotEntity]>, DaoError>;

    async fn find_recurring_by_key(
        &self,
        trainer_id: Uuid,
        day_of_week: DayOfWeek,
        start_time: Time,
        tx: Self::Transaction,
    ) -> Result<Option<AvailabilitySlotEntity>, DaoError>;

    /// Date-specific slots with `from <= specific_date <= to`.
    async fn find_specific_by_trainer_and_range(
        &self,
        trainer_id: Uuid,
        from: Date,
        to: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[AvailabilitySlotEntity]>, DaoError>;

    async fn find_specific_by_key(
        &self,
        trainer_id: Uuid,
        specific_date: Date,
        start_time: Time,
        tx: Self::Transaction,
    ) -> Result<Option<AvailabilitySlotEntity>, DaoError>;

    async fn create(
        &self,
        entity: &AvailabilitySlotEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn update(
        &self,
        entity: &AvailabilitySlotEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;

    async fn delete(&self, id: Uuid, tx: Self::Transaction) -> Result<(), DaoError>;
}
