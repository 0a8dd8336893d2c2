use std::sync::Arc;

use crate::{
    format_date, format_time, parse_date, parse_time, ResultDbErrorExt, ResultUniqueErrorExt,
    TransactionImpl,
};
use async_trait::async_trait;
use dao::{
    availability_slot::{AvailabilitySlotDao, AvailabilitySlotEntity},
    DaoError,
};
use fitbook_utils::DayOfWeek;
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime, Time};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, trainer_id, day_of_week, specific_date, start_time, end_time, is_recurring, updated, update_version FROM availability_slot";

#[derive(Debug, sqlx::FromRow)]
struct AvailabilitySlotDb {
    id: Vec<u8>,
    trainer_id: Vec<u8>,
    day_of_week: i64,
    specific_date: Option<String>,
    start_time: String,
    end_time: String,
    is_recurring: bool,
    updated: String,
    update_version: Vec<u8>,
}

impl TryFrom<&AvailabilitySlotDb> for AvailabilitySlotEntity {
    type Error = DaoError;
    fn try_from(slot: &AvailabilitySlotDb) -> Result<Self, Self::Error> {
        let day_number = u8::try_from(slot.day_of_week)
            .map_err(|_| DaoError::InvalidDayOfWeek(u8::MAX))?;
        Ok(Self {
            id: Uuid::from_slice(&slot.id)?,
            trainer_id: Uuid::from_slice(&slot.trainer_id)?,
            day_of_week: DayOfWeek::try_from_number(day_number)
                .map_err(|_| DaoError::InvalidDayOfWeek(day_number))?,
            specific_date: slot
                .specific_date
                .as_deref()
                .map(parse_date)
                .transpose()?,
            start_time: parse_time(&slot.start_time)?,
            end_time: parse_time(&slot.end_time)?,
            is_recurring: slot.is_recurring,
            updated: PrimitiveDateTime::parse(&slot.updated, &Iso8601::DATE_TIME)?,
            version: Uuid::from_slice(&slot.update_version)?,
        })
    }
}

pub struct AvailabilitySlotDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl AvailabilitySlotDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl AvailabilitySlotDao for AvailabilitySlotDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<AvailabilitySlotEntity>, DaoError> {
        let id_vec = id.as_bytes().to_vec();
        query_as::<_, AvailabilitySlotDb>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id_vec)
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(AvailabilitySlotEntity::try_from)
            .transpose()
    }

    async fn find_recurring_by_trainer(
        &self,
        trainer_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[AvailabilitySlotEntity]>, DaoError> {
        let trainer_id_vec = trainer_id.as_bytes().to_vec();
        query_as::<_, AvailabilitySlotDb>(&format!(
            "{SELECT_COLUMNS} WHERE trainer_id = ? AND specific_date IS NULL ORDER BY day_of_week, start_time"
        ))
        .bind(trainer_id_vec)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(AvailabilitySlotEntity::try_from)
        .collect::<Result<Arc<[AvailabilitySlotEntity]>, DaoError>>()
    }

    async fn find_recurring_by_key(
        &self,
        trainer_id: Uuid,
        day_of_week: DayOfWeek,
        start_time: Time,
        tx: Self::Transaction,
    ) -> Result<Option<AvailabilitySlotEntity>, DaoError> {
        let trainer_id_vec = trainer_id.as_bytes().to_vec();
        let start_time = format_time(start_time)?;
        query_as::<_, AvailabilitySlotDb>(&format!(
            "{SELECT_COLUMNS} WHERE trainer_id = ? AND day_of_week = ? AND start_time = ? AND specific_date IS NULL"
        ))
        .bind(trainer_id_vec)
        .bind(day_of_week.to_number() as i64)
        .bind(start_time)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(AvailabilitySlotEntity::try_from)
        .transpose()
    }

    async fn find_specific_by_trainer_and_range(
        &self,
        trainer_id: Uuid,
        from: Date,
        to: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[AvailabilitySlotEntity]>, DaoError> {
        let trainer_id_vec = trainer_id.as_bytes().to_vec();
        let from = format_date(from)?;
        let to = format_date(to)?;
        query_as::<_, AvailabilitySlotDb>(&format!(
            "{SELECT_COLUMNS} WHERE trainer_id = ? AND specific_date IS NOT NULL AND specific_date >= ? AND specific_date <= ? ORDER BY specific_date, start_time"
        ))
        .bind(trainer_id_vec)
        .bind(from)
        .bind(to)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(AvailabilitySlotEntity::try_from)
        .collect::<Result<Arc<[AvailabilitySlotEntity]>, DaoError>>()
    }

    async fn find_specific_by_key(
        &self,
        trainer_id: Uuid,
        specific_date: Date,
        start_time: Time,
        tx: Self::Transaction,
    ) -> Result<Option<AvailabilitySlotEntity>, DaoError> {
        let trainer_id_vec = trainer_id.as_bytes().to_vec();
        let specific_date = format_date(specific_date)?;
        let start_time = format_time(start_time)?;
        query_as::<_, AvailabilitySlotDb>(&format!(
            "{SELECT_COLUMNS} WHERE trainer_id = ? AND specific_date = ? AND start_time = ?"
        ))
        .bind(trainer_id_vec)
        .bind(specific_date)
        .bind(start_time)
        .fetch_optional(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .as_ref()
        .map(AvailabilitySlotEntity::try_from)
        .transpose()
    }

    async fn create(
        &self,
        entity: &AvailabilitySlotEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id_vec = entity.id.as_bytes().to_vec();
        let trainer_id_vec = entity.trainer_id.as_bytes().to_vec();
        let specific_date = entity.specific_date.map(format_date).transpose()?;
        let start_time = format_time(entity.start_time)?;
        let end_time = format_time(entity.end_time)?;
        let updated = entity.updated.format(&Iso8601::DATE_TIME)?;
        let version_vec = entity.version.as_bytes().to_vec();
        query("INSERT INTO availability_slot (id, trainer_id, day_of_week, specific_date, start_time, end_time, is_recurring, updated, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(id_vec)
            .bind(trainer_id_vec)
            .bind(entity.day_of_week.to_number() as i64)
            .bind(specific_date)
            .bind(start_time)
            .bind(end_time)
            .bind(entity.is_recurring)
            .bind(updated)
            .bind(version_vec)
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_unique_error("availability_slot")?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &AvailabilitySlotEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id_vec = entity.id.as_bytes().to_vec();
        let end_time = format_time(entity.end_time)?;
        let updated = entity.updated.format(&Iso8601::DATE_TIME)?;
        let version_vec = entity.version.as_bytes().to_vec();
        query("UPDATE availability_slot SET end_time = ?, updated = ?, update_version = ?, update_process = ? WHERE id = ?")
            .bind(end_time)
            .bind(updated)
            .bind(version_vec)
            .bind(process)
            .bind(id_vec)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, tx: Self::Transaction) -> Result<(), DaoError> {
        let id_vec = id.as_bytes().to_vec();
        query("DELETE FROM availability_slot WHERE id = ?")
            .bind(id_vec)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?;
        Ok(())
    }
}
