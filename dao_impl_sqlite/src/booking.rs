use std::sync::Arc;

use crate::{
    format_date, format_time, parse_date, parse_time, ResultDbErrorExt, ResultUniqueErrorExt,
    TransactionImpl,
};
use async_trait::async_trait;
use dao::{
    booking::{BookingDao, BookingEntity, BookingStatusEntity, SessionTypeEntity},
    DaoError,
};
use sqlx::{query, query_as};
use time::{format_description::well_known::Iso8601, Date, PrimitiveDateTime};
use tracing::debug;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "SELECT id, client_id, trainer_id, booking_date, start_time, end_time, duration_minutes, session_type, hourly_rate_cents, total_price_cents, client_notes, trainer_notes, cancellation_reason, status, created, updated, update_version FROM booking";

#[derive(Debug, sqlx::FromRow)]
struct BookingDb {
    id: Vec<u8>,
    client_id: Vec<u8>,
    trainer_id: Vec<u8>,
    booking_date: String,
    start_time: String,
    end_time: String,
    duration_minutes: i64,
    session_type: String,
    hourly_rate_cents: i64,
    total_price_cents: i64,
    client_notes: Option<String>,
    trainer_notes: Option<String>,
    cancellation_reason: Option<String>,
    status: String,
    created: String,
    updated: String,
    update_version: Vec<u8>,
}

impl TryFrom<&BookingDb> for BookingEntity {
    type Error = DaoError;
    fn try_from(booking: &BookingDb) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::from_slice(&booking.id)?,
            client_id: Uuid::from_slice(&booking.client_id)?,
            trainer_id: Uuid::from_slice(&booking.trainer_id)?,
            booking_date: parse_date(&booking.booking_date)?,
            start_time: parse_time(&booking.start_time)?,
            end_time: parse_time(&booking.end_time)?,
            duration_minutes: booking.duration_minutes.max(0) as u32,
            session_type: SessionTypeEntity::parse(&booking.session_type)?,
            hourly_rate_cents: booking.hourly_rate_cents,
            total_price_cents: booking.total_price_cents,
            client_notes: booking.client_notes.as_deref().map(Arc::from),
            trainer_notes: booking.trainer_notes.as_deref().map(Arc::from),
            cancellation_reason: booking.cancellation_reason.as_deref().map(Arc::from),
            status: BookingStatusEntity::parse(&booking.status)?,
            created: PrimitiveDateTime::parse(&booking.created, &Iso8601::DATE_TIME)?,
            updated: PrimitiveDateTime::parse(&booking.updated, &Iso8601::DATE_TIME)?,
            version: Uuid::from_slice(&booking.update_version)?,
        })
    }
}

pub struct BookingDaoImpl {
    pub _pool: Arc<sqlx::SqlitePool>,
}
impl BookingDaoImpl {
    pub fn new(pool: Arc<sqlx::SqlitePool>) -> Self {
        Self { _pool: pool }
    }
}

#[async_trait]
impl BookingDao for BookingDaoImpl {
    type Transaction = TransactionImpl;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<BookingEntity>, DaoError> {
        let id_vec = id.as_bytes().to_vec();
        query_as::<_, BookingDb>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id_vec)
            .fetch_optional(tx.tx.lock().await.as_mut())
            .await
            .map_db_error()?
            .as_ref()
            .map(BookingEntity::try_from)
            .transpose()
    }

    async fn find_active_by_trainer_and_date(
        &self,
        trainer_id: Uuid,
        booking_date: Date,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let trainer_id_vec = trainer_id.as_bytes().to_vec();
        let booking_date = format_date(booking_date)?;
        query_as::<_, BookingDb>(&format!(
            "{SELECT_COLUMNS} WHERE trainer_id = ? AND booking_date = ? AND status IN ('pending', 'confirmed') ORDER BY start_time"
        ))
        .bind(trainer_id_vec)
        .bind(booking_date)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(BookingEntity::try_from)
        .collect::<Result<Arc<[BookingEntity]>, DaoError>>()
    }

    async fn find_by_trainer(
        &self,
        trainer_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let trainer_id_vec = trainer_id.as_bytes().to_vec();
        query_as::<_, BookingDb>(&format!(
            "{SELECT_COLUMNS} WHERE trainer_id = ? ORDER BY booking_date, start_time"
        ))
        .bind(trainer_id_vec)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(BookingEntity::try_from)
        .collect::<Result<Arc<[BookingEntity]>, DaoError>>()
    }

    async fn find_by_client(
        &self,
        client_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let client_id_vec = client_id.as_bytes().to_vec();
        query_as::<_, BookingDb>(&format!(
            "{SELECT_COLUMNS} WHERE client_id = ? ORDER BY booking_date, start_time"
        ))
        .bind(client_id_vec)
        .fetch_all(tx.tx.lock().await.as_mut())
        .await
        .map_db_error()?
        .iter()
        .map(BookingEntity::try_from)
        .collect::<Result<Arc<[BookingEntity]>, DaoError>>()
    }

    async fn create(
        &self,
        entity: &BookingEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id_vec = entity.id.as_bytes().to_vec();
        let client_id_vec = entity.client_id.as_bytes().to_vec();
        let trainer_id_vec = entity.trainer_id.as_bytes().to_vec();
        let booking_date = format_date(entity.booking_date)?;
        let start_time = format_time(entity.start_time)?;
        let end_time = format_time(entity.end_time)?;
        let created = entity.created.format(&Iso8601::DATE_TIME)?;
        let updated = entity.updated.format(&Iso8601::DATE_TIME)?;
        let version_vec = entity.version.as_bytes().to_vec();
        query("INSERT INTO booking (id, client_id, trainer_id, booking_date, start_time, end_time, duration_minutes, session_type, hourly_rate_cents, total_price_cents, client_notes, trainer_notes, cancellation_reason, status, created, updated, update_version, update_process) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(id_vec)
            .bind(client_id_vec)
            .bind(trainer_id_vec)
            .bind(booking_date)
            .bind(start_time)
            .bind(end_time)
            .bind(entity.duration_minutes as i64)
            .bind(entity.session_type.as_str())
            .bind(entity.hourly_rate_cents)
            .bind(entity.total_price_cents)
            .bind(entity.client_notes.as_deref())
            .bind(entity.trainer_notes.as_deref())
            .bind(entity.cancellation_reason.as_deref())
            .bind(entity.status.as_str())
            .bind(created)
            .bind(updated)
            .bind(version_vec)
            .bind(process)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_unique_error("booking_active_slot")?;
        Ok(())
    }

    async fn update(
        &self,
        entity: &BookingEntity,
        previous_version: Uuid,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError> {
        let id_vec = entity.id.as_bytes().to_vec();
        let updated = entity.updated.format(&Iso8601::DATE_TIME)?;
        let version_vec = entity.version.as_bytes().to_vec();
        let previous_version_vec = previous_version.as_bytes().to_vec();
        let result = query("UPDATE booking SET status = ?, client_notes = ?, trainer_notes = ?, cancellation_reason = ?, updated = ?, update_version = ?, update_process = ? WHERE id = ? AND update_version = ?")
            .bind(entity.status.as_str())
            .bind(entity.client_notes.as_deref())
            .bind(entity.trainer_notes.as_deref())
            .bind(entity.cancellation_reason.as_deref())
            .bind(updated)
            .bind(version_vec)
            .bind(process)
            .bind(id_vec)
            .bind(previous_version_vec)
            .execute(tx.tx.lock().await.as_mut())
            .await
            .map_unique_error("booking_active_slot")?;
        if result.rows_affected() == 0 {
            debug!("Booking {} was not updated, version {} is stale", entity.id, previous_version);
            return Err(DaoError::VersionConflict(entity.id));
        }
        Ok(())
    }
}
