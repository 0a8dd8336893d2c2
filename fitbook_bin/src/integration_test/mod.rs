use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use service::booking::{Booking, BookingStatus, SessionType};
use service::config::Config;
use service::permission::{Actor, Authentication};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use time::macros::{date, time};
use time::{Date, Time};
use uuid::{uuid, Uuid};

use crate::RestStateImpl;

mod availability;
mod booking;
mod rest_api;

pub struct TestSetup {
    pub pool: Arc<SqlitePool>,
    pub rest_state: RestStateImpl,
    database_file: Option<PathBuf>,
}

impl TestSetup {
    pub async fn new() -> Self {
        // A single connection which never expires keeps the in-memory
        // database alive for the whole test.
        let pool = Arc::new(
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
                .expect("Could not open in-memory database"),
        );
        Self::with_pool(pool, None).await
    }

    /// Database file in the temp directory behind a pool with several
    /// connections, the way the binary opens its database.
    pub async fn file_backed() -> Self {
        let path =
            std::env::temp_dir().join(format!("fitbook-test-{}.sqlite3", Uuid::new_v4()));
        let pool = Arc::new(
            SqlitePoolOptions::new()
                .max_connections(4)
                .connect(&format!("sqlite:{}?mode=rwc", path.display()))
                .await
                .expect("Could not open database file"),
        );
        Self::with_pool(pool, Some(path)).await
    }

    async fn with_pool(pool: Arc<SqlitePool>, database_file: Option<PathBuf>) -> Self {
        sqlx::migrate!("../migrations/sqlite")
            .run(pool.as_ref())
            .await
            .expect("Failed to run migrations");
        let rest_state = RestStateImpl::with_config(
            pool.clone(),
            Config {
                bulk_create_delay: Duration::ZERO,
                max_range_days: 62,
            },
        );
        Self {
            pool,
            rest_state,
            database_file,
        }
    }
}

impl Drop for TestSetup {
    fn drop(&mut self) {
        if let Some(path) = &self.database_file {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub fn trainer_id() -> Uuid {
    uuid!("1B0A4C1E-3D6E-4F35-9C4B-7F0E2A7D1C11")
}

pub fn client_id() -> Uuid {
    uuid!("7E3C1D2A-5B4F-4E6A-8D9C-0A1B2C3D4E5F")
}

pub fn other_client_id() -> Uuid {
    uuid!("C4D1E6F2-0A9B-4C3D-8E7F-112233445566")
}

pub fn as_trainer() -> Authentication<Actor> {
    Actor::trainer(trainer_id()).into()
}

pub fn as_client() -> Authentication<Actor> {
    Actor::client(client_id()).into()
}

pub fn as_other_client() -> Authentication<Actor> {
    Actor::client(other_client_id()).into()
}

/// 2024-06-03 is a Monday.
pub const MONDAY: Date = date!(2024 - 06 - 03);

pub fn booking_request(client_id: Uuid, from: Time, to: Time) -> Booking {
    let duration_minutes = ((to - from).whole_minutes()) as u32;
    Booking {
        id: Uuid::nil(),
        client_id,
        trainer_id: trainer_id(),
        booking_date: MONDAY,
        start_time: from,
        end_time: to,
        duration_minutes,
        session_type: SessionType::InPerson,
        hourly_rate_cents: 6000,
        total_price_cents: 6000 * duration_minutes as i64 / 60,
        client_notes: None,
        trainer_notes: None,
        cancellation_reason: None,
        status: BookingStatus::Pending,
        created: None,
        updated: None,
        version: Uuid::nil(),
    }
}

/// Declares Monday 09:00-10:00, 10:00-11:00 and 11:00-12:00 as recurring.
pub async fn declare_monday_morning(setup: &TestSetup) {
    use fitbook_utils::DayOfWeek;
    use rest::RestStateDef;
    use service::availability::AvailabilityService;

    for (from, to) in [
        (time!(09:00), time!(10:00)),
        (time!(10:00), time!(11:00)),
        (time!(11:00), time!(12:00)),
    ] {
        setup
            .rest_state
            .availability_service()
            .set_availability_slot(trainer_id(), DayOfWeek::Monday, from, to, None, as_trainer(), None)
            .await
            .unwrap();
    }
}
