use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::MockTransaction;
use fitbook_utils::DayOfWeek;
use mockall::automock;
use time::{Date, Time};
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

/// Generates one date-specific slot per matching date and sub-slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkAvailabilityRequest {
    pub trainer_id: Uuid,
    pub start_date: Date,
    pub end_date: Date,
    pub weekdays: Arc<[DayOfWeek]>,
    pub start_time: Time,
    pub end_time: Time,
    pub slot_duration_minutes: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BulkResult {
    pub success_count: u32,
    pub failure_count: u32,
}

impl BulkResult {
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    pub fn total(&self) -> u32 {
        self.success_count + self.failure_count
    }
}

/// Bulk operations never fail as a whole once they started creating slots.
/// Each creation runs in its own transaction, failures are only counted.
#[automock(type Context=(); type Transaction=MockTransaction;)]
#[async_trait]
pub trait AvailabilityBulkService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    async fn bulk_create(
        &self,
        request: &BulkAvailabilityRequest,
        context: Authentication<Self::Context>,
    ) -> Result<BulkResult, ServiceError>;

    /// Replays the slots of the week starting at `source_week_start` onto the
    /// dates with the same weekday in the week starting at `target_week_start`.
    async fn copy_week(
        &self,
        trainer_id: Uuid,
        source_week_start: Date,
        target_week_start: Date,
        context: Authentication<Self::Context>,
    ) -> Result<BulkResult, ServiceError>;
}
