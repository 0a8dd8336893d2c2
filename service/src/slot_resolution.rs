use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use dao::MockTransaction;
use fitbook_utils::TimeWindow;
use mockall::automock;
use time::Date;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[automock(type Context=(); type Transaction=MockTransaction;)]
#[async_trait]
pub trait SlotResolutionService {
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;
    type Transaction: dao::Transaction;

    /// Declared windows of the date which no active booking intersects,
    /// ordered by start time.
    async fn get_available_slots(
        &self,
        trainer_id: Uuid,
        date: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[TimeWindow]>, ServiceError>;
}
