use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::booking::BookingStatus;
use crate::ServiceError;

/// Emitted after a booking was created or changed its status.
///
/// `from` is `None` for a newly created booking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingTransition {
    pub booking_id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub from: Option<BookingStatus>,
    pub to: BookingStatus,
    pub reason: Option<Arc<str>>,
}

#[automock]
#[async_trait]
pub trait BookingNotificationService {
    async fn notify(&self, transition: BookingTransition) -> Result<(), ServiceError>;
}
