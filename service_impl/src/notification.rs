use async_trait::async_trait;
use service::notification::{BookingNotificationService, BookingTransition};
use service::ServiceError;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Logs booking transitions and publishes them to all subscribers.
///
/// Subscribers which fall behind by more than the channel capacity lose the
/// oldest events.
pub struct BookingNotificationServiceImpl {
    sender: broadcast::Sender<BookingTransition>,
}

impl BookingNotificationServiceImpl {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BookingTransition> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl BookingNotificationService for BookingNotificationServiceImpl {
    async fn notify(&self, transition: BookingTransition) -> Result<(), ServiceError> {
        info!(
            booking_id = %transition.booking_id,
            trainer_id = %transition.trainer_id,
            client_id = %transition.client_id,
            from = ?transition.from,
            to = %transition.to,
            "Booking transition"
        );
        match self.sender.send(transition) {
            Ok(receivers) => debug!("Booking transition sent to {receivers} subscribers"),
            Err(_) => debug!("No subscriber for booking transitions"),
        }
        Ok(())
    }
}
