use tracing::trace;
use uuid::Uuid;

pub struct UuidServiceImpl;

impl service::uuid_service::UuidService for UuidServiceImpl {
    fn new_uuid(&self, usage: &str) -> Uuid {
        let uuid = Uuid::new_v4();
        trace!("New uuid {uuid} for {usage}");
        uuid
    }
}
