use mockall::automock;
use uuid::Uuid;

#[automock]
pub trait UuidService {
    /// `usage` names the purpose of the id and only serves mocking and tracing.
    fn new_uuid(&self, usage: &str) -> Uuid;
}
