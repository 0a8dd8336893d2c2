use async_trait::async_trait;
use mockall::automock;

use crate::{permission::Actor, ServiceError};

/// Resolves a request context to the acting user.
#[automock(type Context=();)]
#[async_trait]
pub trait IdentityService {
    type Context: Clone + PartialEq + Eq + std::fmt::Debug + Send + Sync + 'static;

    async fn current_actor(&self, context: Self::Context) -> Result<Actor, ServiceError>;
}
