use std::fmt::Debug;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ServiceError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication<Context: Clone + PartialEq + Eq + Send + Sync + Debug + 'static> {
    Full,
    Context(Context),
}
impl<Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static> From<Context>
    for Authentication<Context>
{
    fn from(context: Context) -> Self {
        Self::Context(context)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Client,
    Trainer,
}

/// The user on whose behalf a call is made.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn trainer(id: Uuid) -> Self {
        Self {
            id,
            role: ActorRole::Trainer,
        }
    }

    pub fn client(id: Uuid) -> Self {
        Self {
            id,
            role: ActorRole::Client,
        }
    }

    pub fn is_trainer(&self, trainer_id: Uuid) -> bool {
        self.role == ActorRole::Trainer && self.id == trainer_id
    }
}

/// Authorization checks.
///
/// `Authentication::Full` passes every check and has no actor.
#[automock(type Context=();)]
#[async_trait]
pub trait PermissionService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn current_actor(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Option<Actor>, ServiceError>;

    /// Succeeds if the actor is the trainer with the given id.
    async fn check_trainer(
        &self,
        trainer_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;

    /// Succeeds if the actor is the user with the given id, regardless of the role.
    async fn check_user(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;
}
