use std::sync::Arc;

use async_trait::async_trait;
use service::identity::IdentityService;
use service::permission::{Actor, Authentication};
use service::ServiceError;
use uuid::Uuid;

pub struct PermissionServiceImpl<IdentityService>
where
    IdentityService: service::identity::IdentityService + Send + Sync,
{
    identity_service: Arc<IdentityService>,
}
impl<IdentityService> PermissionServiceImpl<IdentityService>
where
    IdentityService: service::identity::IdentityService + Send + Sync,
{
    pub fn new(identity_service: Arc<IdentityService>) -> Self {
        Self { identity_service }
    }
}

#[async_trait]
impl<Identity> service::PermissionService for PermissionServiceImpl<Identity>
where
    Identity: IdentityService + Send + Sync,
{
    type Context = Identity::Context;

    async fn current_actor(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Option<Actor>, ServiceError> {
        match context {
            Authentication::Full => Ok(None),
            Authentication::Context(context) => {
                Ok(Some(self.identity_service.current_actor(context).await?))
            }
        }
    }

    async fn check_trainer(
        &self,
        trainer_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        match self.current_actor(context).await? {
            None => Ok(()),
            Some(actor) if actor.is_trainer(trainer_id) => Ok(()),
            Some(_) => Err(ServiceError::Forbidden),
        }
    }

    async fn check_user(
        &self,
        user_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        match self.current_actor(context).await? {
            None => Ok(()),
            Some(actor) if actor.id == user_id => Ok(()),
            Some(_) => Err(ServiceError::Forbidden),
        }
    }
}
