use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::StatusCode;
use service::permission::{Actor, ActorRole};
use tracing::debug;
use uuid::Uuid;

use crate::text_response;

/// The acting user, as asserted by the authenticating gateway.
pub type Context = Actor;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

fn actor_from_request(request: &Request) -> Option<Actor> {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
    };
    let id = Uuid::parse_str(header(ACTOR_ID_HEADER)?).ok()?;
    let role = match header(ACTOR_ROLE_HEADER)? {
        "trainer" => ActorRole::Trainer,
        "client" => ActorRole::Client,
        _ => return None,
    };
    Some(Actor { id, role })
}

pub async fn context_extractor(mut request: Request, next: Next) -> Response {
    match actor_from_request(&request) {
        Some(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        None => {
            debug!(path = %request.uri().path(), "Rejected request without valid actor headers");
            text_response(StatusCode::UNAUTHORIZED, "Missing or invalid actor".into())
        }
    }
}
