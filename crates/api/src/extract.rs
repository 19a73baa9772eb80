//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sentinelle_core::types::DbId;

use crate::error::AppError;

/// Header carrying the id of the user performing a mutation.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The user on whose behalf a mutating request runs.
///
/// Authentication happens upstream; this only reads the resolved id from
/// the `X-Actor-Id` header and rejects requests without a positive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing X-Actor-Id header".into()))?;

        match raw.trim().parse::<DbId>() {
            Ok(user_id) if user_id > 0 => Ok(Actor { user_id }),
            _ => Err(AppError::BadRequest(format!(
                "Invalid X-Actor-Id header: {raw}"
            ))),
        }
    }
}
