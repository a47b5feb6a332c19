//! Caller identity extraction.
//!
//! Token issuance and verification belong to the auth collaborator in front
//! of this service; by the time a request reaches us, the gateway has
//! verified the token and forwarded the subject in the `x-user-id` header.
//! Absent or malformed identity fails the whole request with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

/// Header carrying the verified caller identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub UserId);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("Missing caller identity".to_string()))?;

        let user_id = header
            .parse::<UserId>()
            .map_err(|_| ApiError::Unauthenticated("Invalid caller identity".to_string()))?;

        Ok(Caller(user_id))
    }
}
