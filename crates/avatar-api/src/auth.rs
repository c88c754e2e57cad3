//! Owner identity supplied by the upstream session layer.
//!
//! Authentication is not handled here. The gateway in front of this service
//! resolves the session and forwards the account as `X-Owner-Id` (UUID) and
//! `X-Owner-Name` (display name, optionally percent-encoded).

use crate::error::HttpAppError;
use avatar_core::{AppError, Owner, OwnerId};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub use avatar_core::constants::{OWNER_ID_HEADER, OWNER_NAME_HEADER};

/// The authenticated account making the request.
#[derive(Debug, Clone)]
pub struct OwnerContext(pub Owner);

impl<S> FromRequestParts<S> for OwnerContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw_id = parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Missing owner identity".to_string(),
                ))
            })?;

        let id: OwnerId = raw_id.trim().parse().map_err(|_| {
            HttpAppError(AppError::Unauthorized(
                "Owner identity is not a valid UUID".to_string(),
            ))
        })?;

        let name = parts
            .headers
            .get(OWNER_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(decode_name)
            .unwrap_or_default();

        Ok(OwnerContext(Owner::new(id, name)))
    }
}

/// Percent-decode a display name; names that are not valid encodings are used verbatim.
pub fn decode_name(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|name| name.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
