//! Viewer identity extraction.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user id in `X-User-Id`.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;

const VIEWER_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Copy)]
pub struct Viewer(pub Uuid);

impl FromRequest for Viewer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parsed = req
            .headers()
            .get(VIEWER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Uuid>().ok());

        ready(match parsed {
            Some(id) => Ok(Viewer(id)),
            None => Err(AppError::Unauthorized("missing user context".to_string())),
        })
    }
}
