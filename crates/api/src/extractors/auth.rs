use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use intervue_services::Identity;
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Default, Deserialize)]
struct HandshakeParams {
    token: Option<String>,
}

/// The verified user opening a socket. Rejects with 401 before any upgrade.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = handshake_token(parts);
        let identity = state.identity.authenticate(token.as_deref()).await?;
        Ok(AuthUser(identity))
    }
}

/// `?token=` first, then `Authorization: Bearer`, then the `access_token` cookie.
fn handshake_token(parts: &Parts) -> Option<String> {
    Query::<HandshakeParams>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(params)| params.token)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|s| s.to_string())
        })
        .or_else(|| {
            parts
                .headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .strip_prefix("access_token=")
                            .map(|s| s.to_string())
                    })
                })
        })
}
