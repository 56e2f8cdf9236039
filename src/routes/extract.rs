//! Request extractors shared by the API handlers.

use axum::extract::rejection::{JsonRejection, StringRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tower_cookies::Cookies;

use crate::AppState;
use crate::constants::{ERR_SIGNED_OUT_ONLY, SESSION_COOKIE};
use crate::error::AppError;
use crate::session::{Identity, resolve_identity};

/// Session token carried by the request, if any.
///
/// Reads the jar set up by `CookieManagerLayer`.
async fn session_token<S>(parts: &mut Parts, state: &S) -> Result<Option<String>, AppError>
where
    S: Send + Sync,
{
    let cookies = Cookies::from_request_parts(parts, state)
        .await
        .map_err(|(_, message)| AppError::Cookies(message))?;

    Ok(cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string()))
}

/// The signed-in caller. Rejects with 401 when the session is missing,
/// unknown or expired.
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state).await?;
        let store = state.store.clone();

        let identity =
            tokio::task::spawn_blocking(move || resolve_identity(&store, token.as_deref()))
                .await?;

        if identity.is_err() {
            tracing::warn!(
                "Rejected unauthenticated {} {}",
                parts.method,
                parts.uri.path()
            );
        }

        identity
    }
}

/// Guard for routes only a signed-out caller may use.
///
/// Any non-empty session cookie counts as signed in, valid or not.
#[derive(Debug, Clone, Copy)]
pub struct SignedOut;

impl<S> FromRequestParts<S> for SignedOut
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match session_token(parts, state).await? {
            Some(token) if !token.is_empty() => {
                Err(AppError::Unauthorized(ERR_SIGNED_OUT_ONLY.to_string()))
            }
            _ => Ok(SignedOut),
        }
    }
}

/// `axum::Json` whose rejections use the service's `{error}` body
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::invalid(rejection.body_text())
}

/// Raw request body, kept byte for byte
#[derive(Debug, Clone, Default)]
pub struct RawBody(pub String);

impl<S> FromRequest<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        String::from_request(req, state)
            .await
            .map(RawBody)
            .map_err(string_rejection)
    }
}

fn string_rejection(rejection: StringRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::invalid(rejection.body_text())
}
