use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::AppState;
use crate::controllers::users;
use crate::error::Result;
use crate::models::{
    CredentialsRequest, SelfView, Success, Update, UpdatePasswordRequest, UpdateUserRequest,
};
use crate::routes::extract::{JsonBody, SignedOut};
use crate::session::{Identity, NewSession, removal_cookie, session_cookie};

/// `{id, username}` with the session cookie set
fn signed_in(session: NewSession, cookies: &Cookies) -> Json<SelfView> {
    cookies.add(session_cookie(session.token));
    Json(session.user)
}

/// Create an account and sign it in
///
/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    _: SignedOut,
    cookies: Cookies,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<Json<SelfView>> {
    let store = state.store.clone();
    let session = tokio::task::spawn_blocking(move || users::create(&store, payload)).await??;

    Ok(signed_in(session, &cookies))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    _: SignedOut,
    cookies: Cookies,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<Json<SelfView>> {
    let store = state.store.clone();
    let session = tokio::task::spawn_blocking(move || users::login(&store, payload)).await??;

    Ok(signed_in(session, &cookies))
}

/// End the current session only
///
/// GET /api/users/logout
pub async fn logout(
    State(state): State<AppState>,
    identity: Identity,
    cookies: Cookies,
) -> Result<Json<Success>> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || users::logout(&store, &identity)).await??;

    cookies.remove(removal_cookie());
    Ok(Json(Success::new()))
}

/// GET /api/users/self
pub async fn get_self(identity: Identity) -> Json<SelfView> {
    Json(users::get_self(&identity))
}

/// Rename the caller; the session cookie is rotated on change
///
/// PATCH /api/users/self
pub async fn update_self(
    State(state): State<AppState>,
    identity: Identity,
    cookies: Cookies,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Response> {
    let store = state.store.clone();
    let update =
        tokio::task::spawn_blocking(move || users::update_self(&store, &identity, payload))
            .await??;

    Ok(match update {
        Update::Changed(session) => signed_in(session, &cookies).into_response(),
        Update::Unchanged => Json(Success::unchanged("Username")).into_response(),
    })
}

/// PATCH /api/users/self/password
pub async fn update_self_password(
    State(state): State<AppState>,
    identity: Identity,
    cookies: Cookies,
    JsonBody(payload): JsonBody<UpdatePasswordRequest>,
) -> Result<Json<Success>> {
    let store = state.store.clone();
    let update = tokio::task::spawn_blocking(move || {
        users::update_self_password(&store, &identity, payload)
    })
    .await??;

    Ok(Json(match update {
        Update::Changed(session) => {
            cookies.add(session_cookie(session.token));
            Success::new()
        }
        Update::Unchanged => Success::unchanged("Password"),
    }))
}

/// Delete the caller's account, collections, sub-collections and flashcards
///
/// DELETE /api/users/self
pub async fn delete_self(
    State(state): State<AppState>,
    identity: Identity,
    cookies: Cookies,
) -> Result<Json<Success>> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || users::delete_self(&store, &identity)).await??;

    cookies.remove(removal_cookie());
    Ok(Json(Success::new()))
}
