pub mod collections;
pub mod extract;
pub mod flashcards;
pub mod health;
pub mod subcollections;
pub mod users;

pub use health::health_check;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method, header, header::InvalidHeaderValue},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Serialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;

use crate::AppState;
use crate::constants::{ERR_EXPECTED_JSON, MAX_LAYERS_SIZE_BYTES};
use crate::error::AppError;
use crate::models::{Success, Update};

/// Build the full application router: `/health`, the `/api` tree, the JSON
/// 404 fallback, the cookie jar and CORS for the configured frontend origin.
pub fn router(state: AppState) -> Result<Router, InvalidHeaderValue> {
    let cors = cors_layer(&state.config.frontend_origin)?;

    let api = Router::new()
        .route("/users", post(users::create_user))
        .route("/users/login", post(users::login))
        .route("/users/logout", get(users::logout))
        .route(
            "/users/self",
            get(users::get_self)
                .patch(users::update_self)
                .delete(users::delete_self),
        )
        .route("/users/self/password", patch(users::update_self_password))
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route(
            "/collections/{col_id}",
            get(collections::get_collection)
                .patch(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route(
            "/collections/{col_id}/flashcards",
            get(collections::get_collection_flashcards).post(flashcards::create_flashcard),
        )
        .route(
            "/collections/{col_id}/subcollections",
            post(subcollections::create_sub_collection),
        )
        .route(
            "/collections/{col_id}/subcollections/{sub_col_id}",
            get(subcollections::get_sub_collection)
                .patch(subcollections::update_sub_collection)
                .delete(subcollections::delete_sub_collection),
        )
        .route(
            "/collections/{col_id}/subcollections/{sub_col_id}/flashcards",
            post(flashcards::create_flashcard),
        );
    let api = flashcard_routes(api, "/collections/{col_id}/flashcards");
    let api = flashcard_routes(
        api,
        "/collections/{col_id}/subcollections/{sub_col_id}/flashcards",
    )
    .layer(middleware::from_fn(require_json));

    Ok(Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .fallback(not_found)
        .layer(CookieManagerLayer::new())
        .layer(cors)
        .with_state(state))
}

/// Per-card routes below a flashcard listing path
fn flashcard_routes(router: Router<AppState>, base: &str) -> Router<AppState> {
    router
        .route(
            &format!("{base}/{{card_id}}"),
            delete(flashcards::delete_flashcard),
        )
        .route(
            &format!("{base}/{{card_id}}/preview"),
            get(flashcards::get_flashcard_preview),
        )
        .route(
            &format!("{base}/{{card_id}}/title"),
            patch(flashcards::update_flashcard_title),
        )
        .route(
            &format!("{base}/{{card_id}}/layers"),
            get(flashcards::get_flashcard_layers)
                .patch(flashcards::update_flashcard_layers)
                .layer(DefaultBodyLimit::max(MAX_LAYERS_SIZE_BYTES)),
        )
}

/// CORS for a single credentialed origin
fn cors_layer(frontend_origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(frontend_origin.parse::<HeaderValue>()?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE])
        .vary([header::ORIGIN]))
}

/// Reject bodies that are not declared as JSON. Only GET (and CORS preflight)
/// may omit the header.
async fn require_json(request: Request, next: Next) -> Response {
    let method = request.method();
    if method == Method::GET || method == Method::OPTIONS {
        return next.run(request).await;
    }

    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if !is_json {
        tracing::debug!("Rejected {} {} without JSON content type", method, request.uri().path());
        return AppError::invalid(ERR_EXPECTED_JSON).into_response();
    }

    next.run(request).await
}

async fn not_found() -> AppError {
    AppError::not_found("Not found")
}

/// The updated entity, or `{success: true, message: "<what> unchanged"}`
pub(crate) fn updated<T: Serialize>(update: Update<T>, what: &str) -> Response {
    match update {
        Update::Changed(entity) => Json(entity).into_response(),
        Update::Unchanged => Json(Success::unchanged(what)).into_response(),
    }
}
