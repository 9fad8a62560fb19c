//! The review web app: login, role dashboards and the article page.

pub mod context;
pub mod form;
pub mod handlers;
pub mod templates;

use crate::state::AppState;
use axum::{routing::get, Router};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route(
            "/select_language",
            get(handlers::select_language_page).post(handlers::select_language),
        )
        .route(
            "/translator_dashboard",
            get(handlers::translator_dashboard).post(handlers::translate_selected),
        )
        .route(
            "/reviewer_dashboard",
            get(handlers::reviewer_dashboard).post(handlers::review_selected),
        )
        .route(
            "/dashboard",
            get(handlers::dashboard).post(handlers::mark_selected),
        )
        .route(
            "/article/:id",
            get(handlers::article_page).post(handlers::article_action),
        )
        .route("/admin_dashboard", get(handlers::admin_dashboard))
        .route("/health", get(handlers::health))
        .with_state(state)
}
