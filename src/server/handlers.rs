//! HTTP handlers for the review web app.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use tracing::{debug, error, info, warn};

use super::context::{session_id, CurrentUser};
use super::form::FormFields;
use super::templates::{self, home_for, QueuePage};
use crate::records::{LanguageCode, Role};
use crate::state::session::{expired_session_cookie, session_cookie};
use crate::state::{AppState, Flash, Session};
use crate::utils::{Result, WorkflowError};
use crate::workflow::Transition;

type Page = std::result::Result<Response, Redirect>;

const NOTHING_SELECTED: &str = "No article selected.";

/// One of the three article queues.
struct Board {
    title: &'static str,
    path: &'static str,
    field: &'static str,
    button: &'static str,
}

const TRANSLATOR_BOARD: Board = Board {
    title: "Translation queue",
    path: "/translator_dashboard",
    field: "articles",
    button: "Translate selected",
};

const REVIEWER_BOARD: Board = Board {
    title: "Review queue",
    path: "/reviewer_dashboard",
    field: "articles",
    button: "Validate review",
};

const DASHBOARD: Board = Board {
    title: "Dashboard",
    path: "/dashboard",
    field: "article_ids",
    button: "Mark selected",
};

fn html(markup: maud::Markup) -> Response {
    Html(markup.into_string()).into_response()
}

fn failure(context: &str, e: WorkflowError) -> Flash {
    warn!(error = %e, "{}", context);
    Flash::error(e.to_string())
}

/// The language a form was rendered for, else the session's working one.
/// Either way it must be a configured language.
fn working_lang(state: &AppState, user: &CurrentUser, form: Option<&FormFields>) -> Result<LanguageCode> {
    let code = form
        .and_then(|f| f.get("lang"))
        .unwrap_or_else(|| user.session.lang.as_str());
    state.workflow.language(code)
}

/// Language and selected ids of a batch form; `None` when nothing is ticked.
fn batch_input(
    state: &AppState,
    user: &CurrentUser,
    form: &FormFields,
    field: &str,
) -> Result<Option<(LanguageCode, Vec<u64>)>> {
    let lang = working_lang(state, user, Some(form))?;
    let ids = form.ids(field)?;
    if ids.is_empty() {
        return Ok(None);
    }
    Ok(Some((lang, ids)))
}

async fn render_queue(
    state: &AppState,
    user: &CurrentUser,
    board: &Board,
    queue: Role,
    transition: Transition,
) -> Response {
    let lang = match working_lang(state, user, None) {
        Ok(lang) => lang,
        Err(e) => {
            user.flash(state, failure("Working language not usable", e)).await;
            return Redirect::to("/select_language").into_response();
        }
    };

    let flash = user.take_flash(state).await;
    match state.workflow.queue(queue, &lang) {
        Ok(articles) => html(templates::queue(
            &QueuePage {
                title: board.title,
                action: board.path,
                field: board.field,
                button: board.button,
                lang: &lang,
                articles: &articles,
                transition,
                strict: state.workflow.strict_transitions(),
            },
            &user.session,
            &flash,
        )),
        Err(e) => {
            error!(error = %e, "Failed to load the record store");
            let page = templates::layout(
                board.title,
                Some(&user.session),
                &[Flash::error(e.to_string())],
                &maud::html! {},
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
        }
    }
}

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        if let Some(session) = state.sessions.get(&id).await {
            return Redirect::to(home_for(session.role)).into_response();
        }
    }
    html(templates::login(None))
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> Response {
    let form = FormFields::from(body);
    let username = form.get("username").unwrap_or("");

    match state.workflow.authenticate(username) {
        Ok(user) => {
            let id = state.sessions.create(Session::for_user(&user)).await;
            let active = state.sessions.len().await;
            debug!(active_sessions = active, "Session created");
            (
                [(header::SET_COOKIE, session_cookie(&id))],
                Redirect::to(home_for(user.role)),
            )
                .into_response()
        }
        Err(WorkflowError::AuthenticationFailed(name)) => {
            info!(username = %name, "Rejected login");
            (
                StatusCode::UNAUTHORIZED,
                Html(templates::login(Some("Unknown user.")).into_string()),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to read the user table");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::login(Some(&e.to_string())).into_string()),
            )
                .into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        if let Some(session) = state.sessions.remove(&id).await {
            info!(username = %session.username, "User logged out");
        }
    }
    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn select_language_page(State(state): State<AppState>, user: CurrentUser) -> Response {
    let flash = user.take_flash(&state).await;
    html(templates::select_language(
        &user.session,
        &flash,
        state.workflow.languages(),
    ))
}

pub async fn select_language(State(state): State<AppState>, user: CurrentUser, body: Bytes) -> Response {
    let form = FormFields::from(body);
    let code = form.get("language").unwrap_or("");

    match state.workflow.language(code) {
        Ok(lang) => {
            state.sessions.set_lang(&user.session_id, lang).await;
            let next = match user.role() {
                Role::Translator => TRANSLATOR_BOARD.path,
                other => home_for(other),
            };
            Redirect::to(next).into_response()
        }
        Err(e) => {
            user.flash(&state, failure("Language selection rejected", e)).await;
            Redirect::to("/select_language").into_response()
        }
    }
}

pub async fn translator_dashboard(State(state): State<AppState>, user: CurrentUser) -> Page {
    let user = user.require(Role::Translator)?;
    Ok(render_queue(&state, &user, &TRANSLATOR_BOARD, Role::Translator, Transition::Translate).await)
}

/// Translates, exports, then marks the selection translated.
pub async fn translate_selected(State(state): State<AppState>, user: CurrentUser, body: Bytes) -> Page {
    let user = user.require(Role::Translator)?;
    let form = FormFields::from(body);

    let flash = match batch_input(&state, &user, &form, TRANSLATOR_BOARD.field) {
        Ok(None) => Flash::info(NOTHING_SELECTED),
        Ok(Some((lang, ids))) => match state.workflow.translate_batch(&user.user(), &lang, &ids).await {
            Ok(outcome) => Flash::info(format!(
                "Translated {} article(s). {} document(s) created, {} already present.",
                outcome.translated.len(),
                outcome.created_documents,
                outcome.skipped_documents
            )),
            Err(e) => failure("Translation batch failed", e),
        },
        Err(e) => failure("Translation batch rejected", e),
    };

    user.flash(&state, flash).await;
    Ok(Redirect::to(TRANSLATOR_BOARD.path).into_response())
}

pub async fn reviewer_dashboard(State(state): State<AppState>, user: CurrentUser) -> Page {
    let user = user.require(Role::Reviewer)?;
    Ok(render_queue(&state, &user, &REVIEWER_BOARD, Role::Reviewer, Transition::Review).await)
}

/// Moves the selection's documents to the reviewed folder and marks the ids
/// that had documents.
pub async fn review_selected(State(state): State<AppState>, user: CurrentUser, body: Bytes) -> Page {
    let user = user.require(Role::Reviewer)?;
    let form = FormFields::from(body);

    let mut flash = Vec::new();
    match batch_input(&state, &user, &form, REVIEWER_BOARD.field) {
        Ok(None) => flash.push(Flash::info(NOTHING_SELECTED)),
        Ok(Some((lang, ids))) => match state.workflow.review_batch(&user.user(), &lang, &ids).await {
            Ok(outcome) => {
                if !outcome.reviewed.is_empty() {
                    flash.push(Flash::info(format!(
                        "Review recorded for {} article(s); {} document(s) moved.",
                        outcome.reviewed.len(),
                        outcome.moved_documents
                    )));
                }
                if !outcome.without_documents.is_empty() {
                    let ids: Vec<String> = outcome.without_documents.iter().map(u64::to_string).collect();
                    flash.push(Flash::error(format!(
                        "No documents found for article(s) {}; left unreviewed.",
                        ids.join(", ")
                    )));
                }
            }
            Err(e) => flash.push(failure("Review batch failed", e)),
        },
        Err(e) => flash.push(failure("Review batch rejected", e)),
    }

    for message in flash {
        user.flash(&state, message).await;
    }
    Ok(Redirect::to(REVIEWER_BOARD.path).into_response())
}

pub async fn dashboard(State(state): State<AppState>, user: CurrentUser) -> Response {
    let role = user.role();
    render_queue(&state, &user, &DASHBOARD, role, Transition::for_role(role)).await
}

/// Applies the session role's transition without touching the gateways.
pub async fn mark_selected(State(state): State<AppState>, user: CurrentUser, body: Bytes) -> Response {
    let form = FormFields::from(body);

    let flash = match batch_input(&state, &user, &form, DASHBOARD.field) {
        Ok(None) => Flash::info(NOTHING_SELECTED),
        Ok(Some((lang, ids))) => match state.workflow.mark_batch(&user.user(), &lang, &ids) {
            Ok(marked) => Flash::info(format!("{} article(s) updated.", marked.len())),
            Err(e) => failure("Marking rejected", e),
        },
        Err(e) => failure("Marking rejected", e),
    };

    user.flash(&state, flash).await;
    Redirect::to(DASHBOARD.path).into_response()
}

pub async fn article_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> Response {
    match state.workflow.article(id) {
        Ok(article) => {
            let flash = user.take_flash(&state).await;
            html(templates::article(&article, &user.session, &flash))
        }
        Err(WorkflowError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Html(templates::not_found(Some(&user.session), &format!("Article {}", id)).into_string()),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, article_id = id, "Failed to load article");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// The pressed button is named `{verb}_{lang}`.
fn requested_action(state: &AppState, form: &FormFields) -> Result<Option<(Transition, LanguageCode)>> {
    for name in form.names() {
        if let Some((verb, code)) = name.split_once('_') {
            if let Some(transition) = Transition::from_verb(verb) {
                return Ok(Some((transition, state.workflow.language(code)?)));
            }
        }
    }
    Ok(None)
}

pub async fn article_action(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    body: Bytes,
) -> Response {
    let form = FormFields::from(body);

    let flash = match requested_action(&state, &form) {
        Ok(Some((transition, lang))) => {
            match state.workflow.article_action(&user.user(), id, &lang, transition) {
                Ok(_) => Flash::info(format!("Article {}: {} recorded in {}.", id, transition, lang)),
                Err(WorkflowError::NotFound(_)) => {
                    return (
                        StatusCode::NOT_FOUND,
                        Html(templates::not_found(Some(&user.session), &format!("Article {}", id)).into_string()),
                    )
                        .into_response();
                }
                Err(e) => failure("Article action rejected", e),
            }
        }
        Ok(None) => Flash::error("No action selected."),
        Err(e) => failure("Article action rejected", e),
    };

    user.flash(&state, flash).await;
    Redirect::to(DASHBOARD.path).into_response()
}

pub async fn admin_dashboard(State(state): State<AppState>, user: CurrentUser) -> Page {
    let user = user.require(Role::Admin)?;
    let flash = user.take_flash(&state).await;
    Ok(html(templates::admin_dashboard(
        &user.session,
        &flash,
        state.workflow.languages(),
    )))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": state.config.server.name,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{DocumentExporter, InMemoryStore};
    use crate::translation::{MockProvider, TranslationGateway};
    use crate::utils::AppConfig;
    use crate::workflow::WorkflowService;
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::sync::Arc;

    fn state() -> AppState {
        let config = AppConfig::default();
        let workflow = WorkflowService::new(
            &config,
            TranslationGateway::new(Arc::new(MockProvider::working())),
            DocumentExporter::new(Arc::new(InMemoryStore::new()), BTreeMap::new()),
        )
        .unwrap();
        AppState::new(config, workflow)
    }

    fn assert_send<F: Future + Send>(_: &F) {}

    #[test]
    fn session_handlers_can_run_on_a_multithreaded_runtime() {
        let state = state();
        assert_send(&login(State(state.clone()), Bytes::from_static(b"username=maria")));
        assert_send(&logout(State(state.clone()), HeaderMap::new()));
        assert_send(&login_page(State(state), HeaderMap::new()));
    }
}
