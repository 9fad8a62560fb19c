use crate::records::{Role, User};
use crate::state::session::session_id_from_cookie;
use crate::state::{AppState, Flash, Session};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, HeaderMap};
use axum::http::request::Parts;
use axum::response::Redirect;

/// The logged-in user behind a request. Requests without a live session are
/// sent back to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub session_id: String,
    pub session: Session,
}

impl CurrentUser {
    pub fn user(&self) -> User {
        self.session.user()
    }

    pub fn role(&self) -> Role {
        self.session.role
    }

    /// Wrong-role access goes to the login page like a missing session.
    pub fn require(self, role: Role) -> std::result::Result<Self, Redirect> {
        if self.session.role.acts_as(role) {
            Ok(self)
        } else {
            Err(Redirect::to("/"))
        }
    }

    pub async fn flash(&self, state: &AppState, flash: Flash) {
        state.sessions.push_flash(&self.session_id, flash).await;
    }

    pub async fn take_flash(&self, state: &AppState) -> Vec<Flash> {
        state.sessions.take_flash(&self.session_id).await
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session_id_from_cookie)
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let session_id = session_id(&parts.headers).ok_or_else(|| Redirect::to("/"))?;
        let session = state
            .sessions
            .get(&session_id)
            .await
            .ok_or_else(|| Redirect::to("/"))?;
        Ok(Self {
            session_id,
            session,
        })
    }
}
