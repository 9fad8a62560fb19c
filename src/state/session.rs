use crate::records::{LanguageCode, Role, User};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Error,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Info => "flash info",
            FlashLevel::Error => "flash error",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub role: Role,
    /// Working language; a translator may switch it.
    pub lang: LanguageCode,
    pub flash: Vec<Flash>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            lang: user.lang.clone(),
            flash: Vec::new(),
        }
    }

    pub fn user(&self) -> User {
        User {
            username: self.username.clone(),
            role: self.role,
            lang: self.lang.clone(),
        }
    }
}

/// Logged-in sessions keyed by the random id in the session cookie.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, session: Session) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(id.clone(), session);
        id
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> Option<Session> {
        self.sessions.write().await.remove(id)
    }

    pub async fn set_lang(&self, id: &str, lang: LanguageCode) -> bool {
        match self.sessions.write().await.get_mut(id) {
            Some(session) => {
                session.lang = lang;
                true
            }
            None => false,
        }
    }

    pub async fn push_flash(&self, id: &str, flash: Flash) {
        if let Some(session) = self.sessions.write().await.get_mut(id) {
            session.flash.push(flash);
        }
    }

    /// Returns the pending messages and clears them.
    pub async fn take_flash(&self, id: &str) -> Vec<Flash> {
        self.sessions
            .write()
            .await
            .get_mut(id)
            .map(|s| std::mem::take(&mut s.flash))
            .unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Finds the session id in a `Cookie` header value.
pub fn session_id_from_cookie(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maria() -> User {
        User {
            username: "maria".to_string(),
            role: Role::Translator,
            lang: LanguageCode::parse("es").unwrap(),
        }
    }

    #[tokio::test]
    async fn flash_is_shown_once() {
        let store = SessionStore::new();
        let id = store.create(Session::for_user(&maria())).await;

        store.push_flash(&id, Flash::info("Translated 1 article")).await;
        assert_eq!(store.take_flash(&id).await.len(), 1);
        assert!(store.take_flash(&id).await.is_empty());
    }

    #[tokio::test]
    async fn logout_forgets_the_session() {
        let store = SessionStore::new();
        let id = store.create(Session::for_user(&maria())).await;
        assert!(store.get(&id).await.is_some());

        store.remove(&id).await;
        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn language_switch_applies_to_the_session() {
        let store = SessionStore::new();
        let id = store.create(Session::for_user(&maria())).await;
        assert!(store.set_lang(&id, LanguageCode::parse("en").unwrap()).await);
        assert_eq!(store.get(&id).await.unwrap().lang.as_str(), "en");
        assert!(!store.set_lang("missing", LanguageCode::parse("en").unwrap()).await);
    }

    #[test]
    fn cookie_header_parsing() {
        assert_eq!(
            session_id_from_cookie("theme=dark; session_id=abc-123; other=1"),
            Some("abc-123")
        );
        assert_eq!(session_id_from_cookie("session_id="), None);
        assert_eq!(session_id_from_cookie("theme=dark"), None);
    }
}
