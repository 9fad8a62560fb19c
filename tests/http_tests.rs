//! The web app served on a local port and driven over HTTP.

mod common;

use common::{fixture, Fixture};
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::sync::Arc;
use translation_review::{create_router, AppState, InMemoryStore};

struct App {
    base: String,
    client: Client,
    store: Arc<InMemoryStore>,
    _dir: tempfile::TempDir,
}

async fn spawn_app() -> App {
    let Fixture {
        dir,
        config,
        store,
        service,
        ..
    } = fixture();

    let router = create_router(AppState::new(config, service));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    App {
        base: format!("http://{}", addr),
        client: Client::builder().redirect(Policy::none()).build().unwrap(),
        store,
        _dir: dir,
    }
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

impl App {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn login(&self, username: &str) -> (String, String) {
        let response = self
            .client
            .post(self.url("/"))
            .form(&[("username", username)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        (session_cookie(&response), location(&response).to_string())
    }

    async fn get(&self, path: &str, cookie: &str) -> Response {
        self.client
            .get(self.url(path))
            .header(COOKIE, cookie)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, cookie: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header(COOKIE, cookie)
            .form(form)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn login_routes_each_role_to_its_page() {
    let app = spawn_app().await;

    assert_eq!(app.login("maria").await.1, "/select_language");
    assert_eq!(app.login("rosa").await.1, "/reviewer_dashboard");
    assert_eq!(app.login("ana").await.1, "/dashboard");
    assert_eq!(app.login("root").await.1, "/admin_dashboard");
}

#[tokio::test]
async fn unknown_user_sees_the_login_page_again() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(app.url("/"))
        .form(&[("username", "mallory")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Unknown user."));
}

#[tokio::test]
async fn pages_require_a_session_and_the_right_role() {
    let app = spawn_app().await;

    let anonymous = app.client.get(app.url("/translator_dashboard")).send().await.unwrap();
    assert_eq!(location(&anonymous), "/");

    let (rosa, _) = app.login("rosa").await;
    let wrong_role = app.get("/translator_dashboard", &rosa).await;
    assert_eq!(location(&wrong_role), "/");

    let (root, _) = app.login("root").await;
    assert_eq!(app.get("/translator_dashboard", &root).await.status(), StatusCode::OK);
    assert_eq!(app.get("/reviewer_dashboard", &root).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn translator_flow_over_http() {
    let app = spawn_app().await;
    let (maria, _) = app.login("maria").await;

    let chosen = app.post("/select_language", &maria, &[("language", "es")]).await;
    assert_eq!(location(&chosen), "/translator_dashboard");

    let queue = app.get("/translator_dashboard", &maria).await.text().await.unwrap();
    assert!(queue.contains("value=\"7\""));
    assert!(queue.contains("value=\"8\""));

    let submitted = app
        .post("/translator_dashboard", &maria, &[("lang", "es"), ("articles", "7")])
        .await;
    assert_eq!(location(&submitted), "/translator_dashboard");

    let after = app.get("/translator_dashboard", &maria).await.text().await.unwrap();
    assert!(after.contains("Translated 1 article(s)"));
    assert!(!after.contains("value=\"7\""));
    assert!(after.contains("value=\"8\""));
    assert_eq!(app.store.names_in("staging-es").len(), 2);

    let again = app.get("/translator_dashboard", &maria).await.text().await.unwrap();
    assert!(!again.contains("Translated 1 article(s)"));
}

#[tokio::test]
async fn reviewer_is_told_about_articles_without_documents() {
    let app = spawn_app().await;
    let (rosa, _) = app.login("rosa").await;

    app.post("/reviewer_dashboard", &rosa, &[("lang", "es"), ("articles", "9")])
        .await;
    let page = app.get("/reviewer_dashboard", &rosa).await.text().await.unwrap();

    assert!(page.contains("No documents found for article(s) 9"));
    assert!(page.contains("value=\"9\""));
}

#[tokio::test]
async fn article_page_applies_the_pressed_button() {
    let app = spawn_app().await;
    let (rosa, _) = app.login("rosa").await;

    let page = app.get("/article/9", &rosa).await.text().await.unwrap();
    assert!(page.contains("name=\"review_es\""));

    let response = app.post("/article/9", &rosa, &[("review_es", "")]).await;
    assert_eq!(location(&response), "/dashboard");

    let page = app.get("/article/9", &rosa).await.text().await.unwrap();
    assert!(page.contains("badge reviewed"));
    assert!(!page.contains("name=\"review_es\""));
}

/// Values of every `article_ids` checkbox on a dashboard page.
fn ticked_ids(page: &str) -> Vec<String> {
    page.split("name=\"article_ids\" value=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn approver_can_submit_every_offered_checkbox() {
    let app = spawn_app().await;
    let (maria, _) = app.login("maria").await;
    let (rosa, _) = app.login("rosa").await;
    let (ana, _) = app.login("ana").await;

    app.post("/translator_dashboard", &maria, &[("lang", "es"), ("articles", "8")])
        .await;
    app.post("/reviewer_dashboard", &rosa, &[("lang", "es"), ("articles", "8")])
        .await;

    let page = app.get("/dashboard", &ana).await.text().await.unwrap();
    assert!(page.contains("/article/7"));
    let offered = ticked_ids(&page);
    assert_eq!(offered, vec!["8"]);

    let mut form = vec![("lang", "es")];
    form.extend(offered.iter().map(|id| ("article_ids", id.as_str())));
    app.post("/dashboard", &ana, &form).await;

    let after = app.get("/dashboard", &ana).await.text().await.unwrap();
    assert!(after.contains("1 article(s) updated."));
    assert!(!after.contains("/article/8"));
}

#[tokio::test]
async fn unknown_article_is_a_404() {
    let app = spawn_app().await;
    let (ana, _) = app.login("ana").await;
    assert_eq!(app.get("/article/999", &ana).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = spawn_app().await;
    let (ana, _) = app.login("ana").await;
    assert_eq!(app.get("/dashboard", &ana).await.status(), StatusCode::OK);

    let response = app.get("/logout", &ana).await;
    assert_eq!(location(&response), "/");
    assert_eq!(location(&app.get("/dashboard", &ana).await), "/");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app().await;
    let body: serde_json::Value = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}
