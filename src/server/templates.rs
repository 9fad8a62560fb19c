//! HTML pages rendered with maud.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::records::{ArticleRecord, LanguageCode, Role};
use crate::state::{Flash, Session};
use crate::workflow::{check_transition, Stage, Transition};

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
header { display: flex; align-items: center; gap: 1rem; padding: .75rem 1.5rem; background: #f4f4f6; border-bottom: 1px solid #ddd; }
header h1 { font-size: 1.1rem; margin: 0; flex: 1; }
header .who { color: #666; font-size: .9rem; }
main { padding: 1.5rem; max-width: 960px; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .4rem .6rem; border-bottom: 1px solid #eee; }
td.num { font-variant-numeric: tabular-nums; width: 4rem; }
td.empty { color: #888; text-align: center; }
.flash { padding: .6rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
.flash.info { background: #e6f4ea; color: #1e4620; }
.flash.error { background: #fce8e6; color: #7a1c12; }
.badge { padding: .1rem .5rem; border-radius: 999px; font-size: .8rem; background: #eee; }
.badge.approved { background: #d2f0dc; }
.badge.reviewed { background: #dbe8fb; }
.badge.translated { background: #fff1c2; }
button { padding: .4rem .9rem; margin-top: 1rem; cursor: pointer; }
form.inline { display: inline; }
form.inline button { margin-top: 0; }
"#;

pub fn layout(title: &str, session: Option<&Session>, flash: &[Flash], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                header {
                    h1 { (title) }
                    @if let Some(session) = session {
                        span class="who" { (session.username) " · " (session.role.as_str()) " · " (session.lang.as_str()) }
                        a href="/dashboard" { "Dashboard" }
                        a href="/logout" { "Log out" }
                    }
                }
                main {
                    @for message in flash {
                        div class=(message.level.css_class()) { (message.message) }
                    }
                    (content)
                }
            }
        }
    }
}

pub fn login(error: Option<&str>) -> Markup {
    let content = html! {
        form method="post" action="/" {
            @if let Some(error) = error {
                div class="flash error" { (error) }
            }
            label {
                "Username "
                input type="text" name="username" autofocus required;
            }
            button type="submit" { "Log in" }
        }
    };
    layout("Translation review", None, &[], &content)
}

pub fn select_language(session: &Session, flash: &[Flash], languages: &[LanguageCode]) -> Markup {
    let content = html! {
        form method="post" action="/select_language" {
            label {
                "Working language "
                select name="language" {
                    @for lang in languages {
                        option value=(lang.as_str()) selected[*lang == session.lang] {
                            (lang.english_name()) " (" (lang.as_str()) ")"
                        }
                    }
                }
            }
            button type="submit" { "Continue" }
        }
    };
    layout("Select language", Some(session), flash, &content)
}

/// A selectable list of articles with one submit button.
pub struct QueuePage<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub field: &'a str,
    pub button: &'a str,
    pub lang: &'a LanguageCode,
    pub articles: &'a [ArticleRecord],
    /// What submitting the form applies.
    pub transition: Transition,
    /// With strict ordering, rows outside the transition's source stage
    /// are listed but cannot be ticked.
    pub strict: bool,
}

impl QueuePage<'_> {
    fn selectable(&self, article: &ArticleRecord) -> bool {
        check_transition(article, self.lang, self.transition, self.strict).is_ok()
    }
}

pub fn queue(page: &QueuePage<'_>, session: &Session, flash: &[Flash]) -> Markup {
    let content = html! {
        p { (page.articles.len()) " article(s) waiting in " (page.lang.english_name()) "." }
        form method="post" action=(page.action) {
            input type="hidden" name="lang" value=(page.lang.as_str());
            table {
                thead {
                    tr {
                        th {}
                        th { "ID" }
                        th { "Title" }
                        th { "Stage" }
                    }
                }
                tbody {
                    @for article in page.articles {
                        tr {
                            td {
                                @if page.selectable(article) {
                                    input type="checkbox" name=(page.field) value=(article.id);
                                }
                            }
                            td class="num" { (article.id) }
                            td { a href={"/article/" (article.id)} { (article.title) } }
                            td { (stage_badge(article, page.lang)) }
                        }
                    }
                    @if page.articles.is_empty() {
                        tr { td colspan="4" class="empty" { "Nothing to do" } }
                    }
                }
            }
            @if page.articles.iter().any(|a| page.selectable(a)) {
                button type="submit" { (page.button) }
            }
        }
    };
    layout(page.title, Some(session), flash, &content)
}

fn stage_badge(article: &ArticleRecord, lang: &LanguageCode) -> Markup {
    let stage = article.status(lang).map(Stage::of);
    let class = match stage {
        Some(Stage::Approved) => "badge approved",
        Some(Stage::Reviewed) => "badge reviewed",
        Some(Stage::AiTranslated) => "badge translated",
        _ => "badge",
    };
    html! {
        span class=(class) { (stage.map_or("untracked", |s| s.label())) }
    }
}

pub fn article(article: &ArticleRecord, session: &Session, flash: &[Flash]) -> Markup {
    let content = html! {
        h2 { (article.id) " · " (article.title) }
        table {
            thead {
                tr {
                    th { "Language" }
                    th { "Stage" }
                    th { "Reviewed by" }
                    th { "Approved by" }
                    th {}
                }
            }
            tbody {
                @for (lang, status) in &article.languages {
                    tr {
                        td { (lang.english_name()) " (" (lang.as_str()) ")" }
                        td { (stage_badge(article, lang)) }
                        td { (status.translation_reviewed_by) }
                        td { (status.approved_by) }
                        td {
                            form class="inline" method="post" action={"/article/" (article.id)} {
                                @for transition in Transition::ALL {
                                    @if transition.allowed_for(session.role) && Stage::of(status) < transition.to_stage() {
                                        button type="submit" name={(transition.verb()) "_" (lang.as_str())} {
                                            (transition.verb())
                                        }
                                        " "
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        @if let Some(content) = &article.content {
            details {
                summary { "Source text" }
                pre { (content) }
            }
        }
    };
    layout("Article", Some(session), flash, &content)
}

pub fn admin_dashboard(session: &Session, flash: &[Flash], languages: &[LanguageCode]) -> Markup {
    let content = html! {
        p { "Queues use your working language: " (session.lang.english_name()) "." }
        ul {
            li { a href="/translator_dashboard" { "Translate" } }
            li { a href="/reviewer_dashboard" { "Review" } }
            li { a href="/dashboard" { "Approve" } }
            li { a href="/select_language" { "Change working language" } }
        }
        p { "Configured languages: "
            @for (i, lang) in languages.iter().enumerate() {
                @if i > 0 { ", " }
                (lang.english_name())
            }
        }
    };
    layout("Administration", Some(session), flash, &content)
}

pub fn not_found(session: Option<&Session>, what: &str) -> Markup {
    let content = html! {
        p { (what) " was not found." }
        a href="/dashboard" { "Back to the dashboard" }
    };
    layout("Not found", session, &[], &content)
}

/// Where a freshly logged-in user lands.
pub fn home_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin_dashboard",
        Role::Translator => "/select_language",
        Role::Reviewer => "/reviewer_dashboard",
        Role::Approver => "/dashboard",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LanguageStatus;

    fn session(role: Role) -> Session {
        Session {
            username: "rosa".to_string(),
            role,
            lang: LanguageCode::parse("es").unwrap(),
            flash: Vec::new(),
        }
    }

    fn article_in_review() -> ArticleRecord {
        let mut article = ArticleRecord::new(7, "L'été <en> France");
        article.languages.insert(
            LanguageCode::parse("es").unwrap(),
            LanguageStatus {
                ai_translated: true,
                ..Default::default()
            },
        );
        article
    }

    #[test]
    fn titles_are_escaped() {
        let page = article(&article_in_review(), &session(Role::Reviewer), &[]).into_string();
        assert!(page.contains("L&#39;été &lt;en&gt; France") || page.contains("L'été &lt;en&gt; France"));
    }

    #[test]
    fn article_page_offers_only_the_role_actions() {
        let page = article(&article_in_review(), &session(Role::Reviewer), &[]).into_string();
        assert!(page.contains("name=\"review_es\""));
        assert!(!page.contains("name=\"approve_es\""));
        assert!(!page.contains("name=\"translate_es\""));
    }

    #[test]
    fn queue_lists_checkboxes_under_the_given_field() {
        let es = LanguageCode::parse("es").unwrap();
        let articles = vec![article_in_review()];
        let page = queue(
            &QueuePage {
                title: "Review",
                action: "/reviewer_dashboard",
                field: "articles",
                button: "Validate review",
                lang: &es,
                articles: &articles,
                transition: Transition::Review,
                strict: true,
            },
            &session(Role::Reviewer),
            &[Flash::error("No documents found for article 3")],
        )
        .into_string();
        assert!(page.contains("name=\"articles\" value=\"7\""));
        assert!(page.contains("No documents found for article 3"));
    }

    #[test]
    fn strict_queue_only_offers_rows_at_the_source_stage() {
        let es = LanguageCode::parse("es").unwrap();
        let mut untranslated = ArticleRecord::new(3, "Le ciel");
        untranslated.languages.insert(
            es.clone(),
            LanguageStatus {
                to_be_translated: true,
                ..Default::default()
            },
        );
        let articles = vec![untranslated, article_in_review()];
        let render = |strict| {
            queue(
                &QueuePage {
                    title: "Dashboard",
                    action: "/dashboard",
                    field: "article_ids",
                    button: "Mark selected",
                    lang: &es,
                    articles: &articles,
                    transition: Transition::Review,
                    strict,
                },
                &session(Role::Reviewer),
                &[],
            )
            .into_string()
        };

        let strict = render(true);
        assert!(strict.contains("value=\"7\""));
        assert!(!strict.contains("value=\"3\""));
        assert!(strict.contains("/article/3"));

        let permissive = render(false);
        assert!(permissive.contains("value=\"3\""));
    }

    #[test]
    fn no_button_when_nothing_can_be_ticked() {
        let es = LanguageCode::parse("es").unwrap();
        let articles = vec![article_in_review()];
        let page = queue(
            &QueuePage {
                title: "Dashboard",
                action: "/dashboard",
                field: "article_ids",
                button: "Mark selected",
                lang: &es,
                articles: &articles,
                transition: Transition::Approve,
                strict: true,
            },
            &session(Role::Approver),
            &[],
        )
        .into_string();
        assert!(!page.contains("Mark selected"));
        assert!(page.contains("/article/7"));
    }

    #[test]
    fn login_redirects_follow_the_role() {
        assert_eq!(home_for(Role::Admin), "/admin_dashboard");
        assert_eq!(home_for(Role::Translator), "/select_language");
        assert_eq!(home_for(Role::Approver), "/dashboard");
    }
}
