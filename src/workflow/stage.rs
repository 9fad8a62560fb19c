use crate::records::{ArticleRecord, LanguageCode, LanguageStatus, Role};
use crate::utils::{Result, WorkflowError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Where one article stands in one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Stage {
    NotScheduled,
    ToTranslate,
    AiTranslated,
    Reviewed,
    Approved,
}

impl Stage {
    /// The furthest stage whose flag is set.
    pub fn of(status: &LanguageStatus) -> Self {
        if status.approved {
            Stage::Approved
        } else if status.translation_reviewed {
            Stage::Reviewed
        } else if status.ai_translated {
            Stage::AiTranslated
        } else if status.to_be_translated {
            Stage::ToTranslate
        } else {
            Stage::NotScheduled
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::NotScheduled => "not scheduled",
            Stage::ToTranslate => "to translate",
            Stage::AiTranslated => "AI translated",
            Stage::Reviewed => "reviewed",
            Stage::Approved => "approved",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Transition {
    Translate,
    Review,
    Approve,
}

impl Transition {
    pub const ALL: [Transition; 3] = [Transition::Translate, Transition::Review, Transition::Approve];

    pub fn from_stage(&self) -> Stage {
        match self {
            Transition::Translate => Stage::ToTranslate,
            Transition::Review => Stage::AiTranslated,
            Transition::Approve => Stage::Reviewed,
        }
    }

    pub fn to_stage(&self) -> Stage {
        match self {
            Transition::Translate => Stage::AiTranslated,
            Transition::Review => Stage::Reviewed,
            Transition::Approve => Stage::Approved,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Transition::Translate => Role::Translator,
            Transition::Review => Role::Reviewer,
            Transition::Approve => Role::Approver,
        }
    }

    /// The transition a role performs on the generic dashboard. Admin approves.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Translator => Transition::Translate,
            Role::Reviewer => Transition::Review,
            Role::Approver | Role::Admin => Transition::Approve,
        }
    }

    /// Form button prefix on the article page: `translate_es`, `review_es`, ...
    pub fn verb(&self) -> &'static str {
        match self {
            Transition::Translate => "translate",
            Transition::Review => "review",
            Transition::Approve => "approve",
        }
    }

    pub fn from_verb(verb: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.verb() == verb)
    }

    pub fn allowed_for(&self, role: Role) -> bool {
        role.acts_as(self.role())
    }

    fn set_flags(&self, status: &mut LanguageStatus, username: &str) {
        match self {
            Transition::Translate => {
                status.ai_translated = true;
                status.to_be_translated = false;
            }
            Transition::Review => {
                status.translation_reviewed = true;
                status.translation_reviewed_by = username.to_string();
            }
            Transition::Approve => {
                status.approved = true;
                status.approved_by = username.to_string();
            }
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Checks that `transition` may run on `record` in `lang`. With `strict`,
/// the record must sit exactly at the transition's source stage.
pub fn check_transition(
    record: &ArticleRecord,
    lang: &LanguageCode,
    transition: Transition,
    strict: bool,
) -> Result<()> {
    let status = record.status(lang).ok_or_else(|| WorkflowError::InvalidTransition {
        id: record.id,
        lang: lang.to_string(),
        stage: "untracked".to_string(),
        transition: transition.to_string(),
    })?;

    let stage = Stage::of(status);
    if strict && stage != transition.from_stage() {
        return Err(WorkflowError::InvalidTransition {
            id: record.id,
            lang: lang.to_string(),
            stage: stage.to_string(),
            transition: transition.to_string(),
        });
    }
    Ok(())
}

/// Applies `transition` to every record in `ids`, or to none of them: all
/// ids are checked before any flag changes.
pub fn apply_transition(
    records: &mut [ArticleRecord],
    ids: &[u64],
    lang: &LanguageCode,
    transition: Transition,
    username: &str,
    strict: bool,
) -> Result<Vec<u64>> {
    let wanted: BTreeSet<u64> = ids.iter().copied().collect();

    for id in &wanted {
        let record = records
            .iter()
            .find(|r| r.id == *id)
            .ok_or(WorkflowError::NotFound(*id))?;
        check_transition(record, lang, transition, strict)?;
    }

    for record in records.iter_mut().filter(|r| wanted.contains(&r.id)) {
        if let Some(status) = record.status_mut(lang) {
            transition.set_flags(status, username);
        }
    }

    Ok(wanted.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn es() -> LanguageCode {
        LanguageCode::parse("es").unwrap()
    }

    fn record(id: u64, status: LanguageStatus) -> ArticleRecord {
        let mut r = ArticleRecord::new(id, "T");
        r.languages.insert(es(), status);
        r
    }

    fn to_translate() -> LanguageStatus {
        LanguageStatus {
            to_be_translated: true,
            ..Default::default()
        }
    }

    #[test]
    fn stage_is_the_furthest_flag() {
        assert_eq!(Stage::of(&LanguageStatus::default()), Stage::NotScheduled);
        assert_eq!(Stage::of(&to_translate()), Stage::ToTranslate);
        let skipped = LanguageStatus {
            to_be_translated: true,
            approved: true,
            ..Default::default()
        };
        assert_eq!(Stage::of(&skipped), Stage::Approved);
    }

    #[test]
    fn translate_flips_both_flags() {
        let mut records = vec![record(7, to_translate())];
        apply_transition(&mut records, &[7], &es(), Transition::Translate, "maria", true).unwrap();

        let status = records[0].status(&es()).unwrap();
        assert!(status.ai_translated);
        assert!(!status.to_be_translated);
        assert_eq!(Stage::of(status), Stage::AiTranslated);
    }

    #[test]
    fn review_and_approve_record_attribution() {
        let mut records = vec![record(7, to_translate())];
        let lang = es();
        apply_transition(&mut records, &[7], &lang, Transition::Translate, "maria", true).unwrap();
        apply_transition(&mut records, &[7], &lang, Transition::Review, "rosa", true).unwrap();
        apply_transition(&mut records, &[7], &lang, Transition::Approve, "ana", true).unwrap();

        let status = records[0].status(&lang).unwrap();
        assert_eq!(status.translation_reviewed_by, "rosa");
        assert_eq!(status.approved_by, "ana");
        assert_eq!(Stage::of(status), Stage::Approved);
    }

    #[test]
    fn strict_mode_rejects_skipped_stages_for_the_whole_batch() {
        let translated = LanguageStatus {
            ai_translated: true,
            ..Default::default()
        };
        let mut records = vec![record(1, translated.clone()), record(2, to_translate())];

        let err = apply_transition(&mut records, &[1, 2], &es(), Transition::Review, "rosa", true)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { id: 2, .. }));
        assert_eq!(records[0].status(&es()).unwrap(), &translated);
    }

    #[test]
    fn permissive_mode_allows_skipping() {
        let mut records = vec![record(2, to_translate())];
        apply_transition(&mut records, &[2], &es(), Transition::Approve, "ana", false).unwrap();
        assert!(records[0].status(&es()).unwrap().approved);
    }

    #[test]
    fn unknown_id_fails_before_any_change() {
        let mut records = vec![record(1, to_translate())];
        let err = apply_transition(&mut records, &[1, 99], &es(), Transition::Translate, "m", true)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(99)));
        assert!(!records[0].status(&es()).unwrap().ai_translated);
    }

    #[test]
    fn untracked_language_is_rejected_even_when_permissive() {
        let mut records = vec![record(1, to_translate())];
        let en = LanguageCode::parse("en").unwrap();
        assert!(apply_transition(&mut records, &[1], &en, Transition::Translate, "m", false).is_err());
    }

    #[test]
    fn roles_map_to_transitions() {
        assert_eq!(Transition::for_role(Role::Admin), Transition::Approve);
        assert!(Transition::Review.allowed_for(Role::Admin));
        assert!(!Transition::Approve.allowed_for(Role::Translator));
        assert_eq!(Transition::from_verb("review"), Some(Transition::Review));
        assert_eq!(Transition::from_verb("delete"), None);
    }
}
