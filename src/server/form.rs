use crate::utils::{Result, WorkflowError};
use axum::body::Bytes;

/// A decoded `application/x-www-form-urlencoded` body. Keeps repeated
/// fields, which `axum::Form` into a map would collapse.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(key, _)| key.as_str())
    }

    /// Every value of `name` as an article id, in submission order without
    /// repeats.
    pub fn ids(&self, name: &str) -> Result<Vec<u64>> {
        let mut ids: Vec<u64> = Vec::new();
        for raw in self.all(name) {
            let id = raw.trim().parse().map_err(|_| {
                WorkflowError::MalformedRecord(format!("'{}' is not an article id", raw))
            })?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

impl From<Bytes> for FormFields {
    fn from(body: Bytes) -> Self {
        Self::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_ids_are_all_kept() {
        let form = FormFields::parse(b"articles=7&articles=12&articles=7&lang=es");
        assert_eq!(form.ids("articles").unwrap(), vec![7, 12]);
        assert_eq!(form.get("lang"), Some("es"));
        assert!(form.ids("missing").unwrap().is_empty());
    }

    #[test]
    fn all_values_of_a_field_borrowed_from_an_owned_name() {
        let form = FormFields::parse(b"articles=3&lang=es&articles=4");
        let name = String::from("articles");
        let values: Vec<&str> = form.all(&name).collect();
        assert_eq!(values, vec!["3", "4"]);
    }

    #[test]
    fn values_are_percent_decoded() {
        let form = FormFields::parse(b"username=mar%C3%ADa+p");
        assert_eq!(form.get("username"), Some("maría p"));
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let form = FormFields::parse(b"article_ids=7&article_ids=seven");
        assert!(form.ids("article_ids").is_err());
    }

    #[test]
    fn button_names_are_visible() {
        let form = FormFields::parse(b"review_es=");
        assert!(form.contains("review_es"));
        assert_eq!(form.names().collect::<Vec<_>>(), vec!["review_es"]);
    }
}
