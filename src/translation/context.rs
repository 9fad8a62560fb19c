use crate::records::LanguageCode;
use crate::translation::client::CompletionRequest;
use crate::utils::config::TranslationDefaults;

const SYSTEM_PROMPT: &str = "You are a bilingual translator.";

/// Language pair and sampling settings shared by every request of a batch.
#[derive(Debug, Clone)]
pub struct TranslationContext {
    pub source: LanguageCode,
    pub target: LanguageCode,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl TranslationContext {
    pub fn new(source: LanguageCode, target: LanguageCode) -> Self {
        Self {
            source,
            target,
            temperature: 0.0,
            max_tokens: 4000,
        }
    }

    pub fn with_defaults(mut self, defaults: &TranslationDefaults) -> Self {
        self.temperature = defaults.temperature;
        self.max_tokens = defaults.max_tokens;
        self
    }

    pub fn build_prompt(&self, text: &str) -> String {
        format!(
            "Translate the following article from {} to {}. Return only the translation, without any additional text or comments.\n\nOriginal article:\n{}\n",
            self.source.english_name(),
            self.target.english_name(),
            text
        )
    }

    pub fn request(&self, text: &str) -> CompletionRequest {
        CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: self.build_prompt(text),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_both_languages() {
        let context = TranslationContext::new(
            LanguageCode::parse("fr").unwrap(),
            LanguageCode::parse("es").unwrap(),
        );
        let request = context.request("Bonjour");
        assert_eq!(request.system, SYSTEM_PROMPT);
        assert!(request.user.starts_with("Translate the following article from French to Spanish."));
        assert!(request.user.ends_with("Original article:\nBonjour\n"));
        assert_eq!(request.max_tokens, 4000);
    }
}
