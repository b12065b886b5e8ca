//! Question records: what to ask, how to validate it, and where it goes.
//!
//! A `Question` is a plain value. Asking one against a terminal lives in
//! `io::terminal::ask`; persisting the answer lives in `core::router`.

use crate::core::snapshot::EnvKey;

/// Persisted value of a "Yes" answer.
pub const YES: &str = "True";
/// Persisted value of a "No" answer.
pub const NO: &str = "False";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    FreeText,
    SingleChoice,
    YesNo,
    Secret,
}

/// Input predicates available to questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Rejects exactly one space; everything else (including blank) passes.
    NotSingleSpace,
    /// Rejects any `/`.
    NoSlash,
    /// Rejects any `,`.
    NoComma,
}

impl Validator {
    pub fn accepts(self, input: &str) -> bool {
        match self {
            Validator::NotSingleSpace => input != " ",
            Validator::NoSlash => !input.contains('/'),
            Validator::NoComma => !input.contains(','),
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Validator::NotSingleSpace => {
                "If you want to skip the question, enter a blank value (you currently have a space)"
            }
            Validator::NoSlash => "do not include 'https://' or any trailing '/'.",
            Validator::NoComma => "Please dont add commas",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub kind: QuestionKind,
    pub output_keys: Vec<EnvKey>,
    pub choices: Vec<String>,
    pub validator: Option<Validator>,
    pub validation_message: Option<String>,
    /// Prepended to the answer when persisted, never when returned.
    pub value_prefix: Option<String>,
    pub default: Option<String>,
}

impl Question {
    fn new(kind: QuestionKind, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            kind,
            output_keys: Vec::new(),
            choices: Vec::new(),
            validator: None,
            validation_message: None,
            value_prefix: None,
            default: None,
        }
    }

    pub fn text(prompt: impl Into<String>) -> Self {
        Self::new(QuestionKind::FreeText, prompt)
    }

    pub fn choice(prompt: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            choices,
            ..Self::new(QuestionKind::SingleChoice, prompt)
        }
    }

    pub fn yes_no(prompt: impl Into<String>) -> Self {
        Self::new(QuestionKind::YesNo, prompt)
    }

    pub fn secret(prompt: impl Into<String>) -> Self {
        Self::new(QuestionKind::Secret, prompt)
    }

    pub fn writes(mut self, key: EnvKey) -> Self {
        self.output_keys.push(key);
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.validation_message = Some(message.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.value_prefix = Some(prefix.into());
        self
    }

    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Validator actually applied: free text always guards against a lone space.
    pub fn effective_validator(&self) -> Option<Validator> {
        match (self.kind, self.validator) {
            (_, Some(validator)) => Some(validator),
            (QuestionKind::FreeText, None) => Some(Validator::NotSingleSpace),
            _ => None,
        }
    }

    /// Substitute the default for a blank answer. Only the empty string is blank.
    pub fn resolve_blank(&self, raw: &str) -> String {
        if raw.is_empty() {
            self.default.clone().unwrap_or_default()
        } else {
            raw.to_string()
        }
    }

    /// `Err(message)` when the validator rejects `input`.
    pub fn check(&self, input: &str) -> Result<(), String> {
        match self.effective_validator() {
            Some(validator) if !validator.accepts(input) => Err(self
                .validation_message
                .clone()
                .unwrap_or_else(|| validator.default_message().to_string())),
            _ => Ok(()),
        }
    }

    /// Index of the default among `choices`, if any.
    pub fn default_index(&self) -> Option<usize> {
        let default = self.default.as_deref()?;
        self.choices.iter().position(|choice| choice == default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_rejects_lone_space_only() {
        let question = Question::text("Name?");
        assert_eq!(
            question.check(" "),
            Err(Validator::NotSingleSpace.default_message().to_string())
        );
        assert!(question.check("").is_ok());
        assert!(question.check("  ").is_ok());
        assert!(question.check("a b").is_ok());
    }

    #[test]
    fn explicit_validator_replaces_implicit_one() {
        let question = Question::text("Domain?")
            .validate(Validator::NoSlash)
            .message("no slashes");
        assert_eq!(question.check("a/b"), Err("no slashes".to_string()));
        assert!(question.check(" ").is_ok());
    }

    #[test]
    fn secret_has_no_implicit_validator() {
        assert_eq!(Question::secret("Token?").effective_validator(), None);
        assert_eq!(Question::yes_no("Ok?").effective_validator(), None);
    }

    #[test]
    fn blank_resolves_to_default() {
        let question = Question::text("Port?").default("5678");
        assert_eq!(question.resolve_blank(""), "5678");
        assert_eq!(question.resolve_blank("80"), "80");
        assert_eq!(Question::text("x").resolve_blank(""), "");
    }

    #[test]
    fn default_index_finds_choice() {
        let question = Question::choice("Pick", vec!["a".into(), "b".into()]).default("b");
        assert_eq!(question.default_index(), Some(1));
        assert_eq!(
            Question::choice("Pick", vec!["a".into()]).default_index(),
            None
        );
    }

    #[test]
    fn comma_validator_uses_its_message() {
        let question = Question::text("Extensions?").validate(Validator::NoComma);
        assert_eq!(
            question.check("a,b"),
            Err("Please dont add commas".to_string())
        );
    }
}
