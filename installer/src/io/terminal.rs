//! Terminal prompting.
//!
//! The [`Terminal`] trait decouples the wizard from the actual console
//! (dialoguer). Tests use a scripted terminal that replays canned answers.

use anyhow::{Context, Result, anyhow, bail};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::core::question::{NO, Question, QuestionKind, YES};

/// Four prompt primitives plus plain output.
pub trait Terminal {
    /// Read one line of free text. `default` is only a display hint.
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String>;
    /// Pick one of `choices`, returning its index.
    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<usize>;
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
    /// Read masked input.
    fn secret(&self, prompt: &str) -> Result<String>;
    fn notice(&self, message: &str);
}

/// Interactive console backed by dialoguer.
pub struct DialoguerTerminal {
    theme: ColorfulTheme,
}

impl DialoguerTerminal {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for DialoguerTerminal {
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string()).show_default(true);
        }
        input.interact_text().context("read text answer")
    }

    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(choices)
            .default(default)
            .interact()
            .context("read selection")
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("read confirmation")
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .context("read secret answer")
    }

    fn notice(&self, message: &str) {
        println!("{message}");
    }
}

/// Ask `question` until it validates and return the resolved raw answer.
///
/// Blank free text resolves to the question's default before validation.
/// There is no retry cap; a closed input stream is the only way out besides
/// a valid answer.
pub fn ask<T: Terminal + ?Sized>(terminal: &T, question: &Question) -> Result<String> {
    match question.kind {
        QuestionKind::FreeText => loop {
            let raw = terminal.text(&question.prompt, question.default.as_deref())?;
            let resolved = question.resolve_blank(&raw);
            match question.check(&resolved) {
                Ok(()) => return Ok(resolved),
                Err(message) => terminal.notice(&message),
            }
        },
        QuestionKind::SingleChoice => {
            if question.choices.is_empty() {
                bail!("question {:?} has no choices", question.prompt);
            }
            let default = question.default_index().unwrap_or(0);
            let index = terminal.select(&question.prompt, &question.choices, default)?;
            question
                .choices
                .get(index)
                .cloned()
                .ok_or_else(|| anyhow!("selection {index} out of range for {:?}", question.prompt))
        }
        QuestionKind::YesNo => {
            let answer = terminal.confirm(&question.prompt, true)?;
            Ok(if answer { YES } else { NO }.to_string())
        }
        QuestionKind::Secret => loop {
            let raw = terminal.secret(&question.prompt)?;
            match question.check(&raw) {
                Ok(()) => return Ok(raw),
                Err(message) => terminal.notice(&message),
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::question::Validator;
    use crate::test_support::{Reply, ScriptedTerminal};

    #[test]
    fn lone_space_is_reprompted() {
        let terminal = ScriptedTerminal::new([Reply::text(" "), Reply::text("value")]);
        let answer = ask(&terminal, &Question::text("Name?")).expect("ask");
        assert_eq!(answer, "value");
        assert_eq!(
            terminal.notices(),
            vec![Validator::NotSingleSpace.default_message().to_string()]
        );
    }

    #[test]
    fn blank_takes_default() {
        let terminal = ScriptedTerminal::new([Reply::text("")]);
        let answer = ask(&terminal, &Question::text("Port?").default("16")).expect("ask");
        assert_eq!(answer, "16");
    }

    #[test]
    fn yes_no_defaults_to_true() {
        let terminal = ScriptedTerminal::accepting_defaults();
        let answer = ask(&terminal, &Question::yes_no("Ok?")).expect("ask");
        assert_eq!(answer, YES);
    }

    #[test]
    fn choice_returns_label_verbatim() {
        let question = Question::choice("Pick", vec!["one".into(), "two".into()]);
        let terminal = ScriptedTerminal::new([Reply::pick("two")]);
        assert_eq!(ask(&terminal, &question).expect("ask"), "two");
    }

    #[test]
    fn validator_message_repeats_until_valid() {
        let question = Question::text("Domain?")
            .validate(Validator::NoSlash)
            .message("no slash");
        let terminal = ScriptedTerminal::new([
            Reply::text("https://a.com"),
            Reply::text("a.com/"),
            Reply::text("a.com"),
        ]);
        assert_eq!(ask(&terminal, &question).expect("ask"), "a.com");
        assert_eq!(terminal.notices().len(), 2);
    }

    #[test]
    fn closed_input_is_fatal() {
        let terminal = ScriptedTerminal::new([]);
        let err = ask(&terminal, &Question::text("Name?")).expect_err("closed");
        assert!(err.to_string().contains("input stream closed"));
    }
}
