//! Interactive prompts
//!
//! Commands ask for values the user did not pass as flags. Prompting goes
//! through the [`Prompter`] trait so it can be disabled (`--no-prompt`, or
//! stdin is not a terminal) and scripted in tests.

use anyhow::{Context, Result, bail};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, MultiSelect, Select};

/// Source of answers for interactive questions
pub trait Prompter: Send + Sync {
    /// Pick one of `options`
    ///
    /// `flag` names the command line flag that would have answered the
    /// question, used in errors when prompting is not possible.
    fn select(&self, message: &str, flag: &str, options: &[String]) -> Result<String>;

    /// Pick any number of `options`
    fn multi_select(&self, message: &str, flag: &str, options: &[String]) -> Result<Vec<String>>;

    /// Ask a yes/no question
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Prompts on the terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, message: &str, flag: &str, options: &[String]) -> Result<String> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact()
            .with_context(|| format!("Failed to read selection for --{}", flag))?;

        Ok(options[index].clone())
    }

    fn multi_select(&self, message: &str, flag: &str, options: &[String]) -> Result<Vec<String>> {
        let indices = MultiSelect::with_theme(&self.theme)
            .with_prompt(message)
            .items(options)
            .interact()
            .with_context(|| format!("Failed to read selection for --{}", flag))?;

        Ok(indices.into_iter().map(|i| options[i].clone()).collect())
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()
            .context("Failed to read confirmation")
    }
}

/// Answers without asking
///
/// Single choices fail naming the missing flag, multiple choices select
/// nothing and confirmations take their default.
pub struct DisabledPrompter;

impl Prompter for DisabledPrompter {
    fn select(&self, message: &str, flag: &str, _options: &[String]) -> Result<String> {
        bail!("missing required flag --{} ({})", flag, message.trim_end_matches('?'))
    }

    fn multi_select(&self, _message: &str, _flag: &str, _options: &[String]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn confirm(&self, _message: &str, default: bool) -> Result<bool> {
        Ok(default)
    }
}
