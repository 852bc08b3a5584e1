//! User confirmation prompts.

use crate::error::Result;
use dialoguer::Confirm;

/// Asks the user yes/no questions.
pub trait Prompter {
    /// Returns `true` without asking when `skip` is set.
    fn confirm(&self, skip: bool, question: String) -> Result<bool>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, question: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Ok(Confirm::new().with_prompt(question).default(false).interact()?)
    }
}
