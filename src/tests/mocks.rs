//! Mock implementations for testing

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::clipboard::ClipboardSink;
use crate::error::{ForgeError, Result};
use crate::prompt::Prompter;

#[derive(Debug, Clone)]
enum Answer {
    Text(String),
    Confirm(bool),
    Choice(usize),
}

/// Prompter that replays a fixed script of answers
///
/// Panics when asked a question of a different kind than the next scripted
/// answer, or when the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    notices: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text answer; an empty answer takes the prompt's default
    pub fn answer(self, text: &str) -> Self {
        self.push(Answer::Text(text.to_string()))
    }

    pub fn confirm_with(self, value: bool) -> Self {
        self.push(Answer::Confirm(value))
    }

    pub fn choose(self, index: usize) -> Self {
        self.push(Answer::Choice(index))
    }

    fn push(self, answer: Answer) -> Self {
        self.answers.lock().unwrap().push_back(answer);
        self
    }

    fn next(&self, prompt: &str) -> Answer {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer for prompt {:?}", prompt))
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.lock().unwrap().is_empty()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    /// Every prompt shown, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        match self.next(prompt) {
            Answer::Text(text) if text.is_empty() => {
                Ok(default.map(str::to_string).unwrap_or_default())
            }
            Answer::Text(text) => Ok(text),
            other => panic!("expected text for {:?}, scripted {:?}", prompt, other),
        }
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next(prompt) {
            Answer::Confirm(value) => Ok(value),
            other => panic!("expected confirm for {:?}, scripted {:?}", prompt, other),
        }
    }

    fn select(&self, prompt: &str, items: &[String], _default: usize) -> Result<usize> {
        match self.next(prompt) {
            Answer::Choice(index) if index < items.len() => Ok(index),
            other => panic!("expected choice for {:?}, scripted {:?}", prompt, other),
        }
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

/// Clipboard that records what was copied
#[derive(Debug, Clone, Default)]
pub struct MockClipboard {
    pub copied: Arc<Mutex<Vec<String>>>,
    pub unavailable: bool,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Vec<String> {
        self.copied.lock().unwrap().clone()
    }
}

impl ClipboardSink for MockClipboard {
    async fn copy(&self, text: &str) -> Result<()> {
        if self.unavailable {
            return Err(ForgeError::clipboard("mock clipboard unavailable"));
        }
        self.copied.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
