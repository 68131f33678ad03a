//! Interactive decision points for `gen` and `keys`
//!
//! Services only talk to the [`Prompter`] trait, so the flows here can be
//! driven by a scripted prompter in tests.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::claims::{ClaimEntry, EntryState, DEFAULT_ISSUER, DEFAULT_SUBJECT};
use crate::error::Result;
use crate::expiration::{ExpirationSpec, Preset, TimeUnit};
use crate::key::KeyPaths;

/// Terminal question capability
pub trait Prompter {
    /// Free text; an empty answer is returned as-is when there is no default
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Index into `items`
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Report a rejected answer before asking again
    fn notice(&self, message: &str);
}

/// `dialoguer` prompts on the controlling terminal
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?)
    }

    fn notice(&self, message: &str) {
        write_notice(&mut console::Term::stderr(), message);
    }
}

/// Notices are advisory; a failed write is logged and otherwise ignored
fn write_notice<W: std::io::Write>(out: &mut W, message: &str) {
    if let Err(e) = writeln!(out, "{}", console::style(message).yellow()) {
        tracing::debug!("Could not write notice: {}", e);
    }
}

/// What to do when a keypair is already on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeypairChoice {
    UseExisting,
    GenerateNew,
}

pub fn prompt_issuer(prompter: &dyn Prompter) -> Result<String> {
    prompter.input("Token issuer (iss):", Some(DEFAULT_ISSUER))
}

pub fn prompt_subject(prompter: &dyn Prompter) -> Result<String> {
    prompter.input("Token subject (sub):", Some(DEFAULT_SUBJECT))
}

/// Ask whether to add custom claims and collect them one at a time
///
/// Standard claim names and empty values are refused and asked again.
pub fn collect_custom_claims(prompter: &dyn Prompter) -> Result<Map<String, Value>> {
    if !prompter.confirm("Add custom claims?", false)? {
        return Ok(Map::new());
    }

    let mut entry = ClaimEntry::new();
    while !entry.is_finished() {
        let key = prompter.input("Claim key (or press Enter to finish):", None)?;
        let name = match entry.submit_key(&key) {
            Ok(EntryState::AwaitingValue(name)) => name.clone(),
            Ok(_) => continue,
            Err(e) => {
                prompter.notice(&e.to_string());
                continue;
            }
        };

        loop {
            let value = prompter.input(&format!("Value for \"{}\":", name), None)?;
            match entry.submit_value(&value) {
                Ok(()) => break,
                Err(e) => prompter.notice(&e.to_string()),
            }
        }
    }

    Ok(entry.into_claims())
}

/// Pick a preset or build a custom lifetime, returning seconds
pub fn select_expiration(prompter: &dyn Prompter) -> Result<i64> {
    let mut items: Vec<String> = Preset::ALL.iter().map(|p| p.label().to_string()).collect();
    items.push("Custom".to_string());

    let one_hour = Preset::ALL
        .iter()
        .position(|p| *p == Preset::OneHour)
        .unwrap_or(0);
    let choice = prompter.select("Choose expiration time:", &items, one_hour)?;

    if let Some(preset) = Preset::ALL.get(choice) {
        return Ok(preset.seconds());
    }

    let units: Vec<String> = TimeUnit::ALL.iter().map(|u| u.plural().to_string()).collect();
    let unit = TimeUnit::ALL
        .get(prompter.select("Select time unit:", &units, 0)?)
        .copied()
        .unwrap_or(TimeUnit::Minute);

    loop {
        let raw = prompter.input(&format!("Enter number of {}:", unit.plural()), Some("1"))?;
        let amount = match raw.trim().parse::<i64>() {
            Ok(amount) => amount,
            Err(_) => {
                prompter.notice("Please enter a whole number");
                continue;
            }
        };

        match (ExpirationSpec::Custom { amount, unit }).resolve() {
            Ok(seconds) => return Ok(seconds),
            Err(e) => prompter.notice(&e.to_string()),
        }
    }
}

pub fn choose_keypair_action(prompter: &dyn Prompter) -> Result<KeypairChoice> {
    let items = vec![
        "Use existing keys".to_string(),
        "Generate new keypair".to_string(),
    ];
    let choice = prompter.select("RSA keypair found. What would you like to do?", &items, 0)?;
    Ok(if choice == 1 {
        KeypairChoice::GenerateNew
    } else {
        KeypairChoice::UseExisting
    })
}

pub fn confirm_overwrite(prompter: &dyn Prompter) -> Result<bool> {
    prompter.confirm("Keys already exist. Overwrite?", false)
}

/// Ask for both key paths, defaulting to the current ones
///
/// Paths must name existing files; anything else is asked again.
pub fn prompt_key_paths(prompter: &dyn Prompter, current: &KeyPaths) -> Result<KeyPaths> {
    let private_key_path = prompt_existing_path(
        prompter,
        "Private key path:",
        &current.private_key_path.display().to_string(),
    )?;
    let public_key_path = prompt_existing_path(
        prompter,
        "Public key path:",
        &current.public_key_path.display().to_string(),
    )?;

    Ok(KeyPaths {
        private_key_path,
        public_key_path,
    })
}

fn prompt_existing_path(prompter: &dyn Prompter, prompt: &str, default: &str) -> Result<PathBuf> {
    loop {
        let answer = prompter.input(prompt, Some(default))?;
        if answer.trim().is_empty() {
            prompter.notice("Path cannot be empty");
            continue;
        }

        let path = PathBuf::from(answer.trim());
        if !path.exists() {
            prompter.notice("File does not exist");
            continue;
        }
        return Ok(path);
    }
}
