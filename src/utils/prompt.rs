//! Terminal prompts for the interactive mode, using dialoguer

use crate::utils::error::{Result, StorageError};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Password, Select};

fn interaction_error(e: dialoguer::Error) -> StorageError {
    StorageError::Io(std::io::Error::other(e.to_string()))
}

/// Prompt for text input
pub fn prompt_input(prompt: &str, default: Option<&str>) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut input = Input::with_theme(&theme).with_prompt(prompt);

    if let Some(d) = default {
        input = input.default(d.to_string());
    }

    input
        .interact_text()
        .map_err(|_| StorageError::UserCancelled)
}

/// Prompt for a hidden value. Empty input is allowed so the caller can
/// report it.
pub fn prompt_password(prompt: &str) -> Result<String> {
    let theme = ColorfulTheme::default();
    Password::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|_| StorageError::UserCancelled)
}

/// Prompt for yes/no confirmation
pub fn prompt_confirm(prompt: &str, default: bool) -> Result<bool> {
    let theme = ColorfulTheme::default();
    Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(default)
        .interact_opt()
        .map_err(interaction_error)?
        .ok_or(StorageError::UserCancelled)
}

/// Prompt for selection from a list. Escape cancels.
pub fn prompt_select<T: ToString>(prompt: &str, items: &[T], default: usize) -> Result<usize> {
    let theme = ColorfulTheme::default();
    Select::with_theme(&theme)
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact_opt()
        .map_err(interaction_error)?
        .ok_or(StorageError::UserCancelled)
}

/// Prompt for several entries of a list
pub fn prompt_multi_select<T: ToString>(prompt: &str, items: &[T], checked: &[bool]) -> Result<Vec<usize>> {
    let theme = ColorfulTheme::default();
    MultiSelect::with_theme(&theme)
        .with_prompt(prompt)
        .items(items)
        .defaults(checked)
        .interact_opt()
        .map_err(interaction_error)?
        .ok_or(StorageError::UserCancelled)
}

pub fn warn(message: &str) {
    println!("{} {}", "!".yellow().bold(), message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}
