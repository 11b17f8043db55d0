//! Interactive `palaver auth` / `palaver deauth`.
//!
//! Prompts read from any `BufRead` and write to any `Write` so the flows can
//! be driven from tests.

use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, Write};

use crate::core::credentials::{CredentialStore, Secret, SecretSource};

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for UiError {}

impl From<io::Error> for UiError {
    fn from(err: io::Error) -> Self {
        UiError::new(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSelection {
    One(Secret),
    All,
    Cancel,
}

/// Map a menu answer to a selection. Items are numbered from 1 in
/// [`Secret::ALL`] order, followed by "all" and then "cancel".
pub fn parse_selection(input: &str) -> Result<SecretSelection, UiError> {
    let choice: usize = input
        .trim()
        .parse()
        .map_err(|_| UiError::new("Invalid choice"))?;
    let count = Secret::ALL.len();
    match choice {
        n if (1..=count).contains(&n) => Ok(SecretSelection::One(Secret::ALL[n - 1])),
        n if n == count + 1 => Ok(SecretSelection::All),
        n if n == count + 2 => Ok(SecretSelection::Cancel),
        _ => Err(UiError::new("Invalid choice")),
    }
}

pub fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn read_answer<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String, UiError> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_menu<W: Write>(
    output: &mut W,
    statuses: &[(Secret, Option<SecretSource>)],
    all_label: &str,
) -> io::Result<()> {
    for (index, (secret, source)) in statuses.iter().enumerate() {
        let status = match source {
            Some(source) => format!("✓ configured ({source})"),
            None => "not configured".to_string(),
        };
        writeln!(output, "  {}. {} - {}", index + 1, secret.display_name(), status)?;
    }
    writeln!(output, "  {}. {}", statuses.len() + 1, all_label)?;
    writeln!(output, "  {}. Cancel", statuses.len() + 2)?;
    writeln!(output)
}

fn secret_statuses(store: &CredentialStore) -> Vec<(Secret, Option<SecretSource>)> {
    Secret::ALL
        .iter()
        .map(|secret| {
            let source = store.resolve(*secret).ok().flatten().map(|(_, source)| source);
            (*secret, source)
        })
        .collect()
}

fn selected_secrets(selection: &SecretSelection) -> Vec<Secret> {
    match selection {
        SecretSelection::One(secret) => vec![*secret],
        SecretSelection::All => Secret::ALL.to_vec(),
        SecretSelection::Cancel => Vec::new(),
    }
}

pub fn run_auth<R: BufRead, W: Write>(
    store: &CredentialStore,
    input: &mut R,
    output: &mut W,
) -> Result<(), Box<dyn Error>> {
    writeln!(output, "🔐 Palaver Authentication Setup")?;
    writeln!(output, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(output)?;
    print_menu(output, &secret_statuses(store), "Both")?;

    let answer = read_answer(input, output, "Select a key to store (1-4): ")?;
    let selection = parse_selection(&answer)?;
    if selection == SecretSelection::Cancel {
        writeln!(output, "Cancelled.")?;
        return Ok(());
    }

    for secret in selected_secrets(&selection) {
        let prompt = format!("Enter your {}: ", secret.display_name());
        let value = read_answer(input, output, &prompt)?;
        if value.is_empty() {
            return Err(format!("{} cannot be empty", secret.display_name()).into());
        }
        store.store(secret, &value)?;
        writeln!(output, "✓ {} stored securely", secret.display_name())?;
    }

    writeln!(output)?;
    writeln!(output, "✅ Authentication configured successfully!")?;
    writeln!(
        output,
        "You can now use Palaver without setting environment variables."
    )?;
    Ok(())
}

pub fn run_deauth<R: BufRead, W: Write>(
    store: &CredentialStore,
    input: &mut R,
    output: &mut W,
) -> Result<(), Box<dyn Error>> {
    writeln!(output, "🗑️  Remove stored keys")?;
    writeln!(output)?;
    print_menu(output, &secret_statuses(store), "All")?;

    let answer = read_answer(input, output, "Select a key to remove (1-4): ")?;
    let selection = parse_selection(&answer)?;
    if selection == SecretSelection::Cancel {
        writeln!(output, "Cancelled.")?;
        return Ok(());
    }

    let confirm = read_answer(input, output, "Are you sure? (y/N): ")?;
    if !parse_confirmation(&confirm) {
        writeln!(output, "Cancelled.")?;
        return Ok(());
    }

    for secret in selected_secrets(&selection) {
        if store.remove(secret)? {
            writeln!(output, "✓ Removed {}", secret.display_name())?;
        } else {
            writeln!(output, "  No stored {}", secret.display_name())?;
        }
    }

    let env_still_set: Vec<&str> = selected_secrets(&selection)
        .iter()
        .flat_map(|secret| secret.env_vars().iter().copied())
        .filter(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()))
        .collect();
    if !env_still_set.is_empty() {
        writeln!(
            output,
            "⚠️  Still set in the environment: {}",
            env_still_set.join(", ")
        )?;
    }
    Ok(())
}
