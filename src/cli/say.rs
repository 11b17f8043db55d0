//! TUI-less commands: `say`, `history` and `clear`.

use std::error::Error;
use std::io::{self, Write};

use crate::core::config::Config;
use crate::core::conversation::{Conversation, SendOutcome};
use crate::core::message::{Message, Role};

use super::setup::{bootstrap_conversation, bootstrap_store};

pub fn format_history_line(message: &Message) -> String {
    let mut lines = message.content.lines();
    let first = lines.next().unwrap_or_default();
    let mut out = format!(
        "[{}] {}: {}",
        message.local_time_label(),
        message.role.display_name(),
        first
    );
    for line in lines {
        out.push('\n');
        out.push_str("    ");
        out.push_str(line);
    }
    out
}

/// Run one full turn and return the stored reply, if any.
pub async fn send_once(
    conversation: &Conversation,
    prompt: &str,
) -> (SendOutcome, Option<String>) {
    conversation.start().await;
    let before = conversation.store().len();
    let outcome = conversation.handle_send_message(prompt).await;

    let reply = conversation
        .store()
        .messages()
        .into_iter()
        .skip(before)
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content);
    (outcome, reply)
}

pub async fn run_say(
    prompt: Vec<String>,
    config: &Config,
    force_memory: bool,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    let prompt = prompt.trim();
    if prompt.is_empty() {
        eprintln!("Usage: palaver say <prompt>");
        std::process::exit(1);
    }

    let conversation = bootstrap_conversation(config, force_memory)?;
    let (outcome, reply) = send_once(&conversation, prompt).await;

    let mut stdout = io::stdout();
    match reply {
        Some(reply) => writeln!(stdout, "{reply}")?,
        None => eprintln!("⚠️  The reply could not be stored. See the log for details."),
    }
    stdout.flush()?;

    if outcome == SendOutcome::Fallback {
        std::process::exit(2);
    }
    Ok(())
}

pub async fn run_history(config: &Config, force_memory: bool) -> Result<(), Box<dyn Error>> {
    let store = bootstrap_store(config, force_memory)?;
    if !store.fetch_messages().await {
        return Err("Could not load the conversation. See the log for details.".into());
    }

    let messages = store.messages();
    if messages.is_empty() {
        println!("No messages yet.");
        return Ok(());
    }
    for message in &messages {
        println!("{}", format_history_line(message));
    }
    Ok(())
}

pub async fn run_clear(config: &Config, force_memory: bool) -> Result<(), Box<dyn Error>> {
    let store = bootstrap_store(config, force_memory)?;
    if !store.clear_messages().await {
        return Err("Could not clear the conversation. See the log for details.".into());
    }
    println!("✅ Conversation cleared");
    Ok(())
}
