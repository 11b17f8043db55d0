//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod auth;
pub mod say;
pub mod settings;
pub mod setup;

use std::error::Error;
use std::io;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::core::config::data::path_display;
use crate::core::config::Config;
use crate::core::credentials::CredentialStore;
use crate::ui::chat_loop::run_chat;
use crate::ui::state::ViewState;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser)]
#[command(name = "palaver")]
#[command(version = VERSION)]
#[command(about = "A full-screen terminal chat with Gemini, history kept in Supabase")]
#[command(
    long_about = "Palaver is a full-screen terminal chat client. Each message you send is \
stored in a Supabase (PostgREST) table, answered by a Gemini model, and the reply is \
stored beside it.\n\n\
Authentication:\n\
  Use 'palaver auth' to store the Gemini API key and the Supabase anon key in your\n\
  system keyring.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY          Gemini API key (or PALAVER_GEMINI_API_KEY)\n\
  SUPABASE_ANON_KEY       Supabase anon key (or PALAVER_DATASTORE_KEY)\n\
  PALAVER_DATASTORE_URL   Supabase project URL, e.g. https://abc.supabase.co\n\
  PALAVER_MODEL           Gemini model (default gemini-1.5-flash)\n\
  PALAVER_LOG             Log filter, e.g. debug or palaver=trace\n\n\
Controls:\n\
  Enter                   Send the message\n\
  Alt+Enter/Shift+Enter   New line\n\
  Ctrl+R                  Reload the conversation\n\
  Ctrl+L / Ctrl+N         Clear the conversation (new chat)\n\
  Ctrl+B                  Toggle the sidebar\n\
  Up/Down/PgUp/PgDn/Mouse Scroll\n\
  Ctrl+C / Esc            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Write diagnostics to this file instead of the default log path
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Keep messages in memory only, ignoring the configured datastore
    #[arg(long, global = true)]
    pub memory: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// The message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Print the stored conversation
    History,
    /// Delete every stored message
    Clear,
    /// Store API keys in the system keyring
    Auth,
    /// Remove API keys from the system keyring
    Deauth,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Auth => {
            let store = CredentialStore::new();
            if let Err(e) = auth::run_auth(&store, &mut io::stdin().lock(), &mut io::stdout()) {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            let store = CredentialStore::new();
            if let Err(e) = auth::run_deauth(&store, &mut io::stdin().lock(), &mut io::stdout())
            {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Set { key, value } => {
            if let Err(e) = settings::run_set(&key, value) {
                e.print();
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Unset { key } => {
            if let Err(e) = settings::run_unset(&key) {
                e.print();
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config => {
            if let Ok(path) = Config::get_config_path() {
                println!("Config file: {}", path_display(path));
            }
            config.print_all();
            Ok(())
        }
        Commands::Say { prompt } => {
            setup::init_logging(args.log.as_deref(), &config);
            exit_on_error(say::run_say(prompt, &config, args.memory).await)
        }
        Commands::History => {
            setup::init_logging(args.log.as_deref(), &config);
            exit_on_error(say::run_history(&config, args.memory).await)
        }
        Commands::Clear => {
            setup::init_logging(args.log.as_deref(), &config);
            exit_on_error(say::run_clear(&config, args.memory).await)
        }
        Commands::Chat => {
            let log_path = setup::init_logging(args.log.as_deref(), &config);

            // Report setup problems while stderr is still visible.
            let conversation = match setup::bootstrap_conversation(&config, args.memory) {
                Ok(conversation) => conversation,
                Err(e) => {
                    eprintln!("❌ {e}");
                    std::process::exit(1);
                }
            };
            if let Some(path) = &log_path {
                info!(
                    log = %path_display(path),
                    model = conversation.model_name(),
                    "starting chat"
                );
            }

            let view = ViewState::new(
                conversation.model_name().to_string(),
                conversation.store().datastore_description(),
                config.sidebar_open(),
            );
            run_chat(conversation, view).await
        }
    }
}

fn exit_on_error(result: Result<(), Box<dyn Error>>) -> Result<(), Box<dyn Error>> {
    if let Err(e) = result {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn chat_is_the_default() {
        let args = Args::try_parse_from(["palaver"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.memory);
    }

    #[test]
    fn say_collects_words() {
        let args = Args::try_parse_from(["palaver", "say", "hello", "there"]).unwrap();
        match args.command {
            Some(Commands::Say { prompt }) => assert_eq!(prompt.join(" "), "hello there"),
            _ => panic!("expected say"),
        }
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let argv = ["palaver", "history", "--memory", "--log", "/tmp/p.log"];
        let args = Args::try_parse_from(argv).unwrap();
        assert!(args.memory);
        assert_eq!(args.log.as_deref(), Some("/tmp/p.log"));
        assert!(matches!(args.command, Some(Commands::History)));
    }

    #[test]
    fn set_joins_multi_word_values() {
        let args = Args::try_parse_from(["palaver", "set", "log-file", "my", "log.txt"]).unwrap();
        match args.command {
            Some(Commands::Set { key, value }) => {
                assert_eq!(key, "log-file");
                assert_eq!(value.unwrap().join(" "), "my log.txt");
            }
            _ => panic!("expected set"),
        }
    }
}
