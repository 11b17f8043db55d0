//! Palaver is a terminal chat client: messages are stored in a remote table,
//! answered by Gemini, and the replies stored beside them.
//!
//! - [`core`] owns the message store, the conversation controller, config and
//!   credentials.
//! - [`api`] talks to the Gemini and PostgREST endpoints.
//! - [`ui`] renders the terminal interface and runs the event loop.
//! - [`cli`] parses arguments and dispatches commands.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
