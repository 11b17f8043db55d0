//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop that turns keys into store operations.
//! - [`renderer`] and [`transcript`]: frame layout and message lines.
//! - [`input`]: the draft box.
//!
//! The transcript and busy flag belong to [`crate::core::store::ChatStore`];
//! this layer only keeps screen state such as scroll position.

pub mod chat_loop;
pub mod input;
pub mod renderer;
pub mod state;
pub mod transcript;
