//! Terminal UI for interactive sessions.
//!
//! - [`chat_loop`]: the event loop that feeds input to
//!   [`crate::core::session::Session`] and spawns dispatches.
//! - [`renderer`]: frame composition (transcript, status, thinking line, prompt).
//! - [`input_line`] and [`typewriter`]: prompt editing and the bot reply reveal.
//! - [`lifecycle`]: raw mode and alternate screen setup/teardown.

pub mod chat_loop;
pub mod input_line;
pub mod lifecycle;
pub mod renderer;
pub mod typewriter;
