//! Matrix Terminal is a themed terminal chat client that talks to a single
//! chat webhook (typically an n8n workflow).
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns configuration, session state, the transcript, and the
//!   response engine that chooses between the webhook and the local responder.
//! - [`webhook`] sends messages to the configured endpoint and normalizes the
//!   reply shapes it sends back.
//! - [`commands`] implements slash-command parsing, the command table, and
//!   the connection probes.
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions and [`cli::say`] for one-shot use.

pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
pub mod webhook;
