//! Parley is a full-screen terminal client for Mattermost-compatible team
//! chat servers.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the message editor ([`core::buffer`], [`core::editing`]),
//!   the background task runner ([`core::tasks`]) and the application state
//!   those tasks update ([`core::app`]).
//! - [`ui`] runs the terminal event loop and renders the interface.
//! - [`commands`] parses and executes slash commands typed into the editor.
//! - [`api`] is the chat server protocol surface used by background tasks.
//! - [`utils`] holds the external editor bridge, paste sanitizing and logging.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
