//! Terminal UI layer.
//!
//! - [`chat_loop`]: terminal lifecycle, the event loop and global key
//!   bindings. Editor keys are forwarded to [`crate::core::editing`].
//! - [`renderer`]: draws history, preview, the input box and a status line.

pub mod chat_loop;
pub mod renderer;
