//! Anicap — Telegram bot that turns streaming-site episode URLs into MP4s.
//!
//! # Module Structure
//!
//! - `bot`: bot instance creation and command registration
//! - `handlers`: dispatcher schema and handler dependencies
//! - `pipeline`: the per-message fetch → remux → upload job

pub mod bot;
pub mod handlers;
pub mod pipeline;

pub use handlers::{schema, HandlerDeps};
