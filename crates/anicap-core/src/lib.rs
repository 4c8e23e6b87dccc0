//! Anicap core — everything the bot does that isn't Telegram.
//!
//! # Module Structure
//!
//! - `config`: environment-sourced configuration, built once at startup
//! - `episode`: episode-page URL parsing
//! - `resolver`: stream resolution against the Aniwatch-style sources API
//! - `remux`: ffmpeg copy-remux of an HLS stream into MP4
//! - `process`: external-process execution with timeouts

pub mod config;
pub mod episode;
pub mod process;
pub mod remux;
pub mod resolver;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError};
pub use episode::{EpisodeRef, EpisodeUrlError};
pub use remux::{check_ffmpeg, remux_to_mp4, RemuxError};
pub use resolver::{ResolveError, ResolveOptions, StreamResolver, StreamSource};
