//! Episode-page URL parsing.
//!
//! Turns `https://hianime.to/watch/steinsgate-3/episode-230` into
//! `EpisodeRef { slug: "steinsgate-3", episode: "230" }`: the slug is the
//! second-from-last path segment, the episode number is the final
//! `-`-delimited token of the last segment.

use thiserror::Error;
use url::Url;

/// Errors produced while extracting an episode reference from a URL
#[derive(Error, Debug)]
pub enum EpisodeUrlError {
    #[error("not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL path has no slug/episode segments: {0}")]
    MissingSegments(String),

    #[error("episode segment has no numeric suffix: {0}")]
    BadEpisodeNumber(String),
}

/// A content slug plus episode number, derived from an episode-page URL.
///
/// Recomputed per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRef {
    pub slug: String,
    pub episode: String,
}

impl EpisodeRef {
    /// Parse an episode-page URL into an `EpisodeRef`.
    ///
    /// The slug must be non-empty and the episode token numeric; anything
    /// else is rejected here instead of producing a nonsensical API query
    /// downstream.
    pub fn parse(episode_url: &str) -> Result<Self, EpisodeUrlError> {
        let parsed = Url::parse(episode_url.trim())?;
        let path = parsed.path().trim_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if segments.len() < 2 {
            return Err(EpisodeUrlError::MissingSegments(episode_url.to_string()));
        }

        let slug = segments[segments.len() - 2];
        let last = segments[segments.len() - 1];
        let episode = last.rsplit('-').next().unwrap_or(last);

        if episode.is_empty() || !episode.chars().all(|c| c.is_ascii_digit()) {
            return Err(EpisodeUrlError::BadEpisodeNumber(last.to_string()));
        }

        Ok(Self {
            slug: slug.to_string(),
            episode: episode.to_string(),
        })
    }

    /// Deterministic output file name for this episode: `{slug}_{episode}.mp4`
    pub fn output_file_name(&self) -> String {
        format!("{}_{}.mp4", self.slug, self.episode)
    }
}
