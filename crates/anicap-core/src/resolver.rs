//! Stream resolution against the Aniwatch-style sources API.
//!
//! One GET per request:
//! `{api_base}/episode/sources?animeEpisodeId={slug}?ep={ep}&server=…&category=…`
//! The response lists candidate sources; we pick the first HLS one in an
//! order-preserving linear scan (no scoring, no hidden prioritization).

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::episode::EpisodeRef;

/// Timeout for the sources API call. Nothing here is retried, so a hung
/// upstream would otherwise hold the whole job.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while resolving a playable stream
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("no playable HLS stream found")]
    NoHlsSource,
}

/// The stream picked for one request: its address plus the Referer header
/// the CDN requires for segment fetches, when the API supplies one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub url: String,
    pub referer: Option<String>,
}

/// Server/category query knobs for the sources API
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub server: String,
    pub category: String,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            server: "hd-1".to_string(),
            category: "sub".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct SourcesResponse {
    #[serde(default)]
    data: SourcesData,
}

#[derive(Debug, Deserialize, Default)]
struct SourcesData {
    #[serde(default)]
    sources: Vec<SourceEntry>,
    #[serde(default)]
    headers: SourceHeaders,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    #[serde(default)]
    url: String,
    /// Explicit type marker, e.g. "hls"
    #[serde(rename = "type", default)]
    kind: Option<String>,
    /// Boolean HLS flag; API revisions have shipped it under both names
    #[serde(rename = "isHls", alias = "isM3U8", default)]
    is_hls: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceHeaders {
    #[serde(rename = "Referer", default)]
    referer: Option<String>,
}

impl SourceEntry {
    /// Selection predicate: the API has shipped an explicit `type` field,
    /// an `isM3U8` flag, and plain `.m3u8` URLs at different times, so any
    /// of the three marks a source as HLS.
    fn is_hls(&self) -> bool {
        self.kind.as_deref() == Some("hls") || self.is_hls == Some(true) || self.url.ends_with(".m3u8")
    }
}

/// Client for the episode-sources API.
///
/// Holds one `reqwest::Client`; cheap to clone and share across handler
/// invocations.
#[derive(Debug, Clone)]
pub struct StreamResolver {
    client: reqwest::Client,
    api_base: String,
}

impl StreamResolver {
    /// Create a resolver for the given API base, e.g.
    /// `http://localhost:4000/api/v2/hianime`.
    pub fn new(api_base: impl Into<String>) -> Result<Self, ResolveError> {
        let client = reqwest::Client::builder().timeout(RESOLVE_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the playable stream for one episode.
    ///
    /// First HLS-flagged source wins; an empty or HLS-free source list is
    /// `ResolveError::NoHlsSource`.
    pub async fn resolve(&self, episode: &EpisodeRef, opts: &ResolveOptions) -> Result<StreamSource, ResolveError> {
        // The upstream API expects the `?ep=` literally inside the
        // animeEpisodeId value; reqwest percent-encodes it like any
        // other query value and the API decodes it back.
        let episode_id = format!("{}?ep={}", episode.slug, episode.episode);

        let resp = self
            .client
            .get(format!("{}/episode/sources", self.api_base))
            .query(&[
                ("animeEpisodeId", episode_id.as_str()),
                ("server", opts.server.as_str()),
                ("category", opts.category.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ResolveError::HttpStatus(resp.status()));
        }

        let body: SourcesResponse = resp.json().await?;

        let source = body
            .data
            .sources
            .into_iter()
            .find(SourceEntry::is_hls)
            .ok_or(ResolveError::NoHlsSource)?;

        log::info!("Resolved stream for {}_{}: {}", episode.slug, episode.episode, source.url);

        Ok(StreamSource {
            url: source.url,
            referer: body.data.headers.referer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(url: &str, kind: Option<&str>, is_hls: Option<bool>) -> SourceEntry {
        SourceEntry {
            url: url.to_string(),
            kind: kind.map(str::to_string),
            is_hls,
        }
    }

    #[test]
    fn test_is_hls_by_type_field() {
        assert!(entry("https://cdn/x", Some("hls"), None).is_hls());
        assert!(!entry("https://cdn/x", Some("mp4"), None).is_hls());
    }

    #[test]
    fn test_is_hls_by_flag() {
        assert!(entry("https://cdn/x", None, Some(true)).is_hls());
        assert!(!entry("https://cdn/x", None, Some(false)).is_hls());
    }

    #[test]
    fn test_is_hls_by_url_suffix() {
        assert!(entry("https://cdn/master.m3u8", None, None).is_hls());
        assert!(!entry("https://cdn/video.mp4", None, None).is_hls());
    }

    #[test]
    fn test_flag_accepted_under_both_names() {
        let e: SourceEntry = serde_json::from_str(r#"{"url":"https://cdn/x","isM3U8":true}"#).unwrap();
        assert!(e.is_hls());
        let e: SourceEntry = serde_json::from_str(r#"{"url":"https://cdn/x","isHls":true}"#).unwrap();
        assert!(e.is_hls());
    }

    #[test]
    fn test_response_parsing_defaults() {
        // Missing data/sources/headers all deserialize to empty defaults.
        let body: SourcesResponse = serde_json::from_str("{}").unwrap();
        assert!(body.data.sources.is_empty());
        assert_eq!(body.data.headers.referer, None);
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let resolver = StreamResolver::new("http://localhost:4000/api/v2/hianime/").unwrap();
        assert_eq!(resolver.api_base, "http://localhost:4000/api/v2/hianime");
    }
}
