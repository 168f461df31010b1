//! # Sources Module
//!
//! Turns what a user typed after `!play` into a stream URL that ffmpeg can open.
//!
//! - [`ytdlp`]: the [`MediaExtractor`] backed by the `yt-dlp` executable
//! - [`resolver`]: decides between the direct-link path and the search path

pub mod resolver;
pub mod ytdlp;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use resolver::Resolver;
pub use ytdlp::YtDlp;

/// Subset of the JSON document yt-dlp prints for an extraction.
///
/// Search results come back as a playlist-like document whose `entries`
/// hold the individual videos.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ExtractedInfo {
    pub title: Option<String>,
    /// Direct, time-limited media URL for the selected format.
    pub url: Option<String>,
    /// Canonical page URL of the video.
    pub webpage_url: Option<String>,
    pub entries: Option<Vec<ExtractedInfo>>,
}

/// Errores al resolver un término de búsqueda a una URL de stream
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("extraction failed for {target}: {message}")]
    Extraction { target: String, message: String },
    #[error("search for {0:?} returned no entries")]
    NoEntries(String),
    #[error("extraction result for {target} has no `{field}` field")]
    MissingField {
        target: String,
        field: &'static str,
    },
}

/// Herramienta externa capaz de extraer información de medios
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Runs one extraction for `target`, which may be a page URL or free text.
    ///
    /// Implementations must not block the async workers.
    async fn extract_info(&self, target: &str) -> Result<ExtractedInfo, ResolveError>;
}
