use std::sync::Arc;
use tracing::debug;

use super::{ExtractedInfo, MediaExtractor, ResolveError};

/// Fragmentos que identifican un enlace directo a un video
const VIDEO_LINK_MARKERS: &[&str] = &["youtu.be", "youtube.com"];

/// Whether `term` should be treated as a direct video link rather than a search.
pub fn is_direct_link(term: &str) -> bool {
    VIDEO_LINK_MARKERS.iter().any(|marker| term.contains(marker))
}

/// Resuelve términos de búsqueda o enlaces a URLs de stream
#[derive(Clone)]
pub struct Resolver {
    extractor: Arc<dyn MediaExtractor>,
}

impl Resolver {
    pub fn new(extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { extractor }
    }

    /// Resolves `term` to a playable stream URL.
    ///
    /// A direct link costs one extraction. A search costs two: one to find the
    /// first result's page, one to resolve that page to a stream.
    pub async fn resolve(&self, term: &str) -> Result<String, ResolveError> {
        if is_direct_link(term) {
            self.resolve_link(term).await
        } else {
            self.resolve_query(term).await
        }
    }

    async fn resolve_link(&self, link: &str) -> Result<String, ResolveError> {
        let item = self.extractor.extract_info(link).await?;
        stream_url(link, item)
    }

    async fn resolve_query(&self, query: &str) -> Result<String, ResolveError> {
        debug!("searching for {}", query);

        let search = self.extractor.extract_info(query).await?;
        let first = search
            .entries
            .and_then(|entries| entries.into_iter().next())
            .ok_or_else(|| ResolveError::NoEntries(query.to_string()))?;
        let page = first.webpage_url.ok_or_else(|| ResolveError::MissingField {
            target: query.to_string(),
            field: "webpage_url",
        })?;

        let item = self.extractor.extract_info(&page).await?;
        stream_url(&page, item)
    }
}

fn stream_url(target: &str, info: ExtractedInfo) -> Result<String, ResolveError> {
    let url = info.url.ok_or_else(|| ResolveError::MissingField {
        target: target.to_string(),
        field: "url",
    })?;
    debug!(
        "Found stream link for {}",
        info.title.as_deref().unwrap_or(target)
    );
    Ok(url)
}
