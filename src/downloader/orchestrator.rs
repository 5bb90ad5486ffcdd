// Downloader - probe and fetch on top of an InfoExtractor

use std::path::PathBuf;
use std::sync::Arc;

use super::errors::DownloadError;
use super::extractors::{ExtractorConfig, InfoExtractor};
use super::format_selector::{CatalogPolicy, FormatSelector};
use super::models::{DownloadMode, DownloadRequest, FetchedMedia, ProbeResult};
use super::scratch::ScratchDir;
use super::utils::sanitize_title;

/// Selector used for audio extraction
pub const AUDIO_SELECTOR: &str = "bestaudio/best";
/// Selector used when video mode has no explicit format id
pub const BEST_COMBINED_SELECTOR: &str = "bv*+ba/b";
pub const AUDIO_CODEC: &str = "mp3";
pub const AUDIO_QUALITY: &str = "192K";
pub const VIDEO_CONTAINER: &str = "mp4";

const UNTITLED: &str = "video";

/// Server-wide defaults every per-request config starts from
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub base: ExtractorConfig,
    pub catalog: CatalogPolicy,
    pub scratch_root: Option<PathBuf>,
    pub probe_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            base: ExtractorConfig::default(),
            catalog: CatalogPolicy::default(),
            scratch_root: None,
            probe_timeout_secs: 60,
            fetch_timeout_secs: 1800,
        }
    }
}

pub struct Downloader {
    engine: Arc<dyn InfoExtractor>,
    settings: RetrievalSettings,
}

impl Downloader {
    pub fn new(engine: Arc<dyn InfoExtractor>, settings: RetrievalSettings) -> Self {
        Self { engine, settings }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub async fn engine_version(&self) -> Result<String, DownloadError> {
        self.engine.version().await
    }

    /// Config for a metadata probe
    pub fn probe_config(&self) -> ExtractorConfig {
        self.settings
            .base
            .clone()
            .with_timeout(self.settings.probe_timeout_secs)
    }

    /// Config for a full fetch in the given mode
    pub fn fetch_config(&self, mode: DownloadMode, format_id: Option<&str>) -> ExtractorConfig {
        let base = self
            .settings
            .base
            .clone()
            .with_timeout(self.settings.fetch_timeout_secs);

        match mode {
            DownloadMode::Audio => base
                .with_format(AUDIO_SELECTOR)
                .with_post_processing(AUDIO_CODEC, AUDIO_QUALITY)
                .with_container(None),
            DownloadMode::Video => {
                let selector = format_id
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .unwrap_or(BEST_COMBINED_SELECTOR);
                base.with_format(selector).with_container(Some(VIDEO_CONTAINER))
            }
        }
    }

    /// Title and quality catalog for `url`, without downloading media
    pub async fn probe(&self, url: &str) -> Result<ProbeResult, DownloadError> {
        let info = self.engine.extract(url, &self.probe_config()).await?;

        let duration = info.duration.unwrap_or(0.0);
        let formats = FormatSelector::build_catalog(&info.formats, duration, &self.settings.catalog);
        let title = info.title.unwrap_or_else(|| UNTITLED.to_string());

        tracing::info!(
            engine = self.engine.name(),
            descriptors = info.formats.len(),
            options = formats.len(),
            "probed {}",
            url
        );

        Ok(ProbeResult { formats, title })
    }

    /// Download `request` into a scoped scratch directory and hand back a
    /// stream over the result. The directory is removed when the stream is
    /// dropped, or right away if anything here fails.
    pub async fn fetch(&self, request: &DownloadRequest) -> Result<FetchedMedia, DownloadError> {
        let config = self.fetch_config(request.mode, request.format_id.as_deref());
        let scratch = ScratchDir::create(self.settings.scratch_root.as_deref())?;

        let info = self
            .engine
            .download(&request.url, &config, scratch.path())
            .await?;
        let output = scratch.output_file().await?;
        let (stream, content_length) = scratch.into_stream(&output).await?;

        let title = info.title.as_deref().unwrap_or(UNTITLED);
        let filename = format!("{}.{}", sanitize_title(title), request.mode.extension());

        tracing::info!(
            engine = self.engine.name(),
            selector = %config.format_selector,
            bytes = content_length,
            "fetched {} as {}",
            request.url,
            filename
        );

        Ok(FetchedMedia {
            filename,
            mime_type: request.mode.mime_type(),
            content_length,
            stream,
        })
    }
}
