// InfoExtractor trait and the per-request engine configuration

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::downloader::errors::DownloadError;
use crate::downloader::models::MediaInfo;

/// How the engine is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorMode {
    /// Native `yt-dlp` binary
    #[default]
    Cli,
    /// `python3 -m yt_dlp`
    Python,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "cli"),
            Self::Python => write!(f, "python"),
        }
    }
}

/// Where the engine gets login cookies from
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialsSource {
    #[default]
    None,
    /// Netscape cookies.txt exported from a browser
    CookiesFile { path: PathBuf },
    /// Read cookies straight from a local browser profile (chrome, firefox, ...)
    Browser { name: String },
}

/// Transcode step run by the engine after download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessing {
    pub target_codec: String,
    pub target_quality: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkOptions {
    pub credentials: CredentialsSource,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    pub socket_timeout_secs: u32,
}

/// Immutable engine configuration.
///
/// Built fresh for every probe or fetch from the server's defaults, so no
/// option ever leaks from one request into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// yt-dlp `-f` expression
    pub format_selector: String,
    pub post_processing: Option<PostProcessing>,
    /// Container the video output is merged/remuxed into
    pub container: Option<String>,
    pub network: NetworkOptions,
    /// Skip DASH and HLS manifests on YouTube
    pub skip_streaming_protocols: bool,
    pub check_certificates: bool,
    /// Hard limit for the whole engine run
    pub timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            format_selector: "bv*+ba/b".to_string(),
            post_processing: None,
            container: None,
            network: NetworkOptions {
                socket_timeout_secs: 30,
                ..NetworkOptions::default()
            },
            skip_streaming_protocols: true,
            check_certificates: false,
            timeout_seconds: 60,
        }
    }
}

impl ExtractorConfig {
    pub fn with_format(mut self, selector: impl Into<String>) -> Self {
        self.format_selector = selector.into();
        self
    }

    pub fn with_post_processing(mut self, codec: &str, quality: &str) -> Self {
        self.post_processing = Some(PostProcessing {
            target_codec: codec.to_string(),
            target_quality: quality.to_string(),
        });
        self
    }

    pub fn with_container(mut self, container: Option<&str>) -> Self {
        self.container = container.map(str::to_string);
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialsSource) -> Self {
        self.network.credentials = credentials;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.network.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// The external extraction engine
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Engine version string, also serves as an availability check
    async fn version(&self) -> Result<String, DownloadError>;

    /// Metadata-only call: no media payload is transferred
    async fn extract(&self, url: &str, config: &ExtractorConfig)
        -> Result<MediaInfo, DownloadError>;

    /// Full download into `output_dir`; returns the metadata of the fetched media
    async fn download(
        &self,
        url: &str,
        config: &ExtractorConfig,
        output_dir: &Path,
    ) -> Result<MediaInfo, DownloadError>;
}
