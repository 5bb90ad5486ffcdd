// Error types for probe and fetch

use thiserror::Error;

use super::extractors::{diagnose_error, error_summary};

/// Problems with what the caller sent, reported before the engine runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please provide a valid video URL")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Please choose a video format")]
    MissingFormatId,

    #[error("Unknown download format: {0}")]
    UnknownMode(String),
}

/// Reasons the engine refuses to hand out a video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionKind {
    /// Needs a signed-in adult account
    AgeRestricted,
    Private,
    /// Deleted, taken down or otherwise gone
    Unavailable,
    GeoBlocked,
    MembersOnly,
    /// Permanent: Widevine/PlayReady, Premium or paid content
    DrmProtected,
}

impl RestrictionKind {
    /// Fixed user-facing message, never the raw engine text
    pub fn message(&self) -> &'static str {
        match self {
            Self::AgeRestricted => "Age-restricted video. Cannot download.",
            Self::Private => "This video is private.",
            Self::Unavailable => "Video is unavailable.",
            Self::GeoBlocked => "This video is not available in your region.",
            Self::MembersOnly => "This video is only available to channel members.",
            Self::DrmProtected => "This video is DRM-protected and cannot be downloaded.",
        }
    }
}

impl std::fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{0}")]
    Restricted(RestrictionKind),

    /// yt-dlp or python not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// The engine exited unsuccessfully; carries its summarized message
    #[error("{0}")]
    Engine(String),

    /// Failed to parse the engine's JSON output
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("The engine finished without producing a file")]
    NoOutput,
}

impl DownloadError {
    /// Whether the caller (not the server) is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Restricted(_))
    }

    pub fn restriction(&self) -> Option<RestrictionKind> {
        match self {
            Self::Restricted(kind) => Some(*kind),
            _ => None,
        }
    }
}

// Classify raw engine stderr
impl From<String> for DownloadError {
    fn from(stderr: String) -> Self {
        if let Some(kind) = diagnose_error(&stderr) {
            return Self::Restricted(kind);
        }

        Self::Engine(error_summary(&stderr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_video_is_classified() {
        let err = DownloadError::from(
            "ERROR: [youtube] abc123: Private video. Sign in if you've been granted access to this video"
                .to_string(),
        );
        assert_eq!(err.restriction(), Some(RestrictionKind::Private));
        assert_eq!(err.to_string(), "This video is private.");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_generic_failure_keeps_engine_message() {
        let err = DownloadError::from(
            "WARNING: something\nERROR: [generic] Unable to download webpage: HTTP Error 502".to_string(),
        );
        assert!(!err.is_client_error());
        assert_eq!(
            err.to_string(),
            "[generic] Unable to download webpage: HTTP Error 502"
        );
    }

    #[test]
    fn test_input_errors_are_client_errors() {
        let err = DownloadError::from(InputError::MissingUrl);
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Please provide a valid video URL");
    }

    #[test]
    fn test_timeout_is_server_side() {
        assert!(!DownloadError::Timeout(60).is_client_error());
        assert!(!DownloadError::ToolNotFound("yt-dlp".into()).is_client_error());
    }
}
