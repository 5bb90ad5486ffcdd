// Common data models for the catalog and retrieval paths

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::InputError;
use super::scratch::MediaStream;

/// One candidate stream as reported by the engine's JSON dump.
///
/// Read-only: the catalog builder derives its size estimate separately
/// instead of patching `filesize` in place.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StreamDescriptor {
    /// Opaque token understood only by the engine (e.g. "137", "18")
    #[serde(default)]
    pub format_id: String,
    /// Container extension (mp4, webm, m4a)
    #[serde(default, rename = "ext")]
    pub extension: Option<String>,
    /// Height in pixels; absent or 0 for audio-only streams
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<f64>,
    /// Video codec (avc1, vp9, av01, none)
    #[serde(default)]
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    #[serde(default)]
    pub acodec: Option<String>,
    /// Exact size in bytes
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: Option<u64>,
    /// The engine's own size estimate
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize_approx: Option<u64>,
    /// Total bitrate in kbps
    #[serde(default, rename = "tbr")]
    pub bitrate: Option<f64>,
    #[serde(default)]
    pub format_note: Option<String>,
}

impl StreamDescriptor {
    /// Height in pixels, treating 0 as "no video track"
    pub fn video_height(&self) -> Option<u32> {
        self.height.filter(|h| *h > 0)
    }

    pub fn has_video(&self) -> bool {
        Self::codec_present(self.vcodec.as_deref())
    }

    pub fn has_audio(&self) -> bool {
        Self::codec_present(self.acodec.as_deref())
    }

    fn codec_present(codec: Option<&str>) -> bool {
        codec.is_some_and(|c| !c.is_empty() && c != "none")
    }
}

/// Metadata returned by a probe (and echoed by a full fetch)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    /// Total duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formats: Vec<StreamDescriptor>,
}

/// One selectable quality, at most one per distinct height
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatOption {
    pub format_id: String,
    /// Display label (e.g. "1080p60fps (~42.3MB)")
    pub label: String,
    pub height: u32,
}

/// Body of a successful `/get-formats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub formats: Vec<FormatOption>,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadMode {
    #[default]
    Video,
    Audio,
}

impl DownloadMode {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Video => "video/mp4",
            Self::Audio => "audio/mp3",
        }
    }
}

impl FromStr for DownloadMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(InputError::UnknownMode(other.to_string())),
        }
    }
}

/// A validated `/download` request. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub mode: DownloadMode,
    /// Engine format id; only meaningful in video mode
    pub format_id: Option<String>,
}

impl DownloadRequest {
    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: DownloadMode::Audio,
            format_id: None,
        }
    }

    pub fn video(url: impl Into<String>, format_id: Option<String>) -> Self {
        Self {
            url: url.into(),
            mode: DownloadMode::Video,
            format_id,
        }
    }
}

/// A finished download, ready to be streamed to the caller
pub struct FetchedMedia {
    pub filename: String,
    pub mime_type: &'static str,
    pub content_length: u64,
    /// Owns the scratch directory; dropping it deletes the file
    pub stream: MediaStream,
}

impl std::fmt::Debug for FetchedMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedMedia")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

// yt-dlp emits sizes as ints, floats or null depending on the extractor.
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    }))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u64(deserializer)?.and_then(|v| u32::try_from(v).ok()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_from_engine_json() {
        let json = r#"{
            "format_id": "22",
            "ext": "mp4",
            "height": 720,
            "fps": 30,
            "vcodec": "avc1.64001F",
            "acodec": "mp4a.40.2",
            "filesize": null,
            "filesize_approx": 41235.7,
            "tbr": 1205.4,
            "format_note": "720p"
        }"#;

        let d: StreamDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.format_id, "22");
        assert_eq!(d.extension.as_deref(), Some("mp4"));
        assert_eq!(d.video_height(), Some(720));
        assert_eq!(d.filesize, None);
        assert_eq!(d.filesize_approx, Some(41235));
        assert!(d.has_video());
        assert!(d.has_audio());
    }

    #[test]
    fn test_audio_only_descriptor() {
        let json = r#"{"format_id": "140", "ext": "m4a", "height": null, "vcodec": "none", "acodec": "mp4a.40.2"}"#;
        let d: StreamDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.video_height(), None);
        assert!(!d.has_video());
        assert!(d.has_audio());
    }

    #[test]
    fn test_media_info_tolerates_null_formats() {
        let info: MediaInfo =
            serde_json::from_str(r#"{"title": "Clip", "duration": 12.5, "formats": null}"#).unwrap();
        assert_eq!(info.title.as_deref(), Some("Clip"));
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_download_mode_parsing() {
        assert_eq!("audio".parse::<DownloadMode>(), Ok(DownloadMode::Audio));
        assert_eq!(" Video ".parse::<DownloadMode>(), Ok(DownloadMode::Video));
        assert_eq!(
            "flac".parse::<DownloadMode>(),
            Err(InputError::UnknownMode("flac".to_string()))
        );
    }

    #[test]
    fn test_audio_mode_is_always_mp3() {
        assert_eq!(DownloadMode::Audio.mime_type(), "audio/mp3");
        assert_eq!(DownloadMode::Audio.extension(), "mp3");
        assert_eq!(DownloadMode::Video.mime_type(), "video/mp4");
    }
}
