// CLI InfoExtractor - drives yt-dlp as a child process
//
// Two invocation forms share one argument builder:
// - Cli: the native `yt-dlp` binary
// - Python: `python3 -m yt_dlp`, for hosts that only have the module

use async_trait::async_trait;
use std::path::Path;
use std::process::Command as StdCommand;

use super::traits::{CredentialsSource, ExtractorConfig, ExtractorMode, InfoExtractor};
use crate::downloader::errors::DownloadError;
use crate::downloader::models::MediaInfo;
use crate::downloader::utils::run_output_with_timeout;

/// Output template inside the per-request scratch directory
const OUTPUT_TEMPLATE: &str = "media.%(ext)s";

const VERSION_TIMEOUT_SECS: u64 = 10;

pub struct CliInfoExtractor {
    program: String,
    leading_args: Vec<String>,
    mode: ExtractorMode,
}

impl CliInfoExtractor {
    pub fn new(mode: ExtractorMode, ytdlp_path: Option<String>, python: &str) -> Self {
        match mode {
            ExtractorMode::Cli => Self {
                program: ytdlp_path.unwrap_or_else(Self::find_ytdlp),
                leading_args: Vec::new(),
                mode,
            },
            ExtractorMode::Python => Self {
                program: python.to_string(),
                leading_args: vec!["-m".to_string(), "yt_dlp".to_string()],
                mode,
            },
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Find yt-dlp binary
    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
            "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac / pip
            "/usr/bin/yt-dlp",          // System installation
        ];

        for path in common_paths {
            if Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Options every engine call carries
    fn common_args(config: &ExtractorConfig) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            config.network.socket_timeout_secs.to_string(),
        ];

        if !config.check_certificates {
            args.push("--no-check-certificates".to_string());
        }

        if config.skip_streaming_protocols {
            args.push("--extractor-args".to_string());
            args.push("youtube:skip=dash,hls".to_string());
        }

        match &config.network.credentials {
            CredentialsSource::None => {}
            CredentialsSource::CookiesFile { path } => {
                args.push("--cookies".to_string());
                args.push(path.to_string_lossy().to_string());
            }
            CredentialsSource::Browser { name } => {
                args.push("--cookies-from-browser".to_string());
                args.push(name.clone());
            }
        }

        if let Some(proxy) = &config.network.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }

    /// Metadata-only invocation
    pub fn probe_args(&self, url: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push("--dump-json".to_string());
        args.push("--skip-download".to_string());
        args.extend(Self::common_args(config));
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Full download into `output_dir`, still printing the info JSON
    pub fn download_args(&self, url: &str, config: &ExtractorConfig, output_dir: &Path) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend([
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
            "-f".to_string(),
            config.format_selector.clone(),
            "-P".to_string(),
            output_dir.to_string_lossy().to_string(),
            "-o".to_string(),
            OUTPUT_TEMPLATE.to_string(),
        ]);
        args.extend(Self::common_args(config));

        if let Some(pp) = &config.post_processing {
            args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                pp.target_codec.clone(),
                "--audio-quality".to_string(),
                pp.target_quality.clone(),
            ]);
        }

        if let Some(container) = &config.container {
            args.extend([
                "--merge-output-format".to_string(),
                container.clone(),
                "--remux-video".to_string(),
                container.clone(),
            ]);
        }

        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Parse the info JSON; yt-dlp prints one object per line
    fn parse_json(stdout: &[u8]) -> Result<MediaInfo, DownloadError> {
        let text = String::from_utf8_lossy(stdout);
        let line = text
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with('{'))
            .ok_or_else(|| DownloadError::Parse("engine printed no JSON".to_string()))?;

        serde_json::from_str(line).map_err(|e| DownloadError::Parse(format!("Invalid JSON: {}", e)))
    }

    async fn run(&self, args: Vec<String>, timeout_secs: u64) -> Result<std::process::Output, DownloadError> {
        tracing::debug!(
            engine = %self.mode,
            "running {} {}",
            self.program,
            args.join(" ")
        );

        let output = run_output_with_timeout(&self.program, &args, timeout_secs).await?;
        if output.status.success() {
            return Ok(output);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        tracing::warn!(status = %output.status, "yt-dlp failed: {}", stderr.trim());
        Err(DownloadError::from(stderr))
    }
}

impl Default for CliInfoExtractor {
    fn default() -> Self {
        Self::new(ExtractorMode::Cli, None, "python3")
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        match self.mode {
            ExtractorMode::Cli => "cli-yt-dlp",
            ExtractorMode::Python => "python-yt-dlp",
        }
    }

    async fn version(&self) -> Result<String, DownloadError> {
        let mut args = self.leading_args.clone();
        args.push("--version".to_string());
        let output = self.run(args, VERSION_TIMEOUT_SECS).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn extract(&self, url: &str, config: &ExtractorConfig) -> Result<MediaInfo, DownloadError> {
        let output = self
            .run(self.probe_args(url, config), config.timeout_seconds)
            .await?;
        Self::parse_json(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        config: &ExtractorConfig,
        output_dir: &Path,
    ) -> Result<MediaInfo, DownloadError> {
        let output = self
            .run(self.download_args(url, config, output_dir), config.timeout_seconds)
            .await?;

        // The file is what matters here; a missing title only costs the name.
        match Self::parse_json(&output.stdout) {
            Ok(info) => Ok(info),
            Err(e) => {
                tracing::warn!("download finished but metadata was unreadable: {}", e);
                Ok(MediaInfo::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cli() -> CliInfoExtractor {
        CliInfoExtractor::new(ExtractorMode::Cli, Some("/usr/bin/yt-dlp".to_string()), "python3")
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_probe_args_skip_download() {
        let args = cli().probe_args("https://youtu.be/x", &ExtractorConfig::default());

        assert_eq!(args[0], "--dump-json");
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(args.contains(&"--no-check-certificates".to_string()));
        assert!(has_pair(&args, "--extractor-args", "youtube:skip=dash,hls"));
        assert!(!args.contains(&"--no-simulate".to_string()));
        assert_eq!(args[args.len() - 2..], ["--".to_string(), "https://youtu.be/x".to_string()]);
    }

    #[test]
    fn test_audio_download_args() {
        let config = ExtractorConfig::default()
            .with_format("bestaudio/best")
            .with_post_processing("mp3", "192K");
        let args = cli().download_args("https://youtu.be/x", &config, Path::new("/tmp/job"));

        assert!(has_pair(&args, "-f", "bestaudio/best"));
        assert!(has_pair(&args, "--audio-format", "mp3"));
        assert!(has_pair(&args, "--audio-quality", "192K"));
        assert!(has_pair(&args, "-P", "/tmp/job"));
        assert!(has_pair(&args, "-o", "media.%(ext)s"));
        assert!(args.contains(&"-x".to_string()));
        assert!(args.contains(&"--no-simulate".to_string()));
        assert!(!args.contains(&"--remux-video".to_string()));
    }

    #[test]
    fn test_video_download_args() {
        let config = ExtractorConfig::default()
            .with_format("137")
            .with_container(Some("mp4"));
        let args = cli().download_args("https://youtu.be/x", &config, Path::new("/tmp/job"));

        assert!(has_pair(&args, "-f", "137"));
        assert!(has_pair(&args, "--merge-output-format", "mp4"));
        assert!(has_pair(&args, "--remux-video", "mp4"));
        assert!(!args.contains(&"-x".to_string()));
    }

    #[test]
    fn test_credentials_and_proxy() {
        let config = ExtractorConfig::default()
            .with_credentials(CredentialsSource::CookiesFile {
                path: PathBuf::from("/etc/streamgrab/cookies.txt"),
            })
            .with_proxy(Some("socks5://127.0.0.1:1080".to_string()));
        let args = cli().probe_args("https://youtu.be/x", &config);
        assert!(has_pair(&args, "--cookies", "/etc/streamgrab/cookies.txt"));
        assert!(has_pair(&args, "--proxy", "socks5://127.0.0.1:1080"));

        let browser = ExtractorConfig::default().with_credentials(CredentialsSource::Browser {
            name: "firefox".to_string(),
        });
        let args = cli().probe_args("https://youtu.be/x", &browser);
        assert!(has_pair(&args, "--cookies-from-browser", "firefox"));
        assert!(!args.contains(&"--cookies".to_string()));
    }

    #[test]
    fn test_python_mode_prefixes_module() {
        let python = CliInfoExtractor::new(ExtractorMode::Python, None, "/opt/venv/bin/python");
        assert_eq!(python.program(), "/opt/venv/bin/python");
        assert_eq!(python.name(), "python-yt-dlp");

        let args = python.probe_args("https://youtu.be/x", &ExtractorConfig::default());
        assert_eq!(args[..3], ["-m".to_string(), "yt_dlp".to_string(), "--dump-json".to_string()]);
    }

    #[test]
    fn test_parse_json_skips_noise() {
        let stdout = b"[info] something\n{\"title\": \"Clip\", \"duration\": 61, \"formats\": []}\n";
        let info = CliInfoExtractor::parse_json(stdout).unwrap();
        assert_eq!(info.title.as_deref(), Some("Clip"));
        assert_eq!(info.duration, Some(61.0));
    }

    #[test]
    fn test_parse_json_without_object() {
        assert!(matches!(
            CliInfoExtractor::parse_json(b"nothing here"),
            Err(DownloadError::Parse(_))
        ));
    }
}
