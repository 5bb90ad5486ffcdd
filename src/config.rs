use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::downloader::extractors::{CredentialsSource, ExtractorConfig, ExtractorMode, NetworkOptions};
use crate::downloader::{CatalogPolicy, RetrievalSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub engine: EngineSettings,
    pub catalog: CatalogPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub listen: String,
    /// Parent of the per-request temp directories; OS temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".to_string(),
            scratch_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub mode: ExtractorMode,
    /// Explicit yt-dlp binary; auto-detected when unset
    pub ytdlp_path: Option<String>,
    /// Interpreter for `ExtractorMode::Python`
    pub python: String,
    pub probe_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub socket_timeout_secs: u32,
    pub skip_streaming_protocols: bool,
    pub check_certificates: bool,
    pub proxy: Option<String>,
    pub credentials: CredentialsSource,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Cli,
            ytdlp_path: None,
            python: "python3".to_string(),
            probe_timeout_secs: 60,
            fetch_timeout_secs: 1800,
            socket_timeout_secs: 30,
            skip_streaming_protocols: true,
            check_certificates: false,
            proxy: None,
            credentials: CredentialsSource::None,
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/streamgrab/config.toml` (or the platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("streamgrab").join("config.toml"))
    }

    /// Load from `path`, or from the default location if a file is there.
    /// An explicit path that cannot be read is an error; a missing default is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let origin = path.display().to_string();
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: origin.clone(),
            source,
        })?;
        tracing::info!("Loading config from {}", origin);
        Self::from_toml(&text, &origin)
    }

    pub fn from_toml(text: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(listen) = get("STREAMGRAB_LISTEN") {
            self.server.listen = listen;
        }
        if let Some(dir) = get("STREAMGRAB_SCRATCH_DIR") {
            self.server.scratch_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = get("YTDLP_PATH") {
            self.engine.ytdlp_path = Some(path);
        }
        // e.g. export YTDLP_PYTHON="/path/to/venv/bin/python"
        if let Some(python) = get("YTDLP_PYTHON") {
            self.engine.python = python;
        }
    }

    pub fn retrieval_settings(&self) -> RetrievalSettings {
        let engine = &self.engine;
        let base = ExtractorConfig {
            network: NetworkOptions {
                credentials: engine.credentials.clone(),
                proxy: engine.proxy.clone(),
                socket_timeout_secs: engine.socket_timeout_secs,
            },
            skip_streaming_protocols: engine.skip_streaming_protocols,
            check_certificates: engine.check_certificates,
            ..ExtractorConfig::default()
        };

        RetrievalSettings {
            base,
            catalog: self.catalog,
            scratch_root: self.server.scratch_dir.clone(),
            probe_timeout_secs: engine.probe_timeout_secs,
            fetch_timeout_secs: engine.fetch_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::FilterPolicy;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("", "inline").unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:5000");
        assert_eq!(config.engine.mode, ExtractorMode::Cli);
        assert_eq!(config.engine.credentials, CredentialsSource::None);
        assert_eq!(config.catalog, CatalogPolicy::default());
    }

    #[test]
    fn test_full_file() {
        let text = r#"
            [server]
            listen = "0.0.0.0:8080"
            scratch_dir = "/var/tmp"

            [engine]
            mode = "python"
            python = "/opt/venv/bin/python"
            fetch_timeout_secs = 600
            check_certificates = true
            proxy = "socks5://127.0.0.1:1080"
            credentials = { kind = "browser", name = "firefox" }

            [catalog]
            policy = "video_only"
            common_heights_only = false
        "#;
        let config = Config::from_toml(text, "inline").unwrap();

        assert_eq!(config.server.scratch_dir, Some(PathBuf::from("/var/tmp")));
        assert_eq!(config.engine.mode, ExtractorMode::Python);
        assert_eq!(config.engine.probe_timeout_secs, 60);
        assert_eq!(
            config.engine.credentials,
            CredentialsSource::Browser {
                name: "firefox".to_string()
            }
        );
        assert_eq!(config.catalog.policy, FilterPolicy::VideoOnly);
        assert!(!config.catalog.common_heights_only);

        let settings = config.retrieval_settings();
        assert_eq!(settings.fetch_timeout_secs, 600);
        assert!(settings.base.check_certificates);
        assert_eq!(settings.base.network.proxy.as_deref(), Some("socks5://127.0.0.1:1080"));
    }

    #[test]
    fn test_cookies_file_credentials() {
        let text = r#"
            [engine]
            credentials = { kind = "cookies_file", path = "/etc/streamgrab/cookies.txt" }
        "#;
        let config = Config::from_toml(text, "inline").unwrap();
        assert_eq!(
            config.engine.credentials,
            CredentialsSource::CookiesFile {
                path: PathBuf::from("/etc/streamgrab/cookies.txt")
            }
        );
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let err = Config::from_toml("[engine]\nmode = \"java\"", "bad.toml").unwrap_err();
        assert!(err.to_string().starts_with("Invalid config 'bad.toml'"));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nlisten = \"0.0.0.0:7000\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:7000");
        assert_eq!(config.engine.python, "python3");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STREAMGRAB_LISTEN", "0.0.0.0:9000"),
            ("YTDLP_PATH", "/usr/local/bin/yt-dlp"),
            ("YTDLP_PYTHON", "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert_eq!(config.engine.ytdlp_path.as_deref(), Some("/usr/local/bin/yt-dlp"));
        assert_eq!(config.engine.python, "python3");
    }
}
