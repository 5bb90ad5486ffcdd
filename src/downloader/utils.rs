// Helper functions shared by the engine and the HTTP layer

use std::io::ErrorKind;
use std::process::Stdio;

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::{DownloadError, InputError};

/// Fallback stem when a title sanitizes to nothing
const DEFAULT_STEM: &str = "video";

/// Run command with timeout (shared utility).
///
/// The child is killed when the timer fires or when the returned future is
/// dropped, so an abandoned request does not leave yt-dlp running.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<std::process::Output, DownloadError> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => DownloadError::ToolNotFound(program.to_string()),
            _ => DownloadError::Io(e),
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::Engine(format!("Failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::Engine(format!("Failed to capture stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await?;
        Ok::<Vec<u8>, std::io::Error>(buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await?;
        Ok::<Vec<u8>, std::io::Error>(buf)
    });

    let waited = timeout(Duration::from_secs(timeout_secs), child.wait()).await;
    match waited {
        Ok(status_res) => {
            let status = status_res?;
            let stdout = stdout_task
                .await
                .map_err(|e| DownloadError::Engine(format!("stdout task failed: {}", e)))??;
            let stderr = stderr_task
                .await
                .map_err(|e| DownloadError::Engine(format!("stderr task failed: {}", e)))??;
            Ok(std::process::Output { status, stdout, stderr })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(DownloadError::Timeout(timeout_secs))
        }
    }
}

/// Check a user-supplied URL: trimmed, http(s), with a host
pub fn validate_url(raw: Option<&str>) -> Result<String, InputError> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(InputError::MissingUrl);
    }

    let parsed = url::Url::parse(trimmed).map_err(|_| InputError::InvalidUrl(trimmed.to_string()))?;
    let web_scheme = matches!(parsed.scheme(), "http" | "https");
    if !web_scheme || parsed.host_str().is_none_or(str::is_empty) {
        return Err(InputError::InvalidUrl(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

/// Keep alphanumerics, spaces, hyphens and underscores; trim trailing whitespace
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();

    let trimmed = cleaned.trim_end();
    if trimmed.trim_start().is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `attachment` disposition with an ASCII fallback plus the exact UTF-8 name
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii() && c != '"' && c != '\\' { c } else { '_' })
        .collect();

    if ascii == filename {
        format!("attachment; filename=\"{}\"", filename)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii,
            urlencoding::encode(filename)
        )
    }
}
