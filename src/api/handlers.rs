use axum::{
    body::Body,
    extract::{rejection::FormRejection, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderValue,
    },
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;

use super::error::{JsonError, PlainError};
use crate::downloader::utils::{content_disposition, validate_url};
use crate::downloader::{DownloadMode, DownloadRequest, InputError, ProbeResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FormatsForm {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DownloadForm {
    pub url: Option<String>,
    /// "video" (default) or "audio"
    pub format: Option<String>,
    pub format_id: Option<String>,
}

impl DownloadForm {
    fn into_request(self) -> Result<DownloadRequest, InputError> {
        let url = validate_url(self.url.as_deref())?;

        let mode = match self.format.as_deref().map(str::trim) {
            None | Some("") => DownloadMode::Video,
            Some(raw) => raw.parse()?,
        };

        match mode {
            DownloadMode::Audio => Ok(DownloadRequest::audio(url)),
            DownloadMode::Video => {
                let format_id = self
                    .format_id
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .ok_or(InputError::MissingFormatId)?;
                Ok(DownloadRequest::video(url, Some(format_id)))
            }
        }
    }
}

/// A body that is not a urlencoded form counts as an empty one, so the
/// missing fields are reported like any other bad input.
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Unreadable form body: {}", rejection);
            T::default()
        }
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "engine": state.downloader.engine_name(),
    }))
}

/// Title and selectable qualities for a URL
pub async fn get_formats(
    State(state): State<AppState>,
    form: Result<Form<FormatsForm>, FormRejection>,
) -> Result<Json<ProbeResult>, JsonError> {
    let form = form_or_default(form);
    let url = validate_url(form.url.as_deref())?;
    let result = state.downloader.probe(&url).await?;
    Ok(Json(result))
}

/// Stream the finished file back as an attachment
pub async fn download(
    State(state): State<AppState>,
    form: Result<Form<DownloadForm>, FormRejection>,
) -> Result<Response, PlainError> {
    let request = form_or_default(form).into_request()?;
    let media = state.downloader.fetch(&request).await?;

    let disposition = HeaderValue::from_str(&content_disposition(&media.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(media.mime_type)),
        (CONTENT_LENGTH, HeaderValue::from(media.content_length)),
        (CONTENT_DISPOSITION, disposition),
    ];

    // Scratch directory goes away once the body stream is dropped
    let body = Body::from_stream(ReaderStream::new(media.stream));
    Ok((headers, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(url: Option<&str>, format: Option<&str>, format_id: Option<&str>) -> DownloadForm {
        DownloadForm {
            url: url.map(String::from),
            format: format.map(String::from),
            format_id: format_id.map(String::from),
        }
    }

    #[test]
    fn test_audio_ignores_format_id() {
        let request = form(Some("https://youtu.be/x"), Some("audio"), Some("22"))
            .into_request()
            .unwrap();
        assert_eq!(request, DownloadRequest::audio("https://youtu.be/x"));
    }

    #[test]
    fn test_missing_format_means_video() {
        let request = form(Some("https://youtu.be/x"), None, Some(" 22 "))
            .into_request()
            .unwrap();
        assert_eq!(
            request,
            DownloadRequest::video("https://youtu.be/x", Some("22".to_string()))
        );
    }

    #[test]
    fn test_video_requires_format_id() {
        assert_eq!(
            form(Some("https://youtu.be/x"), Some("video"), Some("")).into_request(),
            Err(InputError::MissingFormatId)
        );
    }

    #[test]
    fn test_unknown_mode() {
        assert_eq!(
            form(Some("https://youtu.be/x"), Some("flac"), None).into_request(),
            Err(InputError::UnknownMode("flac".to_string()))
        );
    }

    #[test]
    fn test_url_checked_first() {
        assert_eq!(
            form(None, Some("flac"), None).into_request(),
            Err(InputError::MissingUrl)
        );
    }
}
