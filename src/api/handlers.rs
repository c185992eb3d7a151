use axum::{
    body::Body,
    extract::{rejection::FormRejection, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
    Form, Json,
};
use futures::StreamExt;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use super::error::ApiError;
use super::state::AppState;
use crate::relay::{MediaMetadata, RelayError};

/// Form body shared by `/check` and `/download`
#[derive(Debug, Default, Deserialize)]
pub struct MediaRequest {
    pub url: Option<String>,
    pub format: Option<String>,
}

impl MediaRequest {
    fn from_form(form: Result<Form<MediaRequest>, FormRejection>) -> Self {
        match form {
            Ok(Form(request)) => request,
            Err(rejection) => {
                tracing::debug!("Unreadable form body: {}", rejection);
                Self::default()
            }
        }
    }

    fn url(&self) -> Result<&str, RelayError> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(RelayError::MissingInput)
    }
}

async fn advisory_delay(state: &AppState) {
    if !state.config.request_delay.is_zero() {
        tokio::time::sleep(state.config.request_delay).await;
    }
}

pub async fn check_media(
    State(state): State<AppState>,
    form: Result<Form<MediaRequest>, FormRejection>,
) -> Result<Json<MediaMetadata>, ApiError> {
    advisory_delay(&state).await;

    let request = MediaRequest::from_form(form);
    let url = request.url()?;
    tracing::info!("Received check request for URL: {}", url);

    let metadata = state.relay.check(url).await?;
    tracing::info!("Metadata extracted: {:?}", metadata);
    Ok(Json(metadata))
}

pub async fn download_media(
    State(state): State<AppState>,
    form: Result<Form<MediaRequest>, FormRejection>,
) -> Result<Response, ApiError> {
    advisory_delay(&state).await;

    let request = MediaRequest::from_form(form);
    let url = request.url()?;
    let format = request.format.as_deref().unwrap_or("mp4");
    tracing::info!("Received download request for URL: {} (format: {})", url, format);

    let staged = state.relay.download(url, format).await?;
    let filename = staged.suggested_name.clone();
    let content_length = staged.size_bytes;
    tracing::info!("Sending file {:?} as {}", staged.local_path, filename);

    let (file, workspace) = staged.open().await?;
    let body = ReaderStream::new(file).map(move |chunk| {
        // workspace lives as long as the body
        let _workspace = &workspace;
        chunk
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_type_for_filename(&filename)),
    );
    headers.insert(
        CONTENT_LENGTH,
        HeaderValue::from_str(&content_length.to_string())
            .map_err(|_| ApiError::internal("Invalid content length"))?,
    );
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&build_content_disposition(&filename))
            .map_err(|_| ApiError::internal("Invalid download filename"))?,
    );

    Ok((headers, Body::from_stream(body)).into_response())
}

pub fn content_type_for_filename(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

pub fn build_content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitize_ascii_filename(filename),
        urlencoding::encode(filename)
    )
}

fn sanitize_ascii_filename(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')' | '[' | ']')
            {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type_for_filename("a_ABC.mp4"), "video/mp4");
        assert_eq!(content_type_for_filename("Song.MP3"), "audio/mpeg");
        assert_eq!(content_type_for_filename("alice_profile_pic.jpg"), "image/jpeg");
        assert_eq!(content_type_for_filename("noext"), "application/octet-stream");
    }

    #[test]
    fn test_content_disposition_escapes_non_ascii() {
        assert_eq!(
            build_content_disposition("My Song.mp3"),
            "attachment; filename=\"My Song.mp3\"; filename*=UTF-8''My%20Song.mp3"
        );
        let header = build_content_disposition("Café \"live\".mp4");
        assert!(header.starts_with("attachment; filename=\"Caf_ _live_.mp4\""));
        assert!(HeaderValue::from_str(&header).is_ok());
    }

    #[test]
    fn test_blank_url_is_missing_input() {
        let request = MediaRequest {
            url: Some("   ".to_string()),
            format: None,
        };
        assert_eq!(request.url(), Err(RelayError::MissingInput));
    }
}
