//! Zoom REST API client for cloud recording lookups.
//!
//! Fetches recording metadata for a meeting and downloads its caption track.
//! Calls authenticate with a per-user access token supplied by the caller,
//! so the client itself holds no credentials.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, PipelineErrorKind};
use chrono::{DateTime, Utc};
use log::*;
use serde::Deserialize;

/// Zoom's declared type for caption-track attachments.
const TRANSCRIPT_FILE_TYPE: &str = "TRANSCRIPT";

/// Cloud recording metadata for a single meeting.
#[derive(Debug, Deserialize)]
pub struct RecordingResponse {
    pub id: i64,
    pub uuid: String,
    #[serde(default)]
    pub topic: Option<String>,
    pub start_time: DateTime<Utc>,
    /// Meeting duration in minutes.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub recording_files: Vec<RecordingFile>,
}

/// One file attached to a cloud recording.
#[derive(Debug, Deserialize, Clone)]
pub struct RecordingFile {
    pub id: String,
    pub file_type: String,
    #[serde(default)]
    pub file_extension: Option<String>,
    pub download_url: String,
}

impl RecordingResponse {
    /// Returns the caption-track attachment, if the recording has one.
    pub fn caption_file(&self) -> Option<&RecordingFile> {
        self.recording_files
            .iter()
            .find(|file| file.file_type == TRANSCRIPT_FILE_TYPE)
    }
}

/// Zoom API client.
pub struct ZoomClient {
    client: reqwest::Client,
    base_url: String,
}

impl ZoomClient {
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Fetch recording metadata for a meeting.
    pub async fn get_meeting_recordings(
        &self,
        access_token: &str,
        zoom_meeting_id: &str,
    ) -> Result<RecordingResponse, Error> {
        let url = format!("{}/meetings/{}/recordings", self.base_url, zoom_meeting_id);

        debug!("Fetching Zoom recordings for meeting {}", zoom_meeting_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to fetch Zoom recordings: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        match response.status().as_u16() {
            200 => response.json().await.map_err(|e| {
                warn!("Failed to parse Zoom recordings response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Zoom".to_string(),
                    )),
                }
            }),
            401 => Err(Error::pipeline(PipelineErrorKind::InvalidCredentials)),
            404 => Err(Error::pipeline(PipelineErrorKind::MeetingNotFound)),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("Zoom API returned {}: {}", status, error_text);
                Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
                })
            }
        }
    }

    /// Download a recording file's contents as text.
    pub async fn download_file(
        &self,
        access_token: &str,
        download_url: &str,
    ) -> Result<String, Error> {
        let response = self
            .client
            .get(download_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to download Zoom recording file: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            })?;

        match response.status().as_u16() {
            200 => response.text().await.map_err(|e| {
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                }
            }),
            401 => Err(Error::pipeline(PipelineErrorKind::InvalidCredentials)),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("Zoom download returned {}: {}", status, error_text);
                Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_body(server_url: &str) -> String {
        serde_json::json!({
            "id": 123456789,
            "uuid": "abc==",
            "topic": "Sprint Planning",
            "start_time": "2024-01-15T10:00:00Z",
            "duration": 45,
            "recording_files": [
                {
                    "id": "file-1",
                    "file_type": "MP4",
                    "file_extension": "MP4",
                    "download_url": format!("{server_url}/download/video")
                },
                {
                    "id": "file-2",
                    "file_type": "TRANSCRIPT",
                    "file_extension": "VTT",
                    "download_url": format!("{server_url}/download/captions")
                }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn fetches_recordings_and_locates_the_caption_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/meetings/123456789/recordings")
            .match_header("authorization", "Bearer zoom-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(recording_body(&server.url()))
            .create_async()
            .await;

        let client = ZoomClient::new(&server.url()).unwrap();
        let recording = client
            .get_meeting_recordings("zoom-token", "123456789")
            .await
            .unwrap();

        assert_eq!(recording.topic.as_deref(), Some("Sprint Planning"));
        assert_eq!(recording.duration, Some(45));

        let caption = recording.caption_file().expect("caption file present");
        assert_eq!(caption.id, "file-2");
    }

    #[tokio::test]
    async fn expired_token_fails_with_invalid_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/meetings/123456789/recordings")
            .with_status(401)
            .create_async()
            .await;

        let client = ZoomClient::new(&server.url()).unwrap();
        let err = client
            .get_meeting_recordings("stale-token", "123456789")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Pipeline(PipelineErrorKind::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn unknown_meeting_fails_with_meeting_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/meetings/999/recordings")
            .with_status(404)
            .create_async()
            .await;

        let client = ZoomClient::new(&server.url()).unwrap();
        let err = client
            .get_meeting_recordings("zoom-token", "999")
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Pipeline(PipelineErrorKind::MeetingNotFound)
        );
    }

    #[tokio::test]
    async fn downloads_caption_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/download/captions")
            .match_header("authorization", "Bearer zoom-token")
            .with_status(200)
            .with_body("WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nHello world\n")
            .create_async()
            .await;

        let client = ZoomClient::new(&server.url()).unwrap();
        let url = format!("{}/download/captions", server.url());
        let body = client.download_file("zoom-token", &url).await.unwrap();

        assert!(body.starts_with("WEBVTT"));
    }

    #[test]
    fn missing_caption_file_is_none() {
        let recording = RecordingResponse {
            id: 1,
            uuid: "u".to_string(),
            topic: None,
            start_time: Utc::now(),
            duration: None,
            recording_files: vec![],
        };
        assert!(recording.caption_file().is_none());
    }
}
