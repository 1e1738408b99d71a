//! Audio upload to the transcription/response backend

use crate::config::AppConfig;
use crate::error::{Result, VoiceFlowError};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// File name the backend sees for an uploaded recording
pub const UPLOAD_FILE_NAME: &str = "recorded_audio.wav";

/// Multipart field carrying the audio file
pub const UPLOAD_FIELD: &str = "file";

/// Mime type assumed when the backend omits one
pub const DEFAULT_REPLY_MIME: &str = "audio/mpeg";

/// A finalized recording ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl EncodedAudio {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: UPLOAD_FILE_NAME.to_string(),
            mime_type: "audio/wav".to_string(),
        }
    }
}

/// Audio the backend answered with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Sends a recording to the backend and returns its spoken reply
///
/// One attempt per call. Failures are reported as `UploadFailed` and never
/// retried here.
pub trait AudioUploader: Send + Sync {
    fn upload(&self, audio: EncodedAudio) -> BoxFuture<'static, Result<UploadedAudio>>;
}

/// Multipart POST to a fixed endpoint
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    endpoint: String,
}

impl HttpUploader {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoiceFlowError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.upload_url.clone(), config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(client: Client, endpoint: String, audio: EncodedAudio) -> Result<UploadedAudio> {
        let size = audio.bytes.len();
        let part = Part::bytes(audio.bytes)
            .file_name(audio.file_name)
            .mime_str(&audio.mime_type)
            .map_err(|e| VoiceFlowError::UploadFailed(format!("Invalid mime type: {}", e)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!("Uploading {} bytes to {}", size, endpoint);
        let response = client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VoiceFlowError::UploadFailed("Request timed out".to_string())
                } else {
                    VoiceFlowError::UploadFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upload rejected with status {}", status);
            return Err(VoiceFlowError::UploadFailed(format!(
                "Server responded with {}",
                status
            )));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .unwrap_or_else(|| DEFAULT_REPLY_MIME.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VoiceFlowError::UploadFailed(format!("Failed to read response: {}", e)))?;

        debug!("Received {} bytes of {}", bytes.len(), mime_type);
        Ok(UploadedAudio {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}

impl AudioUploader for HttpUploader {
    fn upload(&self, audio: EncodedAudio) -> BoxFuture<'static, Result<UploadedAudio>> {
        Self::send(self.client.clone(), self.endpoint.clone(), audio).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_wav_metadata() {
        let audio = EncodedAudio::wav(vec![1, 2, 3]);
        assert_eq!(audio.file_name, "recorded_audio.wav");
        assert_eq!(audio.mime_type, "audio/wav");
    }

    #[test]
    fn test_uploader_from_default_config() {
        let uploader = HttpUploader::from_config(&AppConfig::default()).unwrap();
        assert_eq!(uploader.endpoint(), "http://localhost:8000/upload-audio/");
    }

    #[test]
    fn test_unreachable_endpoint_is_upload_failure() {
        // Port 9 (discard) is closed on test hosts
        let uploader = HttpUploader::new("http://127.0.0.1:9/upload", Duration::from_secs(2)).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let result = runtime.block_on(uploader.upload(EncodedAudio::wav(vec![0; 8])));
        assert!(matches!(result, Err(VoiceFlowError::UploadFailed(_))));
    }
}
