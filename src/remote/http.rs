//! HTTP implementation of the remote service boundary

use std::time::Duration;

use async_trait::async_trait;

use super::{QueryAnswer, RemoteService, UploadFile};
use crate::audio::AudioClip;
use crate::{Error, Result, Stage};

/// Response from `/api/stt`
#[derive(serde::Deserialize)]
struct SttResponse {
    text: String,
}

/// Response from `/api/query`
#[derive(serde::Deserialize)]
struct QueryResponse {
    answer: String,
    #[serde(default)]
    sources: Vec<String>,
}

/// Response from `/api/upload`
#[derive(serde::Deserialize)]
struct UploadResponse {
    files: Vec<String>,
}

#[derive(serde::Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(serde::Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
}

/// Stateless HTTP client for the backend API
///
/// One reqwest client, one base URL, no retries and no auth.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL
    ///
    /// `timeout` bounds each request; `None` reproduces the transport
    /// default (effectively unbounded).
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Map a transport failure to the stage it occurred in
fn transport_err(stage: Stage, e: &reqwest::Error) -> Error {
    tracing::error!(%stage, error = %e, "request failed");
    Error::Service {
        stage,
        message: e.to_string(),
    }
}

/// Convert a non-2xx response into a stage error carrying the body
async fn status_err(stage: Stage, response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(%stage, %status, body = %body, "API error");
    Error::Service {
        stage,
        message: format!("{status}: {body}"),
    }
}

fn decode_err(stage: Stage, e: &reqwest::Error) -> Error {
    tracing::error!(%stage, error = %e, "failed to decode response");
    Error::MalformedResponse {
        stage,
        message: e.to_string(),
    }
}

#[async_trait]
impl RemoteService for ApiClient {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String> {
        tracing::debug!(audio_bytes = clip.bytes.len(), "starting transcription");

        let part = reqwest::multipart::Part::bytes(clip.bytes.clone())
            .file_name("recording.wav")
            .mime_str(&clip.mime)
            .map_err(|e| Error::Service {
                stage: Stage::Stt,
                message: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new().part("audio", part);

        let response = self
            .client
            .post(self.url("/api/stt"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_err(Stage::Stt, &e))?;

        if !response.status().is_success() {
            return Err(status_err(Stage::Stt, response).await);
        }

        let result: SttResponse = response
            .json()
            .await
            .map_err(|e| decode_err(Stage::Stt, &e))?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }

    async fn query(&self, text: &str) -> Result<QueryAnswer> {
        tracing::debug!(query = %text, "dispatching query");

        let response = self
            .client
            .post(self.url("/api/query"))
            .json(&QueryRequest { query: text })
            .send()
            .await
            .map_err(|e| transport_err(Stage::Query, &e))?;

        if !response.status().is_success() {
            return Err(status_err(Stage::Query, response).await);
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| decode_err(Stage::Query, &e))?;

        tracing::info!(sources = result.sources.len(), "query answered");
        Ok(QueryAnswer {
            answer: result.answer,
            sources: result.sources,
        })
    }

    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        tracing::debug!(chars = text.len(), "starting synthesis");

        let response = self
            .client
            .post(self.url("/api/tts"))
            .json(&TtsRequest { text })
            .send()
            .await
            .map_err(|e| transport_err(Stage::Tts, &e))?;

        if !response.status().is_success() {
            return Err(status_err(Stage::Tts, response).await);
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/wav")
            .to_string();

        let audio = response
            .bytes()
            .await
            .map_err(|e| transport_err(Stage::Tts, &e))?;

        tracing::info!(audio_bytes = audio.len(), "synthesis complete");
        Ok(AudioClip::new(audio.to_vec(), mime))
    }

    async fn upload_documents(&self, files: &[UploadFile]) -> Result<Vec<String>> {
        tracing::debug!(count = files.len(), "uploading documents");

        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(file.name.clone());
            form = form.part("files", part);
        }

        let response = self
            .client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_err(Stage::Upload, &e))?;

        if !response.status().is_success() {
            return Err(status_err(Stage::Upload, response).await);
        }

        let result: UploadResponse = response
            .json()
            .await
            .map_err(|e| decode_err(Stage::Upload, &e))?;

        tracing::info!(files = ?result.files, "upload complete");
        Ok(result.files)
    }

    async fn delete_document(&self, filename: &str) -> Result<()> {
        tracing::debug!(filename, "deleting document");

        let path = format!("/api/documents/{}", urlencoding::encode(filename));
        let response = self
            .client
            .delete(self.url(&path))
            .send()
            .await
            .map_err(|e| transport_err(Stage::Delete, &e))?;

        if !response.status().is_success() {
            return Err(status_err(Stage::Delete, response).await);
        }

        tracing::info!(filename, "document deleted");
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        self.client
            .get(self.url("/api/health"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = ApiClient::new("http://localhost:3000/", None).unwrap();
        assert_eq!(client.url("/api/health"), "http://localhost:3000/api/health");
    }

    #[test]
    fn test_delete_path_is_escaped() {
        let encoded = urlencoding::encode("notes & drafts.pdf");
        assert_eq!(encoded, "notes%20%26%20drafts.pdf");
    }

    #[test]
    fn test_query_response_defaults_missing_sources() {
        let parsed: QueryResponse = serde_json::from_str(r#"{"answer":"hi"}"#).unwrap();
        assert_eq!(parsed.answer, "hi");
        assert!(parsed.sources.is_empty());
    }
}
