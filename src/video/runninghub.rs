//! RunningHub video provider.
//!
//! Talks to the `rhart-video-s` OpenAPI family: a binary upload endpoint for
//! reference images, text-to-video and image-to-video submit endpoints, and a
//! per-task status endpoint. All calls use bearer authentication.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info};
use vidforge_common::TaskId;

use crate::config::{Config, ProviderConfig};

use super::error::{Result, VideoError};
use super::image::{compress_for_upload, decode_image_input};
use super::poll::{interpret_status, PollOptions, TaskResponse};
use super::types::{ImageInput, PollState, Submission, SubmissionKind, SubmitRequest, VideoConfig};
use super::validate::validate_video_config;
use super::VideoProvider;

/// Fully resolved endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub image_to_video: String,
    pub text_to_video: String,
    /// Contains an `{id}` placeholder.
    pub query: String,
    pub upload: String,
}

impl Endpoints {
    /// Resolve URLs from config.
    ///
    /// Explicit `*_url` settings win over the legacy pipe-separated
    /// `endpoints` string, which wins over the defaults built from `base_url`.
    /// `pro` selects the `-pro` submit endpoints.
    pub fn resolve(config: &ProviderConfig, pro: bool) -> Self {
        let base = config.base_url.trim_end_matches('/');
        let suffix = if pro { "-pro" } else { "" };

        let legacy: Vec<&str> = config
            .endpoints
            .as_deref()
            .map(|s| s.split('|').map(str::trim).collect())
            .unwrap_or_default();
        let legacy_part = |i: usize| {
            legacy
                .get(i)
                .copied()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            image_to_video: config
                .image_to_video_url
                .clone()
                .or_else(|| legacy_part(0))
                .unwrap_or_else(|| {
                    format!("{base}/openapi/v2/rhart-video-s/image-to-video{suffix}")
                }),
            text_to_video: config
                .text_to_video_url
                .clone()
                .or_else(|| legacy_part(1))
                .unwrap_or_else(|| format!("{base}/openapi/v2/rhart-video-s/text-to-video{suffix}")),
            query: config
                .query_url
                .clone()
                .or_else(|| legacy_part(2))
                .unwrap_or_else(|| format!("{base}/openapi/v2/rhart-video-s/{{id}}")),
            upload: config
                .upload_url
                .clone()
                .unwrap_or_else(|| format!("{base}/openapi/v2/media/upload/binary")),
        }
    }

    pub fn submit_url(&self, kind: SubmissionKind) -> &str {
        match kind {
            SubmissionKind::TextToVideo => &self.text_to_video,
            SubmissionKind::ImageToVideo => &self.image_to_video,
        }
    }

    pub fn query_url(&self, task_id: &TaskId) -> String {
        self.query.replace("{id}", task_id.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default = "missing_code")]
    code: i64,
    #[serde(default)]
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    #[serde(default)]
    download_url: Option<String>,
}

fn missing_code() -> i64 {
    -1
}

/// Read a response body, turning non-2xx statuses and unparseable JSON into
/// the error produced by `wrap`.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    wrap: fn(String) -> VideoError,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(wrap(format!("HTTP {}: {}", status, body)));
    }

    serde_json::from_str(&body).map_err(|e| wrap(format!("unexpected response ({}): {}", e, body)))
}

pub struct RunningHubProvider {
    client: Client,
    config: ProviderConfig,
    poll: PollOptions,
    max_upload_bytes: usize,
}

impl RunningHubProvider {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.provider.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            config: config.provider.clone(),
            poll: PollOptions::from(&config.polling),
            max_upload_bytes: config.upload.max_bytes,
        }
    }

    fn authorization(&self) -> Result<String> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(format!("Bearer {}", key)),
            _ => Err(VideoError::MissingApiKey),
        }
    }

    /// Shrink the image if needed and upload it, returning its download URL.
    pub async fn upload_image(&self, image: &ImageInput, endpoints: &Endpoints) -> Result<String> {
        let authorization = self.authorization()?;

        let raw = match image {
            ImageInput::Encoded(encoded) => decode_image_input(encoded)?,
            ImageInput::Bytes(bytes) => bytes.clone(),
        };
        let original_size = raw.len();
        let max_bytes = self.max_upload_bytes;
        let compressed =
            tokio::task::spawn_blocking(move || compress_for_upload(&raw, max_bytes)).await??;

        info!(
            original_size,
            upload_size = compressed.bytes.len(),
            quality = ?compressed.quality,
            "Uploading reference image"
        );

        let part = Part::bytes(compressed.bytes)
            .file_name("image.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&endpoints.upload)
            .header(AUTHORIZATION, authorization)
            .multipart(form)
            .send()
            .await?;

        let upload: UploadResponse = read_json(response, VideoError::Upload).await?;
        match upload.data.and_then(|d| d.download_url) {
            Some(url) if upload.code == 0 && !url.is_empty() => Ok(url),
            url => Err(VideoError::Upload(format!(
                "code {}, download_url {:?}",
                upload.code, url
            ))),
        }
    }
}

#[async_trait]
impl VideoProvider for RunningHubProvider {
    fn name(&self) -> &str {
        "runninghub"
    }

    fn poll_options(&self) -> PollOptions {
        self.poll
    }

    async fn submit(&self, input: &VideoConfig) -> Result<Submission> {
        let authorization = self.authorization()?;
        let plan = validate_video_config(input)?;
        let endpoints = Endpoints::resolve(&self.config, plan.model.pro);

        let image_url = match plan.kind {
            SubmissionKind::ImageToVideo => {
                let image = input
                    .images
                    .first()
                    .ok_or_else(|| VideoError::invalid("missing reference image"))?;
                Some(self.upload_image(image, &endpoints).await?)
            }
            SubmissionKind::TextToVideo => None,
        };

        let request = SubmitRequest {
            prompt: input.prompt.clone(),
            duration: input.duration.to_string(),
            aspect_ratio: input.aspect_ratio,
            image_url,
        };

        let url = endpoints.submit_url(plan.kind);
        debug!(url, kind = ?plan.kind, model = plan.model.name, "Submitting generation task");

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, authorization)
            .json(&request)
            .send()
            .await?;

        let task: TaskResponse = read_json(response, VideoError::Submit).await?;

        if task.status == "FAILED" {
            return Err(VideoError::Submit(task.error_message().to_string()));
        }

        if task.status == "SUCCESS" {
            if let Some(video_url) = task.video_url() {
                return Ok(Submission::Completed {
                    task_id: task.task_id(),
                    video_url: video_url.to_string(),
                });
            }
        }

        let task_id = task
            .task_id()
            .ok_or_else(|| VideoError::Submit("response carried no task id".to_string()))?;

        info!(task_id = %task_id, status = %task.status, "Task submitted");
        Ok(Submission::Pending { task_id })
    }

    async fn query(&self, task_id: &TaskId) -> Result<PollState> {
        let authorization = self.authorization()?;
        let url = Endpoints::resolve(&self.config, false).query_url(task_id);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        let task: TaskResponse = read_json(response, VideoError::Query).await?;
        interpret_status(&task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = ProviderConfig::default();
        let pro = Endpoints::resolve(&config, true);
        assert_eq!(
            pro.text_to_video,
            "https://www.runninghub.cn/openapi/v2/rhart-video-s/text-to-video-pro"
        );
        assert_eq!(
            pro.image_to_video,
            "https://www.runninghub.cn/openapi/v2/rhart-video-s/image-to-video-pro"
        );
        assert_eq!(
            pro.upload,
            "https://www.runninghub.cn/openapi/v2/media/upload/binary"
        );

        let standard = Endpoints::resolve(&config, false);
        assert!(standard.text_to_video.ends_with("/text-to-video"));
        assert_eq!(
            standard.query_url(&TaskId::from("123")),
            "https://www.runninghub.cn/openapi/v2/rhart-video-s/123"
        );
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = ProviderConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..ProviderConfig::default()
        };
        let endpoints = Endpoints::resolve(&config, false);
        assert_eq!(
            endpoints.upload,
            "http://localhost:9000/openapi/v2/media/upload/binary"
        );
    }

    #[test]
    fn test_legacy_endpoint_string() {
        let config = ProviderConfig {
            endpoints: Some("http://a/i2v | http://a/t2v |http://a/q/{id}".to_string()),
            ..ProviderConfig::default()
        };
        let endpoints = Endpoints::resolve(&config, true);
        assert_eq!(endpoints.image_to_video, "http://a/i2v");
        assert_eq!(endpoints.text_to_video, "http://a/t2v");
        assert_eq!(endpoints.query_url(&TaskId::from("9")), "http://a/q/9");
    }

    #[test]
    fn test_explicit_urls_beat_legacy() {
        let config = ProviderConfig {
            endpoints: Some("http://a/i2v||".to_string()),
            image_to_video_url: Some("http://b/i2v".to_string()),
            ..ProviderConfig::default()
        };
        let endpoints = Endpoints::resolve(&config, false);
        assert_eq!(endpoints.image_to_video, "http://b/i2v");
        // Empty legacy slots fall back to defaults.
        assert!(endpoints.text_to_video.ends_with("/text-to-video"));
    }

    #[test]
    fn test_missing_api_key() {
        let provider = RunningHubProvider::new(&Config::default());
        assert!(matches!(
            provider.authorization(),
            Err(VideoError::MissingApiKey)
        ));

        let mut config = Config::default();
        config.provider.api_key = Some("  ".to_string());
        let provider = RunningHubProvider::new(&config);
        assert!(matches!(
            provider.authorization(),
            Err(VideoError::MissingApiKey)
        ));
    }

    #[test]
    fn test_authorization_header() {
        let mut config = Config::default();
        config.provider.api_key = Some("sk-test".to_string());
        let provider = RunningHubProvider::new(&config);
        assert_eq!(provider.authorization().unwrap(), "Bearer sk-test");
    }
}
