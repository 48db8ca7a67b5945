use futures::Stream;
use futures::TryStreamExt;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tokio::fs::File;
use url::Url;

use super::models::{ApiConfig, ConvertResponse, JobHandle, ProducedFile, UploadResponse};
use crate::domain::OutputType;

/// Multipart field the upload endpoint reads the image from.
const UPLOAD_FIELD: &str = "files[]";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// One `(token, "0" | "1")` pair per output type the service knows about.
/// The service does not treat a missing flag as disabled, so every type is
/// listed, in allow-list order.
pub fn encode_type_flags(requested: &[OutputType]) -> Vec<(String, &'static str)> {
    OutputType::all()
        .into_iter()
        .map(|output| {
            let flag = if requested.contains(&output) { "1" } else { "0" };
            (output.to_string(), flag)
        })
        .collect()
}

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn base_url(&self) -> Result<Url> {
        // A trailing slash keeps the last path segment when joining.
        let mut base = self.config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        Ok(Url::parse(&base)?)
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        Ok(self.base_url()?.join(name)?)
    }

    /// Download locations may be absolute or relative to the API host.
    pub fn resolve_download_url(&self, uri: &str) -> Result<Url> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.base_url()?.join(uri)?),
            Err(e) => Err(e.into()),
        }
    }

    /// Step 1: Upload the source image, streamed straight from the file
    /// Returns the job handle used by every later request
    pub async fn upload(&self, file_name: &str, file: File, length: u64) -> Result<JobHandle> {
        let url = self.endpoint("upload")?;
        debug!("uploading {} ({} bytes) to {}", file_name, length, url);

        let form = Form::new().part(
            UPLOAD_FIELD,
            Part::stream_with_length(file, length).file_name(file_name.to_string()),
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Upload request failed: {}", e)))?;

        let json: UploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        if json.id.is_empty() {
            return Err(ApiError::InvalidResponse(
                "upload response has an empty id".to_string(),
            ));
        }

        Ok(JobHandle { id: json.id })
    }

    /// Step 2: Ask the service to render the requested outputs
    /// Returns every file the service produced for the job
    pub async fn convert(
        &self,
        job: &JobHandle,
        requested: &[OutputType],
    ) -> Result<Vec<ProducedFile>> {
        let url = self.endpoint("convert")?;

        let mut query: Vec<(String, &str)> = vec![
            ("id".to_string(), job.id.as_str()),
            ("output".to_string(), "json"),
        ];
        query.extend(encode_type_flags(requested));

        let response = self
            .client
            .get(url)
            .query(&query)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Convert request failed: {}", e)))?;

        debug!("convert request sent to {}", response.url());

        let json: ConvertResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(json.files)
    }

    /// Step 3: Download a produced file as a stream of chunks
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_uri: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let url = self.resolve_download_url(download_uri)?;

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}
