use serde::{Deserialize, Serialize};

/// Response from the /upload endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadResponse {
    pub id: String,
}

/// Opaque id the service assigns to an uploaded file. It is embedded in the
/// names of every file produced for the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
}

/// Response from the /convert endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConvertResponse {
    pub files: Vec<ProducedFile>,
}

/// One file the service rendered for a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProducedFile {
    pub format: String,
    /// Contains the job id, e.g. `abc123_32x32.png`.
    pub filename: String,
    #[serde(default)]
    pub imgsizes: Vec<ImageSize>,
    pub download: Download,
}

impl ProducedFile {
    /// Icons are square, so the width is the size.
    pub fn square_size(&self) -> Option<u32> {
        self.imgsizes.first().map(|size| size.width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Download {
    pub uri: String,
}

/// Public iconverticons.com API.
pub const DEFAULT_BASE_URL: &str = "https://iconverticons.com/api";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
