use std::path::{Path, PathBuf};

use futures::StreamExt;
use log::{debug, error, info, trace, warn};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

use super::selector::select_files;
use crate::{
    api::{ApiClient, JobHandle, ProducedFile},
    domain::{AppError, ConversionRequest},
    utils::output_filename,
};

/// Runs a conversion from upload to the last written file.
#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Creates the output directory, uploads the input, requests the
    /// conversion and downloads every requested file. Returns the written
    /// paths, sorted.
    pub async fn run(&self, request: &ConversionRequest) -> Result<Vec<PathBuf>, AppError> {
        tokio::fs::create_dir_all(&request.output_dir)
            .await
            .map_err(|e| AppError::io(&request.output_dir, e))?;

        let job = self.upload(&request.input_file).await?;
        info!("Uploaded {}", request.input_file.display());
        debug!("job id: {}", job.id);

        let produced = self.api_client.convert(&job, &request.requested).await?;
        info!("Service produced {} file(s)", produced.len());

        let available: Vec<String> = produced.iter().map(describe).collect();
        let selected = select_files(produced, request);

        if selected.is_empty() {
            warn!(
                "None of the produced files were requested. Produced: {}",
                available.join(", ")
            );
            return Ok(Vec::new());
        }

        self.download_all(&job, selected, request).await
    }

    pub async fn upload(&self, input_file: &Path) -> Result<JobHandle, AppError> {
        let file = tokio::fs::File::open(input_file)
            .await
            .map_err(|e| AppError::io(input_file, e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| AppError::io(input_file, e))?
            .len();
        let file_name = input_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(self.api_client.upload(&file_name, file, length).await?)
    }

    /// Starts every download at once and waits for all of them. One failed
    /// download doesn't stop the others.
    pub async fn download_all(
        &self,
        job: &JobHandle,
        files: Vec<ProducedFile>,
        request: &ConversionRequest,
    ) -> Result<Vec<PathBuf>, AppError> {
        let mut tasks = JoinSet::new();

        for file in files {
            let name = output_filename(&file.filename, &job.id, &request.output_prefix);
            let path = request.output_dir.join(name);
            debug!("{} -> {}", file.download.uri, path.display());

            tasks.spawn(save_file(self.api_client.clone(), file.download.uri, path));
        }

        let mut saved = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(AppError::from).and_then(|result| result) {
                Ok(path) => {
                    info!("Saved {}", path.display());
                    saved.push(path);
                }
                Err(e) => {
                    error!("{}", e);
                    failures.push(e);
                }
            }
        }

        let failed = failures.len();
        match failures.into_iter().next() {
            Some(first) => Err(AppError::Downloads {
                failed,
                first: Box::new(first),
            }),
            None => {
                saved.sort();
                Ok(saved)
            }
        }
    }
}

async fn save_file(client: ApiClient, uri: String, path: PathBuf) -> Result<PathBuf, AppError> {
    let (total, stream) = client.download_file_stream(&uri).await?;
    futures::pin_mut!(stream);

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| AppError::io(&path, e))?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::io(&path, e))?;

        downloaded += chunk.len() as u64;
        match total {
            Some(total) if total > 0 => trace!(
                "{}: {:.1}%",
                path.display(),
                downloaded as f32 / total as f32 * 100.0
            ),
            _ => trace!("{}: {} bytes", path.display(), downloaded),
        }
    }

    file.sync_all()
        .await
        .map_err(|e| AppError::io(&path, e))?;

    Ok(path)
}

fn describe(file: &ProducedFile) -> String {
    match file.square_size() {
        Some(size) => format!("{}{}", file.format, size),
        None => file.format.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::domain::{ErrorKind, OutputType};
    use tempfile::TempDir;

    const CONVERT_BODY: &str = r#"{"files":[
        {"format":"ico","filename":"abc123.ico","imgsizes":[{"width":256,"height":256}],"download":{"uri":"/files/abc123.ico"}},
        {"format":"png","filename":"abc123_32x32.png","imgsizes":[{"width":32,"height":32}],"download":{"uri":"/files/abc123_32x32.png"}},
        {"format":"png","filename":"abc123_512x512.png","imgsizes":[{"width":512,"height":512}],"download":{"uri":"/files/abc123_512x512.png"}}
    ]}"#;

    fn setup(
        server: &mockito::Server,
        dir: &TempDir,
        requested: Vec<OutputType>,
    ) -> (DownloadCoordinator, ConversionRequest) {
        let input_file = dir.path().join("icon.svg");
        std::fs::write(&input_file, b"<svg/>").unwrap();

        let coordinator = DownloadCoordinator::new(ApiClient::new(ApiConfig {
            base_url: server.url(),
        }));
        let request = ConversionRequest {
            input_file,
            requested,
            output_dir: dir.path().join("out").join("icons"),
            output_prefix: "Brand".to_string(),
        };
        (coordinator, request)
    }

    async fn mock_upload_and_convert(
        server: &mut mockito::Server,
    ) -> (mockito::Mock, mockito::Mock) {
        let upload = server
            .mock("POST", "/upload")
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"abc123"}"#)
            .create_async()
            .await;
        let convert = server
            .mock("GET", "/convert")
            .match_query(mockito::Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(CONVERT_BODY)
            .create_async()
            .await;
        (upload, convert)
    }

    #[tokio::test]
    async fn test_run_downloads_only_requested_files() {
        let mut server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let (upload, convert) = mock_upload_and_convert(&mut server).await;
        let png32 = server
            .mock("GET", "/files/abc123_32x32.png")
            .with_body("png-32")
            .create_async()
            .await;
        let ico = server
            .mock("GET", "/files/abc123.ico")
            .expect(0)
            .create_async()
            .await;

        let (coordinator, request) = setup(&server, &dir, vec![OutputType::Png(32)]);
        let saved = coordinator.run(&request).await.unwrap();

        let expected = request.output_dir.join("Brand_32x32.png");
        assert_eq!(saved, vec![expected.clone()]);
        assert_eq!(std::fs::read(&expected).unwrap(), b"png-32");

        upload.assert_async().await;
        convert.assert_async().await;
        png32.assert_async().await;
        ico.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_download_does_not_stop_others() {
        let mut server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let _mocks = mock_upload_and_convert(&mut server).await;
        let _png32 = server
            .mock("GET", "/files/abc123_32x32.png")
            .with_status(404)
            .create_async()
            .await;
        let _png512 = server
            .mock("GET", "/files/abc123_512x512.png")
            .with_body("png-512")
            .create_async()
            .await;
        let _ico = server
            .mock("GET", "/files/abc123.ico")
            .with_body("ico")
            .create_async()
            .await;

        let (coordinator, request) = setup(
            &server,
            &dir,
            vec![OutputType::Ico, OutputType::Png(32), OutputType::Png(512)],
        );
        let err = coordinator.run(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(err, AppError::Downloads { failed: 1, .. }));
        assert_eq!(
            std::fs::read(request.output_dir.join("Brand_512x512.png")).unwrap(),
            b"png-512"
        );
        assert_eq!(
            std::fs::read(request.output_dir.join("Brand.ico")).unwrap(),
            b"ico"
        );
        assert!(!request.output_dir.join("Brand_32x32.png").exists());
    }

    #[tokio::test]
    async fn test_empty_selection_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let _mocks = mock_upload_and_convert(&mut server).await;

        let (coordinator, request) = setup(&server, &dir, vec![OutputType::Hqx]);
        let saved = coordinator.run(&request).await.unwrap();

        assert!(saved.is_empty());
        assert!(request.output_dir.is_dir());
    }

    #[tokio::test]
    async fn test_convert_error_body_is_a_transport_failure() {
        let mut server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let _upload = server
            .mock("POST", "/upload")
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"abc123"}"#)
            .create_async()
            .await;
        let _convert = server
            .mock("GET", "/convert")
            .match_query(mockito::Matcher::Any)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"conversion failed"}"#)
            .create_async()
            .await;

        let (coordinator, request) = setup(&server, &dir, vec![OutputType::Ico]);
        let err = coordinator.run(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_is_an_io_error() {
        let server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let (coordinator, _) = setup(&server, &dir, vec![OutputType::Ico]);

        let err = coordinator
            .upload(&dir.path().join("gone.svg"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Io { .. }));
    }

    #[tokio::test]
    async fn test_upload_failure_stops_pipeline() {
        let mut server = mockito::Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let _upload = server
            .mock("POST", "/upload")
            .with_status(503)
            .create_async()
            .await;
        let convert = server
            .mock("GET", "/convert")
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (coordinator, request) = setup(&server, &dir, vec![OutputType::Ico]);
        let err = coordinator.run(&request).await.unwrap_err();

        assert!(matches!(err, AppError::Transport(_)));
        convert.assert_async().await;
    }
}
