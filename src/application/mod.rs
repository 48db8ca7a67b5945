pub mod download_coordinator;
pub mod selector;

pub use download_coordinator::DownloadCoordinator;
