//! Test doubles and fixtures shared by unit and integration tests.

mod mock_download_client;
mod mock_library;

pub mod fixtures;

pub use mock_download_client::MockDownloadClient;
pub use mock_library::MockLibrary;
