//! Download daemon abstraction.
//!
//! This module provides a `DownloadClient` trait for the torrent daemon the
//! pipeline downloads through. Failures never cross this boundary as errors;
//! every operation reports a structured outcome.

mod disabled;
mod transmission;
mod types;

pub use disabled::DisabledDownloadClient;
pub use transmission::TransmissionClient;
pub use types::*;
