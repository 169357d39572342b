//! Media library filesystem gateway.
//!
//! Translates stored database paths into mount paths and performs file
//! teardown. Failures never cross this boundary as errors; every deletion
//! reports a structured outcome.

mod fs_library;
mod types;

pub use fs_library::FsLibrary;
pub use types::*;
