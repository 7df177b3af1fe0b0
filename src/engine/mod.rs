//! Audio Engine Module
//!
//! Recording storage and file I/O:
//! - Mono 16-bit recording buffer
//! - WAV import/export
//! - File digests for reports

pub mod buffer;
pub mod io;

pub use buffer::SampleBuffer;
pub use io::{export_interleaved, export_recording, file_sha256, import_recording};
