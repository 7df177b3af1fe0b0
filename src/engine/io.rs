//! Recording file I/O
//!
//! Recordings are exchanged as WAV files. Imports accept any PCM or float
//! WAV and convert to mono 16-bit; exports always write 16-bit PCM.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use sha2::{Digest, Sha256};

use crate::engine::buffer::{f32_to_i16, SampleBuffer};
use crate::error::{AudioQualityError, Result};

/// Import a WAV recording as a mono 16-bit buffer
///
/// Multi-channel files keep only channel 0.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the integer bit depth is not 8, 16, 24 or 32
/// * `EmptyAudio` - If the file holds no samples
pub fn import_recording(path: &Path) -> Result<SampleBuffer> {
    if !path.exists() {
        return Err(AudioQualityError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| AudioQualityError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    let interleaved = read_samples_as_i16(reader, spec.bits_per_sample, spec.sample_format)?;

    let buffer = SampleBuffer::from_interleaved(&interleaved, channels, 0, spec.sample_rate)?;
    if buffer.is_empty() {
        return Err(AudioQualityError::EmptyAudio);
    }

    log::debug!(
        "imported {} ({} samples, {:.3} s, {} ch @ {} Hz, peak {})",
        path.display(),
        buffer.len(),
        buffer.duration(),
        channels,
        spec.sample_rate,
        buffer.peak()
    );

    Ok(buffer)
}

/// Export a mono recording as 16-bit PCM WAV
pub fn export_recording(buffer: &SampleBuffer, path: &Path) -> Result<()> {
    export_interleaved(&buffer.samples, 1, buffer.sample_rate, path)
}

/// Export interleaved 16-bit samples as PCM WAV
pub fn export_interleaved(
    samples: &[i16],
    channels: u16,
    sample_rate: u32,
    path: &Path,
) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_io_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(wav_io_error)?;
    }
    writer.finalize().map_err(wav_io_error)?;

    Ok(())
}

/// SHA-256 digest of a file as lowercase hex
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| AudioQualityError::FileNotFound {
        path: path.display().to_string(),
        source: Some(e),
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn wav_io_error(e: hound::Error) -> AudioQualityError {
    match e {
        hound::Error::IoError(io) => AudioQualityError::Io(io),
        other => AudioQualityError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    }
}

/// Read samples from WAV reader and convert to i16 full scale
fn read_samples_as_i16<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<i16>> {
    let invalid = |bits: &str, e: hound::Error| AudioQualityError::InvalidAudio {
        reason: format!("Failed to read {} samples: {}", bits, e),
        source: Some(Box::new(e)),
    };

    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f32_to_i16))
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(|e| invalid("float", e)),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| (v as i16) << 8))
                .collect::<std::result::Result<Vec<i16>, _>>()
                .map_err(|e| invalid("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .collect::<std::result::Result<Vec<i16>, _>>()
                .map_err(|e| invalid("16-bit", e)),
            // 24-bit stored as i32 in hound
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> 8) as i16))
                .collect::<std::result::Result<Vec<i16>, _>>()
                .map_err(|e| invalid("24-bit", e)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> 16) as i16))
                .collect::<std::result::Result<Vec<i16>, _>>()
                .map_err(|e| invalid("32-bit int", e)),
            _ => Err(AudioQualityError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}
