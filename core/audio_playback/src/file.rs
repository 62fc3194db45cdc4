use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use hound::WavReader;

use crate::error::PlaybackError;

/// An audio file on disk.
///
/// `open` captures the container metadata; `read` decodes the whole file into
/// per-frame channel vectors. 16/24/32-bit integer and 32-bit float samples
/// are normalized to `f32`.
#[derive(Debug, Clone)]
pub struct AudioFile {
    path: PathBuf,
    num_channels: usize,
    sample_rate: u32,
    size: u64,
}

impl AudioFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PlaybackError> {
        let path = path.as_ref().to_path_buf();
        let reader = WavReader::open(&path)?;
        let spec = reader.spec();
        let size = fs::metadata(&path).map(|metadata| metadata.len()).unwrap_or(0);
        Ok(Self {
            path,
            num_channels: spec.channels as usize,
            sample_rate: spec.sample_rate,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Decode the entire file.
    pub fn read(&self) -> Result<Vec<Vec<f32>>, PlaybackError> {
        log::debug!("reading audio file {}", self.path.display());
        let reader = WavReader::open(&self.path)?;
        let frames = decode_frames(reader)?;
        log::debug!("finished reading audio file {}", self.path.display());
        Ok(frames)
    }
}

/// Decode all samples from the reader into frames, one `Vec<f32>` per sample
/// instant with one entry per channel.
pub(crate) fn decode_frames<R: Read>(
    reader: WavReader<R>,
) -> Result<Vec<Vec<f32>>, PlaybackError> {
    let spec = reader.spec();
    let num_channels = spec.channels as usize;

    let raw_samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = ((1u64 << (spec.bits_per_sample - 1)) - 1) as f32;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|sample| sample as f32 / scale))
                .collect::<Result<_, _>>()?
        }
        hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
    };

    Ok(raw_samples
        .chunks_exact(num_channels)
        .map(<[f32]>::to_vec)
        .collect())
}
