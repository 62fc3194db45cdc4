use std::path::Path;

use crate::error::PlaybackError;
use crate::file::AudioFile;

/// Decoded audio data for one sound, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Sound {
    file: Option<AudioFile>,
    num_channels: usize,
    sample_rate: u32,
    data: Vec<Vec<f32>>,
}

impl Sound {
    /// Load and decode a sound from the given file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PlaybackError> {
        let file = AudioFile::open(path)?;
        let data = file.read()?;
        let sound = Self {
            num_channels: file.num_channels(),
            sample_rate: file.sample_rate(),
            file: Some(file),
            data,
        };
        sound.report();
        Ok(sound)
    }

    /// Wrap already-decoded frames, one channel vector per sample instant.
    pub fn from_frames(data: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            file: None,
            num_channels: data.first().map_or(0, Vec::len),
            sample_rate,
            data,
        }
    }

    pub fn file(&self) -> Option<&AudioFile> {
        self.file.as_ref()
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames in the sound.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[Vec<f32>] {
        &self.data
    }

    fn report(&self) {
        if let Some(file) = &self.file {
            log::debug!(
                "loaded {}: {} channels, {} Hz, {} frames, {} bytes",
                file.path().display(),
                self.num_channels,
                self.sample_rate,
                self.data.len(),
                file.size()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_frames_reads_channel_count_from_data() {
        let sound = Sound::from_frames(vec![vec![0.1, 0.2], vec![0.3, 0.4]], 44100);
        assert_eq!(sound.num_channels(), 2);
        assert_eq!(sound.size(), 2);
        assert_eq!(sound.sample_rate(), 44100);
        assert!(sound.file().is_none());
    }

    #[test]
    fn test_empty_sound_has_no_channels() {
        let sound = Sound::from_frames(Vec::new(), 22050);
        assert_eq!(sound.num_channels(), 0);
        assert_eq!(sound.size(), 0);
    }
}
