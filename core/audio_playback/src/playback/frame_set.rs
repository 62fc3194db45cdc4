use crate::playback::frame::Frame;
use crate::sound::Sound;

/// The ordered frames of one sound, conformed to the playback's channel
/// layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    data: Vec<Frame>,
}

impl FrameSet {
    /// Conform the sound's frames to the resolved channel layout.
    ///
    /// When the sound already matches the resolved channel count and no
    /// explicit channel map was requested, the data passes through unchanged.
    /// Otherwise frames are grown (duplicate-last, or zero-and-scatter when a
    /// map is given) or shrunk to the output device's channel count.
    pub fn build(
        sound: &Sound,
        num_channels: usize,
        channels: Option<&[usize]>,
        output_channels: usize,
    ) -> Self {
        let mut data: Vec<Frame> = sound.data().iter().cloned().map(Frame::new).collect();

        if sound.num_channels() == num_channels && channels.is_none() {
            return Self { data };
        }

        Self::ensure_num_channels(&mut data, num_channels, None);
        if let Some(channels) = channels {
            Self::ensure_num_channels(&mut data, output_channels, Some(channels));
        } else if num_channels != output_channels {
            Self::ensure_num_channels(&mut data, output_channels, None);
        }
        Self { data }
    }

    pub fn from_frames(data: Vec<Frame>) -> Self {
        Self { data }
    }

    fn ensure_num_channels(data: &mut [Frame], num: usize, channels: Option<&[usize]>) {
        for frame in data.iter_mut() {
            if frame.len() < num {
                match channels {
                    Some(channels) => frame.fill_for_channels(num, channels),
                    None => frame.fill(num),
                }
            } else {
                frame.truncate(num);
            }
        }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.data
    }

    /// Interleave into a single vector: channel-major per frame, frames in
    /// temporal order.
    pub fn flatten(&self) -> Vec<f32> {
        self.data
            .iter()
            .flat_map(|frame| frame.samples().iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_sound() -> Sound {
        Sound::from_frames(vec![vec![0.1, 0.2], vec![0.3, 0.4]], 44100)
    }

    #[test]
    fn test_matching_channels_pass_through_unchanged() {
        let sound = stereo_sound();
        let set = FrameSet::build(&sound, 2, None, 2);

        assert_eq!(set.len(), 2);
        assert_eq!(set.frames()[0].samples(), &[0.1, 0.2]);
        assert_eq!(set.frames()[1].samples(), &[0.3, 0.4]);
    }

    #[test]
    fn test_mono_grows_by_duplicating_last_channel() {
        let sound = Sound::from_frames(vec![vec![0.5], vec![0.25]], 44100);
        let set = FrameSet::build(&sound, 2, None, 2);

        assert_eq!(set.frames()[0].samples(), &[0.5, 0.5]);
        assert_eq!(set.frames()[1].samples(), &[0.25, 0.25]);
    }

    #[test]
    fn test_explicit_channel_map_scatters_with_silence() {
        // Mono sound directed at channel 1 of a stereo output.
        let sound = Sound::from_frames(vec![vec![0.5], vec![0.25]], 44100);
        let set = FrameSet::build(&sound, 1, Some(&[1]), 2);

        assert_eq!(set.frames()[0].samples(), &[0.0, 0.5]);
        assert_eq!(set.frames()[1].samples(), &[0.0, 0.25]);
    }

    #[test]
    fn test_shrinking_truncates_without_averaging() {
        let sound = Sound::from_frames(vec![vec![0.1, 0.2, 0.3, 0.4]], 44100);
        let set = FrameSet::build(&sound, 2, None, 2);

        assert_eq!(set.frames()[0].samples(), &[0.1, 0.2]);
    }

    #[test]
    fn test_every_frame_has_the_resolved_channel_count() {
        let sound = Sound::from_frames(vec![vec![0.1], vec![0.2], vec![0.3]], 44100);
        let set = FrameSet::build(&sound, 4, None, 4);

        assert!(set.frames().iter().all(|frame| frame.len() == 4));
    }

    #[test]
    fn test_flatten_is_channel_major_in_temporal_order() {
        let sound = stereo_sound();
        let set = FrameSet::build(&sound, 2, None, 2);

        assert_eq!(set.flatten(), vec![0.1, 0.2, 0.3, 0.4]);
    }
}
