use crate::playback::frame::Frame;
use crate::playback::frame_set::FrameSet;

/// Mixes the frame sets of concurrently-playing sounds into one averaged
/// frame set.
///
/// Sources may have unequal length; the output is as long as the longest.
/// Every channel total is divided by the total source count, not the count of
/// sources still contributing at that index, so a sound that has already
/// ended keeps diluting the mix amplitude.
#[derive(Debug)]
pub struct Mixer {
    data: Vec<FrameSet>,
    length: usize,
    depth: usize,
}

impl Mixer {
    /// Mix multiple sounds at equal amplitude.
    pub fn mix(sounds_data: Vec<FrameSet>) -> FrameSet {
        Self::new(sounds_data).mixed()
    }

    pub fn new(data: Vec<FrameSet>) -> Self {
        let length = data.iter().map(FrameSet::len).max().unwrap_or(0);
        let depth = data.len();
        Self {
            data,
            length,
            depth,
        }
    }

    fn mixed(&self) -> FrameSet {
        let frames = (0..self.length).map(|index| self.mix_frame(index)).collect();
        FrameSet::from_frames(frames)
    }

    /// All source frames still present at the given index.
    fn frames(&self, index: usize) -> impl Iterator<Item = &Frame> {
        self.data.iter().filter_map(move |set| set.frames().get(index))
    }

    fn mix_frame(&self, index: usize) -> Frame {
        let num_channels = self.frames(index).map(Frame::len).max().unwrap_or(0);
        let mut totals = vec![0.0f32; num_channels];
        for frame in self.frames(index) {
            for (total, sample) in totals.iter_mut().zip(frame.samples()) {
                *total += sample;
            }
        }
        for total in &mut totals {
            *total /= self.depth as f32;
        }
        Frame::new(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_set(frames: &[&[f32]]) -> FrameSet {
        FrameSet::from_frames(frames.iter().map(|frame| Frame::new(frame.to_vec())).collect())
    }

    #[test]
    fn test_mix_averages_by_total_source_count() {
        let a = frame_set(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let b = frame_set(&[&[7.0, 8.0], &[9.0, 10.0]]);

        let mixed = Mixer::mix(vec![a, b]);

        assert_eq!(mixed.len(), 3);
        assert_eq!(mixed.frames()[0].samples(), &[4.0, 5.0]);
        assert_eq!(mixed.frames()[1].samples(), &[6.0, 7.0]);
        // The shorter source has ended, yet the divisor stays 2: the tail of
        // the longer sound plays at half amplitude.
        assert_eq!(mixed.frames()[2].samples(), &[2.5, 3.0]);
    }

    #[test]
    fn test_single_source_passes_through() {
        let a = frame_set(&[&[0.2, 0.4], &[0.6, 0.8]]);
        let mixed = Mixer::mix(vec![a.clone()]);
        assert_eq!(mixed, a);
    }

    #[test]
    fn test_output_length_is_longest_source() {
        let a = frame_set(&[&[1.0]]);
        let b = frame_set(&[&[1.0], &[1.0], &[1.0], &[1.0]]);
        let mixed = Mixer::mix(vec![a, b]);
        assert_eq!(mixed.len(), 4);
    }

    #[test]
    fn test_mixing_nothing_yields_empty_set() {
        let mixed = Mixer::mix(Vec::new());
        assert!(mixed.is_empty());
    }
}
