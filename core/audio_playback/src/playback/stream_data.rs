use std::sync::atomic::{AtomicU32, Ordering};

use crate::playback::frame_set::FrameSet;
use crate::playback::truncation::Truncation;

/// Number of header slots prefixed to the sample data.
pub const HEADER_FIELDS: usize = 7;

/// Size in bytes of one 32-bit slot.
pub const SLOT_SIZE: usize = size_of::<f32>();

/// The fixed-order control fields at the head of the playback buffer. The
/// discriminant is the field's slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    /// Frame count of the sample region, excluding the header.
    FrameSetSize = 0,
    ChannelCount = 1,
    StartFrame = 2,
    EndFrame = 3,
    IsLooping = 4,
    /// Current playback position. Written only by the real-time callback
    /// while the stream is active.
    Cursor = 5,
    /// Set to 1 exactly once when a non-looping playback exhausts its range.
    /// Written only by the real-time callback while the stream is active.
    IsEof = 6,
}

/// The playback buffer consumed by the real-time callback: a fixed-layout
/// header followed by the interleaved sample data.
///
/// Header slots hold `f32` values in atomic bit-cells so the control thread
/// and the callback can share the block without locks. Correctness relies on
/// a single-writer-per-field discipline, not on the atomics ordering: the
/// control thread writes header fields only before `start()` or in `reset()`
/// between plays, and the callback is the sole mutator of `Cursor` and
/// `IsEof` while active.
#[derive(Debug)]
pub struct StreamData {
    header: [AtomicU32; HEADER_FIELDS],
    samples: Box<[f32]>,
}

impl StreamData {
    pub fn new(
        frame_set: &FrameSet,
        channel_count: usize,
        truncation: Option<Truncation>,
        is_looping: bool,
    ) -> Self {
        let frame_set_size = frame_set.len();
        let (start_frame, end_frame) = truncation
            .map_or((0, frame_set_size), |truncation| {
                (truncation.start_frame, truncation.end_frame)
            });

        let data = Self {
            header: std::array::from_fn(|_| AtomicU32::new(0)),
            samples: frame_set.flatten().into_boxed_slice(),
        };
        data.set(HeaderField::FrameSetSize, frame_set_size as f32);
        data.set(HeaderField::ChannelCount, channel_count as f32);
        data.set(HeaderField::StartFrame, start_frame as f32);
        data.set(HeaderField::EndFrame, end_frame as f32);
        data.set(HeaderField::IsLooping, f32::from(u8::from(is_looping)));
        data
    }

    /// Read a header field.
    pub fn get(&self, field: HeaderField) -> f32 {
        f32::from_bits(self.header[field as usize].load(Ordering::Relaxed))
    }

    /// Write a header field. In-flight callback reads observe the update.
    pub fn set(&self, field: HeaderField, value: f32) {
        self.header[field as usize].store(value.to_bits(), Ordering::Relaxed);
    }

    /// Rewind for replay without reallocating.
    pub fn reset(&self) {
        self.set(HeaderField::Cursor, 0.0);
        self.set(HeaderField::IsEof, 0.0);
    }

    /// The interleaved sample region, channel-major per frame.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Total size of the buffer in bytes, header included. Describes the
    /// logical wire layout (header slots followed by the samples); the two
    /// regions live in separate allocations.
    pub fn data_size(&self) -> usize {
        (HEADER_FIELDS + self.samples.len()) * SLOT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::frame::Frame;

    fn frame_set(frames: &[&[f32]]) -> FrameSet {
        FrameSet::from_frames(frames.iter().map(|frame| Frame::new(frame.to_vec())).collect())
    }

    fn stereo_data(is_looping: bool) -> StreamData {
        let set = frame_set(&[&[0.1, 0.2], &[0.3, 0.4], &[0.5, 0.6]]);
        StreamData::new(&set, 2, None, is_looping)
    }

    #[test]
    fn test_header_seeds_from_frame_set() {
        let data = stereo_data(false);

        assert_eq!(data.get(HeaderField::FrameSetSize), 3.0);
        assert_eq!(data.get(HeaderField::ChannelCount), 2.0);
        assert_eq!(data.get(HeaderField::StartFrame), 0.0);
        assert_eq!(data.get(HeaderField::EndFrame), 3.0);
        assert_eq!(data.get(HeaderField::IsLooping), 0.0);
        assert_eq!(data.get(HeaderField::Cursor), 0.0);
        assert_eq!(data.get(HeaderField::IsEof), 0.0);
    }

    #[test]
    fn test_truncation_seeds_start_and_end() {
        let set = frame_set(&[&[0.0], &[0.1], &[0.2], &[0.3]]);
        let truncation = Truncation {
            start_frame: 1,
            end_frame: 3,
        };
        let data = StreamData::new(&set, 1, Some(truncation), true);

        assert_eq!(data.get(HeaderField::StartFrame), 1.0);
        assert_eq!(data.get(HeaderField::EndFrame), 3.0);
        assert_eq!(data.get(HeaderField::IsLooping), 1.0);
    }

    #[test]
    fn test_data_size_counts_header_and_samples() {
        // 3 frames x 2 channels + 7 header slots, 4 bytes each.
        let data = stereo_data(false);
        assert_eq!(data.data_size(), (3 * 2 + 7) * 4);
    }

    #[test]
    fn test_samples_are_interleaved_after_the_header() {
        let data = stereo_data(false);
        assert_eq!(data.samples(), &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_reset_rewinds_cursor_and_eof_only() {
        let data = stereo_data(false);
        data.set(HeaderField::Cursor, 3.0);
        data.set(HeaderField::IsEof, 1.0);

        data.reset();

        assert_eq!(data.get(HeaderField::Cursor), 0.0);
        assert_eq!(data.get(HeaderField::IsEof), 0.0);
        assert_eq!(data.get(HeaderField::FrameSetSize), 3.0);
        assert_eq!(data.get(HeaderField::EndFrame), 3.0);
    }
}
