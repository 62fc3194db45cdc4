/// One sample instant across all channels.
///
/// The length always equals the owning frame set's declared channel count
/// once conforming has run.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame(Vec<f32>);

impl Frame {
    pub fn new(samples: Vec<f32>) -> Self {
        Self(samples)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.0
    }

    /// Shrink to the first `num` channels. Dropped channels are discarded,
    /// not averaged.
    pub fn truncate(&mut self, num: usize) {
        self.0.truncate(num);
    }

    /// Grow to `num` channels by replicating the last existing channel's
    /// value into the new slots.
    pub fn fill(&mut self, num: usize) {
        let last = self.0.last().copied().unwrap_or(0.0);
        self.0.resize(num, last);
    }

    /// Rebuild the frame as `num` zeroed channels, then write the source
    /// value for each requested channel index. An index past the source
    /// falls back to the first source channel.
    pub fn fill_for_channels(&mut self, num: usize, channels: &[usize]) {
        let values = std::mem::take(&mut self.0);
        self.0 = vec![0.0; num];
        for &channel in channels {
            let value = values
                .get(channel)
                .or_else(|| values.first())
                .copied()
                .unwrap_or(0.0);
            if let Some(slot) = self.0.get_mut(channel) {
                *slot = value;
            }
        }
    }
}

impl From<Vec<f32>> for Frame {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_leading_channels() {
        let mut frame = Frame::new(vec![0.1, 0.2, 0.3]);
        frame.truncate(2);
        assert_eq!(frame.samples(), &[0.1, 0.2]);
    }

    #[test]
    fn test_fill_duplicates_last_channel() {
        let mut frame = Frame::new(vec![0.1, 0.2]);
        frame.fill(4);
        assert_eq!(frame.samples(), &[0.1, 0.2, 0.2, 0.2]);
    }

    #[test]
    fn test_fill_for_channels_scatters_and_zeroes_the_rest() {
        let mut frame = Frame::new(vec![0.5, 0.7]);
        frame.fill_for_channels(4, &[1, 3]);
        assert_eq!(frame.samples(), &[0.0, 0.7, 0.0, 0.5]);
    }

    #[test]
    fn test_fill_for_channels_falls_back_to_first_source_channel() {
        let mut frame = Frame::new(vec![0.5]);
        frame.fill_for_channels(2, &[1]);
        assert_eq!(frame.samples(), &[0.0, 0.5]);
    }
}
