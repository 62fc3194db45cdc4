use std::fmt;

/// An output device target.
///
/// Read-only from the playback engine's perspective; the channel count and
/// latency drive channel conforming and the post-playback drain wait.
#[derive(Clone)]
pub struct Output {
    id: usize,
    name: String,
    channel_count: usize,
    latency: f64,
    device: cpal::Device,
}

impl Output {
    pub(crate) fn new(
        id: usize,
        name: String,
        channel_count: usize,
        latency: f64,
        device: cpal::Device,
    ) -> Self {
        Self {
            id,
            name,
            channel_count,
            latency,
            device,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of channels the device supports.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Device latency in seconds.
    pub fn latency(&self) -> f64 {
        self.latency
    }

    pub fn set_latency(&mut self, latency: f64) {
        self.latency = latency;
    }

    pub(crate) fn device(&self) -> &cpal::Device {
        &self.device
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("channel_count", &self.channel_count)
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}
