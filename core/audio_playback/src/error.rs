use thiserror::Error;

/// Everything that can go wrong between loading a sound and draining the
/// output stream. Validation variants are raised at construction time, before
/// any stream resource is allocated; `StreamAbort` is the only error that
/// originates on the real-time thread.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("only {available} channels available on {device} output")]
    InvalidChannels { available: usize, device: String },

    #[error("invalid truncation: end position {end}s is not after seek position {seek}s")]
    InvalidTruncation { seek: f64, end: f64 },

    #[error(transparent)]
    InvalidTime(#[from] timecode::InvalidTime),

    #[error("failed to decode audio file: {0}")]
    Decode(#[from] hound::Error),

    #[error("no sounds to play")]
    NoSounds,

    #[error("no output device found")]
    DeviceNotFound,

    #[error("failed to query output devices: {0}")]
    DeviceQuery(String),

    #[error("failed to build output stream: {0}")]
    StreamBuild(String),

    #[error("failed to start output stream: {0}")]
    StreamStart(String),

    #[error("stream aborted: cursor {cursor} outside the {frame_set_size} frame playback range")]
    StreamAbort { cursor: usize, frame_set_size: usize },
}
