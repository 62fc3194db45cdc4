pub mod constants;
pub mod device;
pub mod error;
pub mod file;
pub mod playback;
pub mod sound;

pub use error::PlaybackError;
pub use playback::{Playback, PlaybackOptions};
pub use sound::Sound;
pub use timecode::Position;
