use std::sync::Arc;

use timecode::Position;
use uuid::Uuid;

use crate::constants::DEFAULT_BUFFER_SIZE;
use crate::device::output::Output;
use crate::device::stream::Stream;
use crate::error::PlaybackError;
use crate::playback::frame_set::FrameSet;
use crate::playback::mixer::Mixer;
use crate::playback::stream_data::StreamData;
use crate::playback::truncation::Truncation;
use crate::sound::Sound;

pub mod frame;
pub mod frame_set;
pub mod mixer;
pub mod stream_data;
pub mod truncation;

/// Options recognized by [`Playback::new`]. Validated exhaustively at
/// construction; unset fields fall back to the defaults documented per field.
#[derive(Debug, Clone, Default)]
pub struct PlaybackOptions {
    /// Frames delivered per callback invocation. Defaults to 4096.
    pub buffer_size: Option<usize>,
    /// Direct audio to these output channel indices instead of all channels.
    pub channels: Option<Vec<usize>>,
    /// Start playback at this position.
    pub seek: Option<Position>,
    /// Play for this long, starting at the seek point. Takes precedence over
    /// `end_position`.
    pub duration: Option<Position>,
    /// Stop playback at this position.
    pub end_position: Option<Position>,
    /// Wrap back to the start (or seek point) instead of ending.
    pub is_looping: bool,
    /// Override the output's reported latency in seconds.
    pub latency: Option<f64>,
}

/// One playback request: sounds conformed to the output's channel layout,
/// mixed if necessary, packaged into a [`StreamData`] buffer and driven
/// through a [`Stream`].
#[derive(Debug)]
pub struct Playback {
    id: Uuid,
    sounds: Vec<Sound>,
    output: Output,
    num_channels: usize,
    channels: Option<Vec<usize>>,
    truncation: Option<Truncation>,
    is_looping: bool,
    buffer_size: usize,
    sample_rate: u32,
    data: Arc<StreamData>,
    stream: Stream,
}

impl Playback {
    /// Build and immediately start a playback.
    pub fn play(
        sounds: Vec<Sound>,
        output: &Output,
        options: PlaybackOptions,
    ) -> Result<Self, PlaybackError> {
        let mut playback = Self::new(sounds, output, options)?;
        playback.start()?;
        Ok(playback)
    }

    /// Validate the options against the output device and build the playback
    /// buffer. No stream resource is touched until [`start`](Self::start);
    /// every validation error is raised here.
    pub fn new(
        sounds: Vec<Sound>,
        output: &Output,
        options: PlaybackOptions,
    ) -> Result<Self, PlaybackError> {
        if sounds.is_empty() {
            return Err(PlaybackError::NoSounds);
        }

        let (num_channels, channels) = resolve_channels(
            options.channels,
            output.channel_count(),
            output.name(),
        )?;

        let sample_rate = sounds[0].sample_rate();
        if sounds.iter().any(|sound| sound.sample_rate() != sample_rate) {
            log::warn!("mixing sounds with differing sample rates; using {sample_rate} Hz");
        }

        let frame_set = build_frame_set(&sounds, num_channels, channels.as_deref(), output);
        let truncation = Truncation::resolve(
            options.seek,
            options.duration,
            options.end_position,
            sample_rate,
            frame_set.len(),
        )?;
        let data = Arc::new(StreamData::new(
            &frame_set,
            output.channel_count(),
            truncation,
            options.is_looping,
        ));

        let mut output = output.clone();
        if let Some(latency) = options.latency {
            output.set_latency(latency);
        }
        let stream = Stream::new(&output);

        Ok(Self {
            id: Uuid::new_v4(),
            sounds,
            output,
            num_channels,
            channels,
            truncation,
            is_looping: options.is_looping,
            buffer_size: options.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE),
            sample_rate,
            data,
            stream,
        })
    }

    /// Hand the buffer to the stream and return immediately.
    pub fn start(&mut self) -> Result<(), PlaybackError> {
        log::info!(
            "playback {} starting on {} ({} channels)",
            self.id,
            self.output.name(),
            self.output.channel_count()
        );
        self.stream
            .play(self.sample_rate, self.buffer_size, Arc::clone(&self.data))
    }

    /// Block until the stream finishes.
    pub fn block(&mut self) -> Result<(), PlaybackError> {
        self.stream.block()
    }

    pub fn active(&self) -> bool {
        self.stream.active()
    }

    /// Rewind the buffer so the next [`start`](Self::start) replays it.
    pub fn reset(&self) {
        self.data.reset();
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Resolved channel count for this playback.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Explicitly requested output channel indices, if any.
    pub fn channels(&self) -> Option<&[usize]> {
        self.channels.as_deref()
    }

    pub fn truncation(&self) -> Option<Truncation> {
        self.truncation
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn data(&self) -> &StreamData {
        &self.data
    }

    /// Total size of the playback buffer in bytes, header included.
    pub fn data_size(&self) -> usize {
        self.data.data_size()
    }
}

/// Resolve the requested channel layout against the device: an explicit
/// request keeps its (deduplicated) indices, otherwise playback targets every
/// device channel.
fn resolve_channels(
    request: Option<Vec<usize>>,
    output_channels: usize,
    output_name: &str,
) -> Result<(usize, Option<Vec<usize>>), PlaybackError> {
    let Some(request) = request else {
        return Ok((output_channels, None));
    };

    let mut channels: Vec<usize> = Vec::with_capacity(request.len());
    for channel in request {
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }

    if channels.len() > output_channels || channels.iter().any(|&channel| channel >= output_channels)
    {
        return Err(PlaybackError::InvalidChannels {
            available: output_channels,
            device: output_name.to_owned(),
        });
    }
    Ok((channels.len(), Some(channels)))
}

/// One conformed frame set per sound, mixed down when more than one sound
/// plays in the same stream.
fn build_frame_set(
    sounds: &[Sound],
    num_channels: usize,
    channels: Option<&[usize]>,
    output: &Output,
) -> FrameSet {
    let mut sets: Vec<FrameSet> = sounds
        .iter()
        .map(|sound| FrameSet::build(sound, num_channels, channels, output.channel_count()))
        .collect();
    if sets.len() == 1 {
        sets.remove(0)
    } else {
        Mixer::mix(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channels_follow_the_output() {
        let (num_channels, channels) = resolve_channels(None, 2, "test output").unwrap();
        assert_eq!(num_channels, 2);
        assert!(channels.is_none());
    }

    #[test]
    fn test_requesting_more_channels_than_available_fails() {
        let result = resolve_channels(Some(vec![0, 1, 2]), 2, "test output");
        assert!(matches!(
            result,
            Err(PlaybackError::InvalidChannels {
                available: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_requesting_an_out_of_range_index_fails() {
        let result = resolve_channels(Some(vec![2]), 2, "test output");
        assert!(matches!(result, Err(PlaybackError::InvalidChannels { .. })));
    }

    #[test]
    fn test_requested_channels_are_deduplicated_in_order() {
        let (num_channels, channels) =
            resolve_channels(Some(vec![1, 0, 1]), 2, "test output").unwrap();
        assert_eq!(num_channels, 2);
        assert_eq!(channels.unwrap(), vec![1, 0]);
    }
}
