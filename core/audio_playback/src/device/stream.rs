use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, OutputCallbackInfo, SizedSample};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::device::output::Output;
use crate::error::PlaybackError;
use crate::playback::stream_data::{HeaderField, StreamData};

/// Capacity of the callback-to-control event ring.
const EVENT_RING_CAPACITY: usize = 64;

/// Poll interval while the stream is active.
const ACTIVE_POLL: Duration = Duration::from_micros(100);

/// Minimum wait after pausing for the device to flush buffered frames.
const MIN_DRAIN_WAIT: Duration = Duration::from_millis(50);

/// State transitions observed on the real-time thread, reported to the
/// control thread over a lock-free ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent {
    /// The cursor wrapped back to the start frame.
    Looped { cursor: usize },
    /// A non-looping playback exhausted its range.
    Completed,
    /// The header described no valid range; the stream stopped defensively.
    Aborted { cursor: usize, frame_set_size: usize },
}

/// Flags shared between the control thread and the callback. The callback
/// only ever stores; the control thread only loads.
#[derive(Debug, Default)]
struct StreamStatus {
    finished: AtomicBool,
    aborted: AtomicBool,
}

/// An open connection to an output device, driving the real-time callback
/// that consumes a [`StreamData`] buffer.
pub struct Stream {
    device: cpal::Device,
    latency: f64,
    stream: Option<cpal::Stream>,
    data: Option<Arc<StreamData>>,
    status: Arc<StreamStatus>,
    events: Option<Consumer<StreamEvent>>,
}

impl Stream {
    pub fn new(output: &Output) -> Self {
        Self {
            device: output.device().clone(),
            latency: output.latency(),
            stream: None,
            data: None,
            status: Arc::new(StreamStatus::default()),
            events: None,
        }
    }

    /// Open the device and start delivering the buffer. Returns immediately;
    /// the native audio layer invokes the callback from its own thread.
    pub fn play(
        &mut self,
        sample_rate: u32,
        buffer_size: usize,
        data: Arc<StreamData>,
    ) -> Result<(), PlaybackError> {
        // Tear down any previous playback on this stream.
        self.stream = None;
        self.status = Arc::new(StreamStatus::default());
        let (producer, consumer) = RingBuffer::new(EVENT_RING_CAPACITY);
        self.events = Some(consumer);
        self.data = Some(Arc::clone(&data));

        let supported = self
            .device
            .default_output_config()
            .map_err(|err| PlaybackError::StreamBuild(err.to_string()))?;
        let config = cpal::StreamConfig {
            channels: data.get(HeaderField::ChannelCount) as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Fixed(buffer_size as u32),
        };

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                self.build_output_stream::<f32>(&config, data, producer)?
            }
            cpal::SampleFormat::I16 => {
                self.build_output_stream::<i16>(&config, data, producer)?
            }
            cpal::SampleFormat::U16 => {
                self.build_output_stream::<u16>(&config, data, producer)?
            }
            format => {
                return Err(PlaybackError::StreamBuild(format!(
                    "unsupported sample format '{format}'"
                )));
            }
        };

        stream
            .play()
            .map_err(|err| PlaybackError::StreamStart(err.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn build_output_stream<T>(
        &self,
        config: &cpal::StreamConfig,
        data: Arc<StreamData>,
        mut events: Producer<StreamEvent>,
    ) -> Result<cpal::Stream, PlaybackError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let status = Arc::clone(&self.status);
        let error_status = Arc::clone(&self.status);

        let data_cb = move |out: &mut [T], _: &OutputCallbackInfo| {
            if status.finished.load(Ordering::Relaxed) {
                silence(out);
                return;
            }
            fill_buffer(out, &data, &status, &mut events);
        };
        let error_cb = move |err| {
            log::error!("stream error: {err}");
            error_status.aborted.store(true, Ordering::Relaxed);
            error_status.finished.store(true, Ordering::Relaxed);
        };

        self.device
            .build_output_stream(config, data_cb, error_cb, None)
            .map_err(|err| PlaybackError::StreamBuild(err.to_string()))
    }

    /// Is the stream still delivering frames?
    pub fn active(&self) -> bool {
        self.stream.is_some() && !self.status.finished.load(Ordering::Relaxed)
    }

    /// Block the control thread until playback finishes: fine-grained polling
    /// while the stream is active, then a bounded wait for the device to
    /// flush its last buffer.
    pub fn block(&mut self) -> Result<(), PlaybackError> {
        while self.active() {
            self.drain_events();
            thread::sleep(ACTIVE_POLL);
        }
        self.drain_events();

        // The device layer keeps invoking the callback (delivering silence
        // once `finished` is set) until the stream is paused, so pause first
        // and then wait out the output latency.
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            thread::sleep(drain_wait(self.latency));
        }
        self.drain_events();

        if self.status.aborted.load(Ordering::Relaxed) {
            let (cursor, frame_set_size) = self.data.as_ref().map_or((0, 0), |data| {
                (
                    data.get(HeaderField::Cursor) as usize,
                    data.get(HeaderField::FrameSetSize) as usize,
                )
            });
            return Err(PlaybackError::StreamAbort {
                cursor,
                frame_set_size,
            });
        }
        Ok(())
    }

    fn drain_events(&mut self) {
        let Some(events) = self.events.as_mut() else {
            return;
        };
        while let Ok(event) = events.pop() {
            match event {
                StreamEvent::Looped { cursor } => {
                    log::debug!("stream looped at frame {cursor}");
                }
                StreamEvent::Completed => log::debug!("stream completed"),
                StreamEvent::Aborted {
                    cursor,
                    frame_set_size,
                } => {
                    log::warn!(
                        "stream aborted: cursor {cursor} outside the {frame_set_size} frame range"
                    );
                }
            }
        }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        // The real-time thread must stop before the buffer can be released.
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
        }
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("latency", &self.latency)
            .field("open", &self.stream.is_some())
            .field("finished", &self.status.finished)
            .field("aborted", &self.status.aborted)
            .finish_non_exhaustive()
    }
}

/// How long to wait, after pausing, for frames already handed to the device
/// to reach the output.
fn drain_wait(latency: f64) -> Duration {
    MIN_DRAIN_WAIT.max(Duration::from_secs_f64(latency.max(0.0)))
}

fn silence<T: SizedSample>(out: &mut [T]) {
    for slot in out.iter_mut() {
        *slot = T::EQUILIBRIUM;
    }
}

/// One callback invocation: copy up to a buffer's worth of frames from the
/// stream data into the device buffer, then advance, loop or finish.
///
/// Runs on the real-time thread under a hard deadline; it never allocates,
/// blocks or panics. Anomalies abort the stream instead.
fn fill_buffer<T>(
    out: &mut [T],
    data: &StreamData,
    status: &StreamStatus,
    events: &mut Producer<StreamEvent>,
) where
    T: SizedSample + FromSample<f32>,
{
    let frame_set_size = data.get(HeaderField::FrameSetSize) as usize;
    let channel_count = data.get(HeaderField::ChannelCount) as usize;
    let start_frame = data.get(HeaderField::StartFrame) as usize;
    let end_frame = data.get(HeaderField::EndFrame) as usize;
    let is_looping = data.get(HeaderField::IsLooping) != 0.0;

    if channel_count == 0 {
        silence(out);
        status.aborted.store(true, Ordering::Relaxed);
        status.finished.store(true, Ordering::Relaxed);
        let _ = events.push(StreamEvent::Aborted {
            cursor: 0,
            frame_set_size,
        });
        return;
    }
    let frames_per_buffer = out.len() / channel_count;

    // A freshly-built or reset buffer carries cursor 0; playback begins at
    // the seek point.
    let mut cursor = (data.get(HeaderField::Cursor) as usize).max(start_frame);
    let limit = end_frame.min(frame_set_size);

    let mut available = limit.saturating_sub(cursor);
    if available == 0 && is_looping {
        cursor = start_frame;
        available = limit.saturating_sub(cursor);
        if available > 0 {
            let _ = events.push(StreamEvent::Looped { cursor: limit });
        }
    }
    if available == 0 {
        silence(out);
        status.finished.store(true, Ordering::Relaxed);
        if cursor == limit && !is_looping {
            data.set(HeaderField::IsEof, 1.0);
            let _ = events.push(StreamEvent::Completed);
        } else {
            // Cursor past the data, or a degenerate empty range: stop before
            // reading out of bounds.
            status.aborted.store(true, Ordering::Relaxed);
            let _ = events.push(StreamEvent::Aborted {
                cursor,
                frame_set_size,
            });
        }
        return;
    }

    let take = available.min(frames_per_buffer);
    let samples = data.samples();
    let offset = cursor * channel_count;
    let end = (offset + take * channel_count).min(samples.len());
    let copied = end - offset;

    for (slot, sample) in out.iter_mut().zip(&samples[offset..end]) {
        *slot = T::from_sample(*sample);
    }
    silence(&mut out[copied..]);

    if take < frames_per_buffer {
        // Final partial buffer, silence-padded above.
        if is_looping {
            data.set(HeaderField::Cursor, start_frame as f32);
            let _ = events.push(StreamEvent::Looped {
                cursor: cursor + take,
            });
        } else {
            data.set(HeaderField::Cursor, (cursor + take) as f32);
            data.set(HeaderField::IsEof, 1.0);
            status.finished.store(true, Ordering::Relaxed);
            let _ = events.push(StreamEvent::Completed);
        }
    } else {
        data.set(HeaderField::Cursor, (cursor + take) as f32);
    }
}
