/// Default number of frames delivered per callback invocation.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Fallback output latency in seconds; the host does not report one.
pub const DEFAULT_LATENCY: f64 = 0.1;

/// Tolerance for floating-point sample comparisons in tests.
pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-6;
