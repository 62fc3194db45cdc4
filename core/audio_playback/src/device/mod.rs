use cpal::traits::{DeviceTrait, HostTrait};

use crate::constants::DEFAULT_LATENCY;
use crate::error::PlaybackError;

pub mod output;
pub mod stream;

pub use output::Output;
pub use stream::Stream;

/// Process-scoped output device enumeration.
///
/// Scans the host once at construction and owns the resulting list; callers
/// hold a reference instead of reading an implicit singleton.
pub struct Devices {
    outputs: Vec<Output>,
    default_name: Option<String>,
}

impl Devices {
    pub fn new() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let default_name = host
            .default_output_device()
            .and_then(|device| device.name().ok());

        let mut outputs = Vec::new();
        let devices = host
            .output_devices()
            .map_err(|err| PlaybackError::DeviceQuery(err.to_string()))?;
        for (id, device) in devices.enumerate() {
            // Skip devices we cannot open for output at all.
            let Ok(config) = device.default_output_config() else {
                continue;
            };
            let name = device.name().unwrap_or_else(|_| format!("output {id}"));
            outputs.push(Output::new(
                id,
                name,
                config.channels() as usize,
                DEFAULT_LATENCY,
                device,
            ));
        }
        log::debug!("found {} output devices", outputs.len());

        Ok(Self {
            outputs,
            default_name,
        })
    }

    /// All available output devices.
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// The host's default output, or the first available one.
    pub fn default_output(&self) -> Result<&Output, PlaybackError> {
        self.default_name
            .as_deref()
            .and_then(|name| self.by_name(name))
            .or_else(|| self.outputs.first())
            .ok_or(PlaybackError::DeviceNotFound)
    }

    pub fn by_id(&self, id: usize) -> Option<&Output> {
        self.outputs.iter().find(|output| output.id() == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Output> {
        self.outputs.iter().find(|output| output.name() == name)
    }
}

impl std::fmt::Debug for Devices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Devices")
            .field("outputs", &self.outputs)
            .field("default_name", &self.default_name)
            .finish()
    }
}
