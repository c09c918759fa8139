//! Sound output without an audio device.

use barbell_core::{SoundPort, Tone};
use barbell_types::PlatformIndex;
use tracing::info;

/// Reports each tone in the log; stands in for a speaker on headless
/// platform servers.
#[derive(Debug, Clone, Copy)]
pub struct LoggedSound {
    platform: PlatformIndex,
}

impl LoggedSound {
    pub fn new(platform: PlatformIndex) -> Self {
        Self { platform }
    }
}

impl SoundPort for LoggedSound {
    fn emit(&self, tone: &Tone) {
        match tone {
            Tone::Sample(name) => info!(platform = self.platform.0, sample = *name, "playing sound"),
            Tone::Beep {
                frequency_hz,
                duration,
                ..
            } => info!(platform = self.platform.0, frequency_hz = *frequency_hz, ?duration, "playing tone"),
        }
    }
}
