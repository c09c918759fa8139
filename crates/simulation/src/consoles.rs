//! Simulated officials' consoles with deterministic latency, loss and
//! disconnection.

use barbell_types::PlatformIndex;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Device an official input is entered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Console {
    Announcer,
    Timekeeper,
    /// Referee keypad, `0..3`.
    Referee(usize),
    Marshal,
    Jury,
}

impl fmt::Display for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Console::Announcer => write!(f, "announcer"),
            Console::Timekeeper => write!(f, "timekeeper"),
            Console::Referee(index) => write!(f, "referee-{}", index + 1),
            Console::Marshal => write!(f, "marshal"),
            Console::Jury => write!(f, "jury"),
        }
    }
}

/// Configuration for simulated consoles.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base delay between an input being entered and the field of play
    /// receiving it.
    pub latency: Duration,
    /// Jitter as a fraction of base latency (0.0 - 1.0).
    pub jitter_fraction: f64,
    /// Input loss rate (0.0 - 1.0). Inputs are dropped with this probability.
    pub loss_rate: f64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(50),
            jitter_fraction: 0.1,
            loss_rate: 0.0,
        }
    }
}

impl ConsoleConfig {
    /// Inputs arrive the instant they are entered.
    pub fn instant() -> Self {
        Self {
            latency: Duration::ZERO,
            jitter_fraction: 0.0,
            loss_rate: 0.0,
        }
    }
}

/// Simulated consoles for deterministic input delivery.
///
/// Supports:
/// - Configurable latency with jitter
/// - Input loss (probabilistic drops)
/// - Disconnected consoles (every input from the device is dropped)
#[derive(Debug)]
pub struct SimulatedConsoles {
    config: ConsoleConfig,
    disconnected: HashSet<(PlatformIndex, Console)>,
}

impl SimulatedConsoles {
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config,
            disconnected: HashSet::new(),
        }
    }

    // ─── Disconnection ───

    pub fn is_disconnected(&self, platform: PlatformIndex, console: Console) -> bool {
        self.disconnected.contains(&(platform, console))
    }

    pub fn disconnect(&mut self, platform: PlatformIndex, console: Console) {
        self.disconnected.insert((platform, console));
    }

    pub fn reconnect(&mut self, platform: PlatformIndex, console: Console) {
        self.disconnected.remove(&(platform, console));
    }

    pub fn reconnect_all(&mut self) {
        self.disconnected.clear();
    }

    pub fn disconnected_count(&self) -> usize {
        self.disconnected.len()
    }

    // ─── Input Loss ───

    /// Returns true if an input should be dropped.
    pub fn should_drop_input(&self, rng: &mut ChaCha8Rng) -> bool {
        self.config.loss_rate > 0.0 && rng.gen::<f64>() < self.config.loss_rate
    }

    pub fn set_loss_rate(&mut self, rate: f64) {
        self.config.loss_rate = rate.clamp(0.0, 1.0);
    }

    pub fn loss_rate(&self) -> f64 {
        self.config.loss_rate
    }

    // ─── Delivery ───

    /// `None` if the input is lost, otherwise the delay before the field of
    /// play receives it.
    pub fn should_deliver(
        &self,
        platform: PlatformIndex,
        console: Console,
        rng: &mut ChaCha8Rng,
    ) -> Option<Duration> {
        if self.is_disconnected(platform, console) {
            return None;
        }
        if self.should_drop_input(rng) {
            return None;
        }
        Some(self.sample_latency(rng))
    }

    pub fn sample_latency(&self, rng: &mut ChaCha8Rng) -> Duration {
        let base = self.config.latency;
        if base.is_zero() || self.config.jitter_fraction <= 0.0 {
            return base;
        }

        let jitter_range = base.as_secs_f64() * self.config.jitter_fraction;
        let jitter = rng.gen_range(-jitter_range..jitter_range);
        let latency_secs = (base.as_secs_f64() + jitter).max(0.001);

        Duration::from_secs_f64(latency_secs)
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }
}
