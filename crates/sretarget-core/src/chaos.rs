//! Chaos engine: per-request fault decisions and deferred process exit.
//!
//! A single `StdRng` sits behind a mutex so concurrent requests never share an
//! unsynchronized generator. Decisions are cheap; sleeping and short-circuiting
//! are left to the caller (the server's chaos stage).

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Exit code used by the termination trigger.
pub const TERMINATION_EXIT_CODE: i32 = 255;

/// Action run when the termination trigger fires. Defaults to `process::exit`.
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

/// Fault-injection knobs, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosSettings {
    /// Upper bound (inclusive) of the injected delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Probability in `[0, 1]` of answering with an injected 500.
    pub error_rate: f64,
}

impl Default for ChaosSettings {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ChaosSettings {
    /// Build settings, clamping the error rate into `[0, 1]` (NaN becomes 0).
    pub fn new(max_delay_ms: u64, error_rate: f64) -> Self {
        Self {
            max_delay_ms,
            error_rate: clamp_rate(error_rate),
        }
    }

    pub fn disabled() -> Self {
        Self {
            max_delay_ms: 0,
            error_rate: 0.0,
        }
    }

    /// Whether the chaos stage belongs in the pipeline at all.
    pub fn is_enabled(&self) -> bool {
        self.max_delay_ms > 0 || self.error_rate > 0.0
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Outcome of one roll of the dice. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChaosDecision {
    /// `None` when no delay stage should run (max delay is zero).
    pub delay: Option<Duration>,
    pub inject_error: bool,
}

pub struct ChaosEngine {
    settings: ChaosSettings,
    rng: Mutex<StdRng>,
    exit: ExitHook,
}

impl fmt::Debug for ChaosEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaosEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChaosEngine {
    /// Engine seeded from OS entropy.
    pub fn new(settings: ChaosSettings) -> Self {
        Self::from_rng(settings, StdRng::from_entropy())
    }

    /// Engine with a fixed seed; decisions are reproducible in single-threaded use.
    pub fn with_seed(settings: ChaosSettings, seed: u64) -> Self {
        Self::from_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn from_rng(settings: ChaosSettings, rng: StdRng) -> Self {
        Self {
            settings: ChaosSettings::new(settings.max_delay_ms, settings.error_rate),
            rng: Mutex::new(rng),
            exit: Arc::new(|code| std::process::exit(code)),
        }
    }

    /// Replace the exit action (tests observe the code instead of dying).
    pub fn with_exit_hook(mut self, hook: ExitHook) -> Self {
        self.exit = hook;
        self
    }

    pub fn settings(&self) -> ChaosSettings {
        self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.is_enabled()
    }

    /// Draw a delay and an error verdict for one request.
    pub fn decide(&self) -> ChaosDecision {
        let ChaosSettings {
            max_delay_ms,
            error_rate,
        } = self.settings;

        if max_delay_ms == 0 && error_rate <= 0.0 {
            return ChaosDecision::default();
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let delay = (max_delay_ms > 0)
            .then(|| Duration::from_millis(rng.gen_range(0..=max_delay_ms)));
        let inject_error = error_rate > 0.0 && rng.gen::<f64>() < error_rate;

        ChaosDecision {
            delay,
            inject_error,
        }
    }

    /// Exit the process with [`TERMINATION_EXIT_CODE`] after `delay`.
    ///
    /// Runs on a detached thread so the caller's response can flush first.
    /// Nothing can cancel it once scheduled.
    pub fn trigger_delayed_termination(&self, delay: Duration) {
        let exit = Arc::clone(&self.exit);
        let spawned = thread::Builder::new()
            .name("sretarget-terminator".into())
            .spawn(move || {
                thread::sleep(delay);
                tracing::warn!(
                    code = TERMINATION_EXIT_CODE,
                    "termination requested, exiting process"
                );
                exit(TERMINATION_EXIT_CODE);
            });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to schedule termination, exiting now");
            (self.exit)(TERMINATION_EXIT_CODE);
        }
    }
}
