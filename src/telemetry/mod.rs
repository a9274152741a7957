//! Telemetry for TriageBuddy
//!
//! Global `tracing` subscriber setup and the per-request audit trail.

use std::time::Instant;

use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::types::{StepLog, StepMeta};

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Only the first call in a
/// process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// Parse a configured level name, defaulting to INFO
pub fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}

/// Level after applying `-v` flags on top of the configured level
pub fn level_with_verbosity(base: Level, verbose: u8) -> Level {
    match verbose {
        0 => base,
        1 if base < Level::DEBUG => Level::DEBUG,
        1 => base,
        _ => Level::TRACE,
    }
}

/// Append-only audit trail for one pipeline run
#[derive(Debug)]
pub struct AuditTrail {
    steps: Vec<StepLog>,
    start_time: Instant,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Append a milestone and emit it as an INFO event
    pub fn record(&mut self, meta: StepMeta) {
        let log = StepLog::from(meta);
        let action = serde_json::to_value(log.action)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let meta_json = serde_json::to_string(&log.meta).unwrap_or_default();

        info!(step = self.steps.len() + 1, action = %action, meta = %meta_json, "Pipeline step");
        self.steps.push(log);
    }

    /// Milliseconds since the trail was opened
    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[StepLog] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<StepLog> {
        self.steps
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}
