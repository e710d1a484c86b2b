// Performance metrics module
//
// Lightweight counters for monitoring engine activity. Uses atomic
// operations for thread-safe tracking without locks; collected over the
// engine's lifetime and logged periodically or on shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Engine activity counters.
#[derive(Debug)]
pub struct Metrics {
    /// Text evaluations that ran against the trigger catalogue
    pub triggers_evaluated: AtomicU64,

    /// Individual trigger matches across all evaluations
    pub triggers_matched: AtomicU64,

    /// Effect handlers started
    pub effects_started: AtomicU64,

    /// Effect handlers stopped (dismissal, eviction or self-close)
    pub effects_stopped: AtomicU64,

    /// Messages withheld from the chat pipeline by a blocking trigger
    pub messages_blocked: AtomicU64,

    /// Clicks fed into click-burst counters
    pub clicks_recorded: AtomicU64,

    /// Click streaks that completed and fired a trigger
    pub click_streaks_completed: AtomicU64,

    /// Engine start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            triggers_evaluated: AtomicU64::new(0),
            triggers_matched: AtomicU64::new(0),
            effects_started: AtomicU64::new(0),
            effects_stopped: AtomicU64::new(0),
            messages_blocked: AtomicU64::new(0),
            clicks_recorded: AtomicU64::new(0),
            click_streaks_completed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record one evaluation pass and how many triggers it matched.
    pub fn record_evaluation(&self, matched: usize) {
        self.triggers_evaluated.fetch_add(1, Ordering::Relaxed);
        self.triggers_matched
            .fetch_add(matched as u64, Ordering::Relaxed);
    }

    pub fn record_effect_started(&self) {
        self.effects_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_effect_stopped(&self) {
        self.effects_stopped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_message_blocked(&self) {
        self.messages_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_click(&self) {
        self.clicks_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_click_streak(&self) {
        self.click_streaks_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Engine Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Triggers: {} evaluations, {} matches",
            self.triggers_evaluated.load(Ordering::Relaxed),
            self.triggers_matched.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Effects: {} started, {} stopped",
            self.effects_started.load(Ordering::Relaxed),
            self.effects_stopped.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Input: {} clicks ({} streaks), {} messages blocked",
            self.clicks_recorded.load(Ordering::Relaxed),
            self.click_streaks_completed.load(Ordering::Relaxed),
            self.messages_blocked.load(Ordering::Relaxed)
        );
    }

    /// Log periodic metrics (for long-running sessions)
    pub fn log_periodic(&self) {
        tracing::info!(
            "Metrics: {} evaluations, {} effects started, uptime {:.0}s",
            self.triggers_evaluated.load(Ordering::Relaxed),
            self.effects_started.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
