use std::time::{Duration, Instant};

/// Debounced-burst detector for repeated clicks on one logical target.
///
/// A click landing more than the window after the previous one resets the
/// streak to 1; otherwise the streak grows. Reaching the target count
/// reports a fire and resets to 0. There is no cooldown after a fire
/// beyond the natural reset-on-timeout behavior.
#[derive(Debug, Clone)]
pub struct ClickCounter {
    trigger_id: String,
    target_count: u32,
    window: Duration,
    count: u32,
    last_click: Option<Instant>,
}

impl ClickCounter {
    pub fn new(trigger_id: impl Into<String>, target_count: u32, window: Duration) -> Self {
        Self {
            trigger_id: trigger_id.into(),
            target_count: target_count.max(1),
            window,
            count: 0,
            last_click: None,
        }
    }

    /// Id of the trigger to fire when the streak completes.
    pub fn trigger_id(&self) -> &str {
        &self.trigger_id
    }

    /// Current streak length.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Record a click now. Returns true when the streak reached the
    /// target and the trigger should fire.
    pub fn record_click(&mut self) -> bool {
        self.record_click_at(Instant::now())
    }

    /// Record a click at an explicit time; the testable entry point.
    pub fn record_click_at(&mut self, now: Instant) -> bool {
        let in_window = self
            .last_click
            .is_some_and(|prev| now.duration_since(prev) <= self.window);

        self.count = if in_window { self.count + 1 } else { 1 };
        self.last_click = Some(now);

        if self.count >= self.target_count {
            tracing::debug!(
                "Click streak complete for trigger '{}' ({} clicks)",
                self.trigger_id,
                self.count
            );
            self.count = 0;
            true
        } else {
            false
        }
    }

    /// Abandon the current streak.
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_click = None;
    }
}
