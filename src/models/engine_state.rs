use crate::models::ActiveEffect;
use std::collections::HashSet;

/// Default cap on simultaneously running effects.
///
/// Effects fight for screen space and audio focus; stacking a confetti
/// burst on top of a full-screen video reads as a bug, not a bonus. The
/// newest activation wins a slot and the oldest is evicted, so a cap of 1
/// gives "the latest egg replaces the current one" out of the box. Hosts
/// can raise it via [`EasterEggStore::set_max_concurrent`](crate::state::EasterEggStore::set_max_concurrent).
pub const DEFAULT_MAX_CONCURRENT_EFFECTS: usize = 1;

/// Single source of truth for the engine's runtime state.
///
/// # Thread Safety
///
/// `EngineState` is wrapped in `Arc<RwLock<EngineState>>` by
/// [`crate::state::EasterEggStore`]. Never hold a reference to it across
/// an await point; use the store's `read()`/`snapshot()` accessors.
///
/// The machine's states are implicit in this record set: *idle* (no
/// active effects), *active* (1..=max_concurrent running), and the
/// independent `enabled` / `easter_egg_mode` gates.
#[derive(Clone, Debug)]
pub struct EngineState {
    /// Master switch. When off, nothing triggers and nothing stays active.
    pub enabled: bool,

    /// Global gate for non-`always_enabled` effects.
    pub easter_egg_mode: bool,

    /// Cap on the active set; always >= 1.
    pub max_concurrent: usize,

    /// Currently running effects in activation order. The head is the
    /// oldest entry and the first eviction candidate.
    pub active: Vec<ActiveEffect>,

    /// Effect ids this user has ever triggered. Mirrors the persisted
    /// ledger; grows monotonically.
    pub discovered: HashSet<String>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            enabled: true,
            easter_egg_mode: false,
            max_concurrent: DEFAULT_MAX_CONCURRENT_EFFECTS,
            active: Vec::new(),
            discovered: HashSet::new(),
        }
    }
}

impl EngineState {
    pub fn is_active(&self, id: &str) -> bool {
        self.active.iter().any(|e| e.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Ids of the active effects in activation order.
    pub fn active_ids(&self) -> Vec<String> {
        self.active.iter().map(|e| e.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TriggerContext;
    use std::time::Instant;

    fn active(id: &str) -> ActiveEffect {
        ActiveEffect {
            id: id.to_string(),
            context: TriggerContext::default(),
            started_at: Instant::now(),
            z_index: 1000,
        }
    }

    #[test]
    fn test_default_state() {
        let state = EngineState::default();

        assert!(state.enabled);
        assert!(!state.easter_egg_mode);
        assert_eq!(state.max_concurrent, 1);
        assert_eq!(state.active_count(), 0);
        assert!(state.discovered.is_empty());
    }

    #[test]
    fn test_is_active_lookup() {
        let mut state = EngineState::default();
        state.active.push(active("confetti"));

        assert!(state.is_active("confetti"));
        assert!(!state.is_active("matrix"));
        assert_eq!(state.active_ids(), vec!["confetti".to_string()]);
    }
}
