// State management module
//
// This module provides the EasterEggStore, which owns the set of currently
// active effects, enforces the concurrency cap, tracks the discovery
// ledger, and exposes the activation/dismissal API consumed by the glue
// layer. State lives behind Arc<RwLock<T>> and every mutation emits change
// events over a broadcast channel.

use crate::models::{ActiveEffect, EffectDefinition, EngineState, TriggerContext};
use crate::persistence::DiscoveryLedger;
use crate::registry::EffectRegistry;
use crate::services::preloader::ResourcePreloader;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::broadcast;

/// Base z-index handed to activated effects; each retained slot above the
/// base adds one.
const EFFECT_Z_BASE: i32 = 1000;

/// Change events emitted when store state is modified
///
/// Interested parties (primarily the glue layer driving effect handlers)
/// subscribe instead of polling the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The master switch flipped
    EnabledChanged { enabled: bool },

    /// Easter-egg mode flipped
    ModeChanged { easter_egg_mode: bool },

    /// An effect entered the active set
    EffectActivated { id: String, z_index: i32 },

    /// An effect lost its slot to a newer activation or a lowered cap
    EffectEvicted { id: String },

    /// An effect was dismissed explicitly
    EffectDismissed { id: String },

    /// The whole active set was cleared
    AllDismissed { count: usize },

    /// An effect id entered the discovery ledger for the first time
    EffectDiscovered { id: String },

    /// The concurrency cap changed
    MaxConcurrentChanged { max_concurrent: usize },
}

/// The activation gate in one testable place.
///
/// `always_enabled` effects may fire while easter-egg mode is off; every
/// other effect needs both the master switch and the mode flag.
pub fn can_activate(effect: &EffectDefinition, enabled: bool, easter_egg_mode: bool) -> bool {
    enabled && (easter_egg_mode || effect.always_enabled)
}

/// Thread-safe store for the easter-egg state machine
///
/// This is the single owner of the active-effect set and the discovery
/// ledger; no other component mutates them. It:
/// - Provides thread-safe access to [`EngineState`] via `Arc<RwLock<T>>`
/// - Emits [`StateChange`] events over a tokio broadcast channel
/// - Enforces the concurrency cap with FIFO eviction (oldest active
///   effect loses its slot when a new activation needs one)
/// - Persists discovery-ledger additions immediately and synchronously
///
/// All mutation entry points are synchronous with respect to the caller.
/// The one async tail is [`enable_easter_egg_mode`](Self::enable_easter_egg_mode),
/// which sets the mode flag first and then kicks the resource preload on a
/// background task, so preloading can never block mode toggling.
pub struct EasterEggStore {
    /// Runtime state protected by RwLock for thread-safe access
    state: Arc<RwLock<EngineState>>,

    /// The catalogue; consulted for effect definitions at activation time
    registry: Arc<EffectRegistry>,

    /// Media cache warmed in the background when easter-egg mode turns on
    preloader: Arc<ResourcePreloader>,

    /// Durable copy of the discovered-ids set
    ledger: Arc<DiscoveryLedger>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl EasterEggStore {
    /// Create a store over the given catalogue, preloader and ledger.
    ///
    /// The persisted discovery set is loaded here, so a store is ready to
    /// answer [`is_easter_egg_discovered`](Self::is_easter_egg_discovered)
    /// immediately after construction.
    pub fn new(
        registry: Arc<EffectRegistry>,
        preloader: Arc<ResourcePreloader>,
        ledger: Arc<DiscoveryLedger>,
    ) -> Self {
        let (state_tx, _) = broadcast::channel(100);

        let state = EngineState {
            discovered: ledger.load(),
            ..EngineState::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            registry,
            preloader,
            ledger,
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state.
    pub fn snapshot(&self) -> EngineState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&EngineState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    pub fn active_count(&self) -> usize {
        self.read(|s| s.active_count())
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.read(|s| s.is_active(id))
    }

    pub fn is_enabled(&self) -> bool {
        self.read(|s| s.enabled)
    }

    pub fn is_easter_egg_mode(&self) -> bool {
        self.read(|s| s.easter_egg_mode)
    }

    /// Request activation of the effect linked to `id`.
    ///
    /// No-ops (empty change list): the store is disabled, the id is not in
    /// the catalogue, the effect is gated off by easter-egg mode, or an
    /// identically-keyed effect is already active (the existing entry is
    /// untouched). Otherwise the id is recorded in the discovery ledger
    /// (persisted immediately, first time only), the oldest active effect
    /// is evicted if the set is at the cap, and the new entry is appended.
    pub fn trigger_easter_egg(&self, id: &str, context: TriggerContext) -> Vec<StateChange> {
        let Some(effect) = self.registry.effect(id) else {
            tracing::debug!("Ignoring trigger for unknown effect '{id}'");
            return Vec::new();
        };

        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();

            if !can_activate(effect, state.enabled, state.easter_egg_mode) {
                tracing::debug!(
                    "Effect '{id}' gated off (enabled={}, mode={}, always_enabled={})",
                    state.enabled,
                    state.easter_egg_mode,
                    effect.always_enabled
                );
                return Vec::new();
            }

            if state.is_active(id) {
                tracing::debug!("Effect '{id}' already active, ignoring re-trigger");
                return Vec::new();
            }

            if state.discovered.insert(id.to_string()) {
                // Ledger write is synchronous within this call.
                self.ledger.save(&state.discovered);
                changes.push(StateChange::EffectDiscovered { id: id.to_string() });
            }

            // Effects are not stacked past the cap: the newest request
            // wins a slot, the oldest loses it.
            while state.active.len() >= state.max_concurrent {
                let evicted = state.active.remove(0);
                tracing::debug!("Evicting '{}' to make room for '{id}'", evicted.id);
                changes.push(StateChange::EffectEvicted { id: evicted.id });
            }

            let z_index = EFFECT_Z_BASE + state.active.len() as i32;
            state.active.push(ActiveEffect {
                id: id.to_string(),
                context,
                started_at: Instant::now(),
                z_index,
            });

            tracing::info!("Activated effect '{id}' (z_index={z_index})");
            changes.push(StateChange::EffectActivated {
                id: id.to_string(),
                z_index,
            });
        }

        self.broadcast(&changes);
        changes
    }

    /// Remove exactly that entry if present; no error if absent.
    pub fn dismiss_easter_egg(&self, id: &str) -> Vec<StateChange> {
        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();
            let before = state.active.len();
            state.active.retain(|e| e.id != id);

            if state.active.len() < before {
                tracing::info!("Dismissed effect '{id}'");
                changes.push(StateChange::EffectDismissed { id: id.to_string() });
            }
        }

        self.broadcast(&changes);
        changes
    }

    /// Clear the active set unconditionally.
    pub fn dismiss_all(&self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();
            let count = state.active.len();
            if count > 0 {
                state.active.clear();
                tracing::info!("Dismissed all {count} active effects");
                changes.push(StateChange::AllDismissed { count });
            }
        }

        self.broadcast(&changes);
        changes
    }

    /// Flip the master switch. Turning the store off also clears all
    /// active effects.
    pub fn set_enabled(&self, enabled: bool) -> Vec<StateChange> {
        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();
            if state.enabled == enabled {
                return Vec::new();
            }

            state.enabled = enabled;
            if !enabled {
                let count = state.active.len();
                if count > 0 {
                    state.active.clear();
                    changes.push(StateChange::AllDismissed { count });
                }
            }

            tracing::info!("Store {}", if enabled { "enabled" } else { "disabled" });
            changes.push(StateChange::EnabledChanged { enabled });
        }

        self.broadcast(&changes);
        changes
    }

    pub fn toggle_enabled(&self) -> Vec<StateChange> {
        let enabled = self.read(|s| s.enabled);
        self.set_enabled(!enabled)
    }

    /// Change the concurrency cap. A running set over the new cap is
    /// truncated to the first `n` entries immediately (oldest retained).
    /// A cap of zero is clamped to 1.
    pub fn set_max_concurrent(&self, max_concurrent: usize) -> Vec<StateChange> {
        let max_concurrent = if max_concurrent == 0 {
            tracing::warn!("max_concurrent of 0 requested, clamping to 1");
            1
        } else {
            max_concurrent
        };

        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();
            if state.max_concurrent == max_concurrent {
                return Vec::new();
            }

            state.max_concurrent = max_concurrent;
            while state.active.len() > max_concurrent {
                let dropped = state.active.pop().map(|e| e.id);
                if let Some(id) = dropped {
                    changes.push(StateChange::EffectEvicted { id });
                }
            }

            tracing::info!("max_concurrent set to {max_concurrent}");
            changes.push(StateChange::MaxConcurrentChanged { max_concurrent });
        }

        self.broadcast(&changes);
        changes
    }

    /// Turn easter-egg mode on and warm the media cache.
    ///
    /// The mode flag is set before the preload future is even created, so
    /// a slow or failing preload can never hold the toggle back. Preload
    /// failures are logged and swallowed; effects that reference unloaded
    /// resources degrade at play time instead.
    pub fn enable_easter_egg_mode(&self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();
            if state.easter_egg_mode {
                return Vec::new();
            }
            state.easter_egg_mode = true;
            tracing::info!("Easter-egg mode enabled");
            changes.push(StateChange::ModeChanged { easter_egg_mode: true });
        }

        self.broadcast(&changes);
        self.kick_background_preload();
        changes
    }

    /// Turn easter-egg mode off. Already-active effects keep running;
    /// only future non-`always_enabled` activations are gated.
    pub fn disable_easter_egg_mode(&self) -> Vec<StateChange> {
        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();
            if !state.easter_egg_mode {
                return Vec::new();
            }
            state.easter_egg_mode = false;
            tracing::info!("Easter-egg mode disabled");
            changes.push(StateChange::ModeChanged { easter_egg_mode: false });
        }

        self.broadcast(&changes);
        changes
    }

    pub fn is_easter_egg_discovered(&self, id: &str) -> bool {
        self.read(|s| s.discovered.contains(id))
    }

    /// Record `id` in the discovery ledger without activating anything.
    /// Idempotent; the ledger only grows.
    pub fn mark_easter_egg_discovered(&self, id: &str) -> Vec<StateChange> {
        let mut changes = Vec::new();
        {
            let mut state = self.state.write().unwrap();
            if state.discovered.insert(id.to_string()) {
                self.ledger.save(&state.discovered);
                changes.push(StateChange::EffectDiscovered { id: id.to_string() });
            }
        }

        self.broadcast(&changes);
        changes
    }

    /// Ids discovered so far, unordered.
    pub fn discovered_ids(&self) -> Vec<String> {
        self.read(|s| s.discovered.iter().cloned().collect())
    }

    /// Apply loaded engine settings to the store.
    ///
    /// Runs at startup after the host loads its configuration; the same
    /// gates and side effects apply as for the individual setters, so
    /// `start_in_easter_egg_mode` also warms the preload cache.
    pub fn apply_settings(&self, settings: &crate::config::EngineSettings) -> Vec<StateChange> {
        let mut changes = Vec::new();

        changes.extend(self.set_max_concurrent(settings.max_concurrent_effects));
        changes.extend(self.set_enabled(settings.start_enabled));
        if settings.start_in_easter_egg_mode {
            changes.extend(self.enable_easter_egg_mode());
        }

        tracing::info!(
            "Applied settings: max_concurrent={}, enabled={}, easter_egg_mode={}",
            settings.max_concurrent_effects,
            settings.start_enabled,
            settings.start_in_easter_egg_mode
        );
        changes
    }

    fn kick_background_preload(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let preloader = Arc::clone(&self.preloader);
                let registry = Arc::clone(&self.registry);
                handle.spawn(async move {
                    let status = preloader.preload_all(&registry).await;
                    if status.failed > 0 {
                        tracing::warn!(
                            "Background preload finished with {} failures of {}",
                            status.failed,
                            status.total
                        );
                    }
                });
            }
            Err(_) => {
                tracing::debug!("No async runtime available, skipping background preload");
            }
        }
    }

    fn broadcast(&self, changes: &[StateChange]) {
        for change in changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }
    }
}

// Make the store cloneable for sharing across tasks
impl Clone for EasterEggStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            registry: Arc::clone(&self.registry),
            preloader: Arc::clone(&self.preloader),
            ledger: Arc::clone(&self.ledger),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EffectDefinition, EffectHandler, HandlerHandle, OnClose, ResourceDescriptor};
    use tempfile::TempDir;

    struct NoopHandler;

    impl EffectHandler for NoopHandler {
        fn start(
            &self,
            _ctx: &TriggerContext,
            _on_close: OnClose,
            _resources: &[ResourceDescriptor],
        ) -> HandlerHandle {
            Box::new(())
        }

        fn stop(&self, _handle: HandlerHandle) {}
    }

    fn store_with(ids: &[&str]) -> (EasterEggStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut registry = EffectRegistry::new();
        for id in ids {
            registry
                .register_effect(EffectDefinition::new(*id), Arc::new(NoopHandler))
                .unwrap();
        }

        let store = EasterEggStore::new(
            Arc::new(registry),
            Arc::new(ResourcePreloader::new()),
            Arc::new(DiscoveryLedger::new(dir.path().to_str().unwrap())),
        );
        (store, dir)
    }

    fn ctx() -> TriggerContext {
        TriggerContext::from_message("test message")
    }

    #[test]
    fn test_new_store_defaults() {
        let (store, _dir) = store_with(&["confetti"]);
        let state = store.snapshot();

        assert!(state.enabled);
        assert!(!state.easter_egg_mode);
        assert_eq!(state.max_concurrent, 1);
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn test_can_activate_gate() {
        let normal = EffectDefinition::new("normal");
        let mut always = EffectDefinition::new("always");
        always.always_enabled = true;

        assert!(!can_activate(&normal, true, false));
        assert!(can_activate(&normal, true, true));
        assert!(can_activate(&always, true, false));
        assert!(can_activate(&always, true, true));

        // Master switch off gates everything, always_enabled included.
        assert!(!can_activate(&normal, false, true));
        assert!(!can_activate(&always, false, true));
    }

    #[test]
    fn test_trigger_requires_mode_for_normal_effects() {
        let (store, _dir) = store_with(&["confetti"]);

        assert!(store.trigger_easter_egg("confetti", ctx()).is_empty());
        assert_eq!(store.active_count(), 0);

        store.enable_easter_egg_mode();
        let changes = store.trigger_easter_egg("confetti", ctx());

        assert!(changes.iter().any(|c| matches!(c, StateChange::EffectActivated { .. })));
        assert!(store.is_active("confetti"));
    }

    #[test]
    fn test_unknown_effect_is_a_noop() {
        let (store, _dir) = store_with(&["confetti"]);
        store.enable_easter_egg_mode();

        assert!(store.trigger_easter_egg("ghost", ctx()).is_empty());
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_eviction_at_cap() {
        let (store, _dir) = store_with(&["confetti", "matrix"]);
        store.enable_easter_egg_mode();

        store.trigger_easter_egg("confetti", ctx());
        let changes = store.trigger_easter_egg("matrix", ctx());

        assert!(changes.contains(&StateChange::EffectEvicted {
            id: "confetti".to_string()
        }));
        let state = store.snapshot();
        assert_eq!(state.active_ids(), vec!["matrix".to_string()]);
    }

    #[test]
    fn test_retrigger_is_idempotent() {
        let (store, _dir) = store_with(&["confetti"]);
        store.enable_easter_egg_mode();

        store.trigger_easter_egg("confetti", ctx());
        let first_start = store.snapshot().active[0].started_at;

        let changes = store.trigger_easter_egg("confetti", ctx());

        assert!(changes.is_empty());
        let state = store.snapshot();
        assert_eq!(state.active_count(), 1);
        assert_eq!(state.active[0].started_at, first_start);
    }

    #[test]
    fn test_z_index_allocation() {
        let (store, _dir) = store_with(&["a", "b", "c"]);
        store.set_max_concurrent(3);
        store.enable_easter_egg_mode();

        store.trigger_easter_egg("a", ctx());
        store.trigger_easter_egg("b", ctx());
        store.trigger_easter_egg("c", ctx());

        let state = store.snapshot();
        let zs: Vec<i32> = state.active.iter().map(|e| e.z_index).collect();
        assert_eq!(zs, vec![1000, 1001, 1002]);
    }

    #[test]
    fn test_dismiss_specific_effect() {
        let (store, _dir) = store_with(&["confetti"]);
        store.enable_easter_egg_mode();
        store.trigger_easter_egg("confetti", ctx());

        let changes = store.dismiss_easter_egg("confetti");

        assert_eq!(
            changes,
            vec![StateChange::EffectDismissed {
                id: "confetti".to_string()
            }]
        );
        assert_eq!(store.active_count(), 0);

        // Absent id is silent.
        assert!(store.dismiss_easter_egg("confetti").is_empty());
    }

    #[test]
    fn test_dismiss_all() {
        let (store, _dir) = store_with(&["a", "b"]);
        store.set_max_concurrent(2);
        store.enable_easter_egg_mode();
        store.trigger_easter_egg("a", ctx());
        store.trigger_easter_egg("b", ctx());

        let changes = store.dismiss_all();

        assert_eq!(changes, vec![StateChange::AllDismissed { count: 2 }]);
        assert_eq!(store.active_count(), 0);

        // Empty store stays empty, no event.
        assert!(store.dismiss_all().is_empty());
    }

    #[test]
    fn test_disable_clears_active_effects() {
        let (store, _dir) = store_with(&["confetti"]);
        store.enable_easter_egg_mode();
        store.trigger_easter_egg("confetti", ctx());

        let changes = store.set_enabled(false);

        assert!(changes.contains(&StateChange::AllDismissed { count: 1 }));
        assert!(changes.contains(&StateChange::EnabledChanged { enabled: false }));
        assert_eq!(store.active_count(), 0);

        // Disabled store ignores triggers entirely.
        assert!(store.trigger_easter_egg("confetti", ctx()).is_empty());
    }

    #[test]
    fn test_toggle_enabled_round_trip() {
        let (store, _dir) = store_with(&[]);

        store.toggle_enabled();
        assert!(!store.is_enabled());
        store.toggle_enabled();
        assert!(store.is_enabled());
    }

    #[test]
    fn test_set_max_concurrent_truncates_oldest_first_retained() {
        let (store, _dir) = store_with(&["a", "b", "c"]);
        store.set_max_concurrent(3);
        store.enable_easter_egg_mode();
        store.trigger_easter_egg("a", ctx());
        store.trigger_easter_egg("b", ctx());
        store.trigger_easter_egg("c", ctx());

        let changes = store.set_max_concurrent(1);

        let state = store.snapshot();
        assert_eq!(state.active_ids(), vec!["a".to_string()]);
        assert!(changes.contains(&StateChange::EffectEvicted { id: "c".to_string() }));
        assert!(changes.contains(&StateChange::EffectEvicted { id: "b".to_string() }));
    }

    #[test]
    fn test_set_max_concurrent_clamps_zero() {
        let (store, _dir) = store_with(&[]);

        store.set_max_concurrent(0);

        assert_eq!(store.snapshot().max_concurrent, 1);
    }

    #[test]
    fn test_always_enabled_fires_without_mode() {
        let dir = TempDir::new().unwrap();
        let mut registry = EffectRegistry::new();
        let mut special = EffectDefinition::new("special");
        special.always_enabled = true;
        registry.register_effect(special, Arc::new(NoopHandler)).unwrap();
        registry
            .register_effect(EffectDefinition::new("normal"), Arc::new(NoopHandler))
            .unwrap();
        let store = EasterEggStore::new(
            Arc::new(registry),
            Arc::new(ResourcePreloader::new()),
            Arc::new(DiscoveryLedger::new(dir.path().to_str().unwrap())),
        );

        assert!(!store.is_easter_egg_mode());
        assert!(!store.trigger_easter_egg("special", ctx()).is_empty());
        assert!(store.trigger_easter_egg("normal", ctx()).is_empty());
        assert!(store.is_active("special"));
    }

    #[test]
    fn test_discovery_ledger_grows_monotonically() {
        let (store, _dir) = store_with(&["confetti"]);
        store.enable_easter_egg_mode();

        let first = store.trigger_easter_egg("confetti", ctx());
        assert!(first.contains(&StateChange::EffectDiscovered {
            id: "confetti".to_string()
        }));

        store.dismiss_easter_egg("confetti");
        let second = store.trigger_easter_egg("confetti", ctx());

        // Re-trigger activates again but does not re-discover.
        assert!(second.iter().all(|c| !matches!(c, StateChange::EffectDiscovered { .. })));
        assert!(store.is_easter_egg_discovered("confetti"));
        assert_eq!(store.discovered_ids(), vec!["confetti".to_string()]);
    }

    #[test]
    fn test_discovery_persists_across_stores() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap().to_string();

        let build = |data_dir: &str| {
            let mut registry = EffectRegistry::new();
            registry
                .register_effect(EffectDefinition::new("confetti"), Arc::new(NoopHandler))
                .unwrap();
            EasterEggStore::new(
                Arc::new(registry),
                Arc::new(ResourcePreloader::new()),
                Arc::new(DiscoveryLedger::new(data_dir)),
            )
        };

        let store = build(&data_dir);
        store.enable_easter_egg_mode();
        store.trigger_easter_egg("confetti", ctx());
        drop(store);

        let reloaded = build(&data_dir);
        assert!(reloaded.is_easter_egg_discovered("confetti"));
    }

    #[test]
    fn test_mark_discovered_is_idempotent() {
        let (store, _dir) = store_with(&["confetti"]);

        let first = store.mark_easter_egg_discovered("confetti");
        let second = store.mark_easter_egg_discovered("confetti");

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(store.is_easter_egg_discovered("confetti"));
    }

    #[test]
    fn test_subscribe_receives_changes() {
        let (store, _dir) = store_with(&["confetti"]);
        let mut rx = store.subscribe();

        store.enable_easter_egg_mode();

        let event = rx.try_recv().unwrap();
        assert_eq!(event, StateChange::ModeChanged { easter_egg_mode: true });
    }

    #[test]
    fn test_clone_shares_state() {
        let (store, _dir) = store_with(&["confetti"]);
        let clone = store.clone();

        store.enable_easter_egg_mode();
        clone.trigger_easter_egg("confetti", ctx());

        assert!(store.is_active("confetti"));
    }

    #[tokio::test]
    async fn test_mode_flag_set_before_preload_settles() {
        let (store, _dir) = store_with(&["confetti"]);

        let changes = store.enable_easter_egg_mode();

        // The flag and the event are visible synchronously, with the
        // preload still running (or skipped) in the background.
        assert!(store.is_easter_egg_mode());
        assert_eq!(changes, vec![StateChange::ModeChanged { easter_egg_mode: true }]);

        // Enabling twice is a no-op.
        assert!(store.enable_easter_egg_mode().is_empty());
    }

    #[test]
    fn test_disable_mode_keeps_active_effects() {
        let (store, _dir) = store_with(&["confetti"]);
        store.enable_easter_egg_mode();
        store.trigger_easter_egg("confetti", ctx());

        store.disable_easter_egg_mode();

        assert!(!store.is_easter_egg_mode());
        assert!(store.is_active("confetti"));
    }
}
