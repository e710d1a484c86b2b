// Engine controller - wires input sources to the store and drives handlers
//
// This module contains the EngineController, which coordinates between:
// - the host UI (input events over an mpsc channel, message submission)
// - the Debouncer (keystroke collapsing)
// - the TriggerMatcher (pattern evaluation)
// - the EasterEggStore (activation/dismissal state machine)
// - registered EffectHandlers (started/stopped off store change events)
//
// Event subscriptions are centralized here: the host pushes events down
// one channel and the controller owns every listener, so setup and
// teardown happen in exactly one place.

use crate::config::EngineSettings;
use crate::input::{ClickCounter, Debouncer};
use crate::metrics::Metrics;
use crate::models::{HandlerHandle, OnClose, TriggerContext};
use crate::registry::EffectRegistry;
use crate::services::matcher;
use crate::state::{EasterEggStore, StateChange, can_activate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Keys the engine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Input events pushed by the host UI.
#[derive(Clone, Debug)]
pub enum InputEvent {
    /// Live text in the chat box changed; evaluated after the debounce
    /// window.
    TextChanged(String),

    /// A click on a UI element wired to a click-burst trigger.
    Click { target: String },

    /// A key went down at the window level.
    KeyDown(Key),
}

/// What the host should do with a message the user submitted.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageDisposition {
    /// Forward to the normal chat pipeline.
    Forward,

    /// Withhold from the chat pipeline; a matched blocking trigger
    /// consumed it. The matched trigger ids are listed for the host's
    /// benefit.
    Blocked { matched: Vec<String> },
}

/// Coordinator between the host UI and the easter-egg machinery.
///
/// Owns two background tasks: an input pump draining [`InputEvent`]s and
/// a handler driver subscribed to the store's change events. Both stop
/// when the controller is dropped.
///
/// # Example
/// ```ignore
/// let controller = EngineController::new(store, registry, &settings, metrics);
/// controller.register_click_trigger("logo", "logo_spin", 5);
///
/// let input = controller.input_sender();
/// input.send(InputEvent::TextChanged("surpr".into()))?;
/// input.send(InputEvent::TextChanged("surprise".into()))?;
///
/// match controller.submit_message("surprise") {
///     MessageDisposition::Blocked { .. } => { /* swallow the message */ }
///     MessageDisposition::Forward => { /* send to chat backend */ }
/// }
/// ```
pub struct EngineController {
    store: EasterEggStore,
    registry: Arc<EffectRegistry>,
    metrics: Arc<Metrics>,

    /// Collapses keystroke bursts into one evaluation per typing pause.
    debouncer: Arc<Debouncer<String>>,

    /// Click-burst counters keyed by UI target name.
    click_counters: Arc<Mutex<HashMap<String, ClickCounter>>>,
    click_window: Duration,

    input_tx: mpsc::UnboundedSender<InputEvent>,
    input_task: JoinHandle<()>,
    handler_task: JoinHandle<()>,
}

impl EngineController {
    /// Create a controller and start its background tasks. Requires a
    /// tokio runtime.
    pub fn new(
        store: EasterEggStore,
        registry: Arc<EffectRegistry>,
        settings: &EngineSettings,
        metrics: Arc<Metrics>,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();

        let debouncer = {
            let store = store.clone();
            let registry = Arc::clone(&registry);
            let metrics = Arc::clone(&metrics);
            Arc::new(Debouncer::new(
                Duration::from_millis(settings.debounce_ms),
                move |text: String| {
                    evaluate_text(&store, &registry, &metrics, &text);
                },
            ))
        };

        let click_counters = Arc::new(Mutex::new(HashMap::new()));

        // Subscribe before anything can trigger so no activation is missed.
        let state_rx = store.subscribe();
        let handler_task = tokio::spawn(drive_handlers(
            state_rx,
            store.clone(),
            Arc::clone(&registry),
            Arc::clone(&metrics),
        ));

        let input_task = tokio::spawn(pump_input(
            input_rx,
            store.clone(),
            Arc::clone(&metrics),
            Arc::clone(&debouncer),
            Arc::clone(&click_counters),
        ));

        tracing::info!(
            "Engine controller started ({} triggers, {} effects, debounce {}ms)",
            registry.trigger_count(),
            registry.effect_count(),
            settings.debounce_ms
        );

        Self {
            store,
            registry,
            metrics,
            debouncer,
            click_counters,
            click_window: Duration::from_millis(settings.click_window_ms),
            input_tx,
            input_task,
            handler_task,
        }
    }

    /// Channel for the host to push input events into.
    pub fn input_sender(&self) -> mpsc::UnboundedSender<InputEvent> {
        self.input_tx.clone()
    }

    pub fn store(&self) -> &EasterEggStore {
        &self.store
    }

    /// Wire a UI target to a click-burst trigger: `target_count` clicks
    /// inside the configured window fire the trigger.
    pub fn register_click_trigger(
        &self,
        target: impl Into<String>,
        trigger_id: impl Into<String>,
        target_count: u32,
    ) {
        let target = target.into();
        let counter = ClickCounter::new(trigger_id, target_count, self.click_window);
        self.click_counters
            .lock()
            .unwrap()
            .insert(target.clone(), counter);
        tracing::debug!("Registered click trigger on '{target}'");
    }

    /// Evaluate a submitted message immediately (no debounce), fire any
    /// matching effects, and tell the host whether to forward the message
    /// to the chat pipeline.
    ///
    /// A message is only withheld when a matched trigger both has
    /// `blocks_message` and is actually able to activate under the
    /// current store flags — a gated-off egg never eats chat messages.
    pub fn submit_message(&self, text: &str) -> MessageDisposition {
        let triggers = self.registry.enabled_triggers();
        let matched = matcher::find_matching_triggers(text, &triggers);
        self.metrics.record_evaluation(matched.len());

        let mut blocked_by = Vec::new();
        for trigger in &matched {
            let activatable = self
                .registry
                .effect(&trigger.id)
                .map(|def| {
                    self.store
                        .read(|s| can_activate(def, s.enabled, s.easter_egg_mode))
                })
                .unwrap_or(false);

            if !activatable {
                continue;
            }

            self.store
                .trigger_easter_egg(&trigger.id, TriggerContext::from_message(text));
            if trigger.blocks_message {
                blocked_by.push(trigger.id.clone());
            }
        }

        if blocked_by.is_empty() {
            MessageDisposition::Forward
        } else {
            self.metrics.record_message_blocked();
            tracing::debug!("Message withheld from chat pipeline by {:?}", blocked_by);
            MessageDisposition::Blocked { matched: blocked_by }
        }
    }
}

impl Drop for EngineController {
    fn drop(&mut self) {
        self.debouncer.cancel();
        self.input_task.abort();
        self.handler_task.abort();
    }
}

/// Debounced text evaluation: match against the catalogue and request
/// activation for every hit.
fn evaluate_text(
    store: &EasterEggStore,
    registry: &EffectRegistry,
    metrics: &Metrics,
    text: &str,
) {
    let triggers = registry.enabled_triggers();
    let matched = matcher::find_matching_triggers(text, &triggers);
    metrics.record_evaluation(matched.len());

    for trigger in matched {
        store.trigger_easter_egg(&trigger.id, TriggerContext::from_message(text));
    }
}

/// Drain host input events for the controller's lifetime.
async fn pump_input(
    mut input_rx: mpsc::UnboundedReceiver<InputEvent>,
    store: EasterEggStore,
    metrics: Arc<Metrics>,
    debouncer: Arc<Debouncer<String>>,
    click_counters: Arc<Mutex<HashMap<String, ClickCounter>>>,
) {
    while let Some(event) = input_rx.recv().await {
        match event {
            InputEvent::TextChanged(text) => debouncer.call(text),

            InputEvent::Click { target } => {
                metrics.record_click();
                let fired = {
                    let mut counters = click_counters.lock().unwrap();
                    match counters.get_mut(&target) {
                        Some(counter) => counter
                            .record_click()
                            .then(|| counter.trigger_id().to_string()),
                        None => None,
                    }
                };

                if let Some(trigger_id) = fired {
                    metrics.record_click_streak();
                    store.trigger_easter_egg(&trigger_id, TriggerContext::synthetic("click"));
                }
            }

            // Escape clears everything, but only while something is
            // showing; otherwise the key belongs to whoever else wants it.
            InputEvent::KeyDown(Key::Escape) => {
                if store.active_count() > 0 {
                    store.dismiss_all();
                }
            }

            InputEvent::KeyDown(_) => {}
        }
    }
}

/// Start and stop effect handlers off the store's change events.
async fn drive_handlers(
    mut state_rx: broadcast::Receiver<StateChange>,
    store: EasterEggStore,
    registry: Arc<EffectRegistry>,
    metrics: Arc<Metrics>,
) {
    let mut handles: HashMap<String, HandlerHandle> = HashMap::new();

    loop {
        match state_rx.recv().await {
            Ok(StateChange::EffectActivated { id, .. }) => {
                let Some(handler) = registry.handler(&id) else {
                    tracing::warn!("No handler for activated effect '{id}'");
                    continue;
                };

                // The entry may already be gone if it was evicted before
                // this event was processed; the paired eviction event
                // will stop the handler right after it starts.
                let ctx = store
                    .read(|s| {
                        s.active
                            .iter()
                            .find(|e| e.id == id)
                            .map(|e| e.context.clone())
                    })
                    .unwrap_or_default();

                let on_close: OnClose = {
                    let store = store.clone();
                    let id = id.clone();
                    Arc::new(move || {
                        store.dismiss_easter_egg(&id);
                    })
                };

                let resources = registry
                    .effect(&id)
                    .map(|def| def.resources.clone())
                    .unwrap_or_default();
                let handle = handler.start(&ctx, on_close, &resources);
                handles.insert(id, handle);
                metrics.record_effect_started();
            }

            Ok(StateChange::EffectDismissed { id }) | Ok(StateChange::EffectEvicted { id }) => {
                stop_handler(&registry, &metrics, &mut handles, &id);
            }

            Ok(StateChange::AllDismissed { .. }) => {
                let ids: Vec<String> = handles.keys().cloned().collect();
                for id in ids {
                    stop_handler(&registry, &metrics, &mut handles, &id);
                }
            }

            Ok(_) => {}

            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Handler driver lagged, skipped {skipped} events");
            }

            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn stop_handler(
    registry: &EffectRegistry,
    metrics: &Metrics,
    handles: &mut HashMap<String, HandlerHandle>,
    id: &str,
) {
    if let Some(handle) = handles.remove(id) {
        if let Some(handler) = registry.handler(id) {
            handler.stop(handle);
        }
        metrics.record_effect_stopped();
    }
}
