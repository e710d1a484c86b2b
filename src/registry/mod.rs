// Effect registry
//
// The process-wide catalogue mapping trigger-id -> trigger definition and
// effect-id -> (effect definition, handler). Populated once at startup and
// then shared behind Arc; registration order is preserved because matching
// reports triggers in the order they were registered.

use crate::models::{EffectDefinition, EffectHandler, ResourceDescriptor, TriggerDefinition};
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building the catalogue.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Trigger '{0}' is already registered")]
    DuplicateTrigger(String),

    #[error("Effect '{0}' is already registered")]
    DuplicateEffect(String),

    #[error("Trigger id must not be empty")]
    EmptyId,
}

struct EffectEntry {
    definition: EffectDefinition,
    handler: Arc<dyn EffectHandler>,
}

/// Catalogue of triggers and effects.
///
/// Built once at application start and passed by `Arc` to every consumer
/// (store, controller, preloader) instead of living as a module-level
/// singleton. After construction the catalogue is immutable: registration
/// takes `&mut self`, everything else takes `&self`.
///
/// # Usage
///
/// ```ignore
/// let mut registry = EffectRegistry::new();
/// registry.register_trigger(TriggerDefinition::new(
///     "confetti", MatchType::Exact, "surprise",
/// ))?;
/// registry.register_effect(EffectDefinition::new("confetti"), Arc::new(ConfettiHandler))?;
/// let registry = Arc::new(registry);
/// ```
#[derive(Default)]
pub struct EffectRegistry {
    triggers: IndexMap<String, TriggerDefinition>,
    effects: IndexMap<String, EffectEntry>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger definition. Ids are unique; re-registering an
    /// id is an error rather than a silent overwrite.
    pub fn register_trigger(&mut self, trigger: TriggerDefinition) -> Result<(), RegistryError> {
        if trigger.id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.triggers.contains_key(&trigger.id) {
            return Err(RegistryError::DuplicateTrigger(trigger.id));
        }

        tracing::debug!("Registered trigger '{}' ({:?})", trigger.id, trigger.match_type);
        self.triggers.insert(trigger.id.clone(), trigger);
        Ok(())
    }

    /// Register an effect definition together with its handler.
    pub fn register_effect(
        &mut self,
        definition: EffectDefinition,
        handler: Arc<dyn EffectHandler>,
    ) -> Result<(), RegistryError> {
        if definition.id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.effects.contains_key(&definition.id) {
            return Err(RegistryError::DuplicateEffect(definition.id));
        }

        tracing::debug!(
            "Registered effect '{}' ({} resources, always_enabled={})",
            definition.id,
            definition.resources.len(),
            definition.always_enabled
        );
        self.effects
            .insert(definition.id.clone(), EffectEntry { definition, handler });
        Ok(())
    }

    pub fn trigger(&self, id: &str) -> Option<&TriggerDefinition> {
        self.triggers.get(id)
    }

    pub fn effect(&self, id: &str) -> Option<&EffectDefinition> {
        self.effects.get(id).map(|e| &e.definition)
    }

    pub fn handler(&self, id: &str) -> Option<Arc<dyn EffectHandler>> {
        self.effects.get(id).map(|e| Arc::clone(&e.handler))
    }

    /// All triggers in registration order.
    pub fn triggers(&self) -> impl Iterator<Item = &TriggerDefinition> {
        self.triggers.values()
    }

    /// Enabled triggers in registration order; the matcher input.
    pub fn enabled_triggers(&self) -> Vec<&TriggerDefinition> {
        self.triggers.values().filter(|t| t.enabled).collect()
    }

    /// All effect definitions in registration order.
    pub fn effects(&self) -> impl Iterator<Item = &EffectDefinition> {
        self.effects.values().map(|e| &e.definition)
    }

    /// Every resource referenced by the catalogue, in registration order.
    /// The preloader's `preload_all` input.
    pub fn all_resources(&self) -> Vec<ResourceDescriptor> {
        self.effects
            .values()
            .flat_map(|e| e.definition.resources.iter().cloned())
            .collect()
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }
}
