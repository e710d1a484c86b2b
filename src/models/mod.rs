//! Data models for the easter-egg engine.
//!
//! This module contains the core data structures shared across the crate:
//! - [`TriggerDefinition`]: pattern rules matched against input text
//! - [`EffectDefinition`]: catalogue entries for the presentation units the
//!   engine starts and stops; the executable part is the [`EffectHandler`]
//!   trait, bound at registry build time
//! - [`TriggerContext`]: the originating input handed through to handlers
//! - [`ActiveEffect`]: runtime record of an effect currently on screen
//! - [`EngineState`]: the central state container wrapped by
//!   [`EasterEggStore`](crate::state::EasterEggStore)
//!
//! # Architecture Note
//!
//! Definitions are **serializable** (`Serialize`/`Deserialize` for the YAML
//! catalogue) and **immutable once registered**. Runtime state is
//! **cloneable** so the store can hand out lock-free snapshots.

pub mod effect;
pub mod engine_state;
pub mod trigger;

pub use effect::{
    ActiveEffect, EffectDefinition, EffectHandler, HandlerHandle, OnClose, ResourceDescriptor,
    ResourceKind,
};
pub use engine_state::{DEFAULT_MAX_CONCURRENT_EFFECTS, EngineState};
pub use trigger::{MatchType, TriggerContext, TriggerDefinition};
