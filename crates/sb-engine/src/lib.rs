//! Playback engine for Spielbuch stories.
//!
//! Interprets a validated [`sb_graph::StoryGraph`]: walks scenes, reveals
//! dialogue on a typewriter, filters and resolves choices through the
//! condition evaluator, and reports everything observable as events. All
//! timing (text reveal, auto-play, playtime) runs on a virtual clock driven
//! by [`StoryEngine::update`], so hosts control real time and tests use
//! synthetic time.

/// Playback configuration (reveal speeds, auto-play delay, limits).
pub mod config;
/// The story interpreter and its playback phases.
pub mod engine;
/// Error types for the engine crate.
pub mod error;
/// Playback events and the subscription bus.
pub mod event;
/// Serializable runtime state: position, variables, stage, history.
pub mod state;
/// Progressive text reveal on the virtual clock.
pub mod typewriter;

/// Re-export of [`config::EngineConfig`].
pub use config::EngineConfig;
/// Re-exports of [`engine::Phase`] and [`engine::StoryEngine`].
pub use engine::{Phase, StoryEngine};
/// Re-exports of [`error::EngineError`] and [`error::EngineResult`].
pub use error::{EngineError, EngineResult};
/// Re-exports of the event bus and event types.
pub use event::{EventBus, EventKind, StoryEvent, StoryEventKind, SubscriptionId};
/// Re-exports of the runtime state types.
pub use state::{CharacterState, ChoiceRecord, HistoryEntry, RuntimeState};
/// Re-export of [`typewriter::Typewriter`].
pub use typewriter::Typewriter;
