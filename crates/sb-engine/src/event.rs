use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use sb_graph::{CharacterId, Choice, ChoiceId, DialogueId, NodeId, ScreenPosition};

/// What happened during playback.
///
/// A closed enumeration: every observable interpreter action maps to
/// exactly one of these. Events are ephemeral — they are never stored in
/// [`RuntimeState`](crate::RuntimeState).
#[derive(Debug, Clone, PartialEq)]
pub enum StoryEventKind {
    /// Playback left a node.
    SceneExit {
        /// The node being left.
        node: NodeId,
    },
    /// A scene-to-scene transition began (for fades and similar renderer
    /// effects).
    TransitionStart {
        /// The scene being left.
        from: NodeId,
        /// The node being entered.
        to: NodeId,
    },
    /// Playback entered a scene node.
    SceneEnter {
        /// The node being entered.
        node: NodeId,
    },
    /// A dialogue line started revealing.
    DialogueStart {
        /// The scene the line belongs to.
        node: NodeId,
        /// The line.
        dialogue: DialogueId,
        /// Speaking character; `None` for the narrator.
        speaker: Option<CharacterId>,
        /// Full authored text of the line.
        text: String,
    },
    /// A dialogue line finished revealing (timeout or interrupt).
    DialogueComplete {
        /// The scene the line belongs to.
        node: NodeId,
        /// The line.
        dialogue: DialogueId,
    },
    /// Choices are being presented (already condition-filtered).
    ChoicesShown {
        /// The scene presenting the choices.
        node: NodeId,
        /// The visible choices, in authored order.
        choices: Vec<Choice>,
    },
    /// The player selected a choice.
    ChoiceSelected {
        /// The scene the choice belonged to.
        node: NodeId,
        /// The selected choice.
        choice: ChoiceId,
        /// Its display text.
        text: String,
    },
    /// A character entered the stage.
    CharacterEnter {
        /// The character.
        id: CharacterId,
        /// Stage slot.
        position: ScreenPosition,
        /// Initial expression.
        expression: Option<String>,
    },
    /// A character left the stage.
    CharacterExit {
        /// The character.
        id: CharacterId,
    },
    /// A staged character changed expression.
    CharacterExpression {
        /// The character.
        id: CharacterId,
        /// The new expression.
        expression: Option<String>,
    },
    /// The background changed.
    BackgroundChange {
        /// New background reference.
        location: String,
    },
    /// Background music started.
    BgmPlay {
        /// Track reference.
        track: String,
    },
    /// Background music stopped.
    BgmStop,
    /// An authored scene effect, forwarded verbatim.
    EffectTriggered {
        /// Renderer-defined effect kind.
        kind: String,
        /// Effect parameters, untouched.
        payload: JsonValue,
    },
    /// Playback reached an end node.
    EndingReached {
        /// The end node.
        node: NodeId,
        /// Ending classification, if authored.
        ending_type: Option<String>,
        /// Accumulated playtime in seconds.
        playtime_seconds: f64,
    },
    /// Playback was paused.
    Paused,
    /// Playback was resumed.
    Resumed,
    /// A save snapshot was produced.
    StateSaved,
    /// A snapshot was restored.
    StateRestored,
}

/// Discriminant of [`StoryEventKind`], used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`StoryEventKind::SceneExit`].
    SceneExit,
    /// See [`StoryEventKind::TransitionStart`].
    TransitionStart,
    /// See [`StoryEventKind::SceneEnter`].
    SceneEnter,
    /// See [`StoryEventKind::DialogueStart`].
    DialogueStart,
    /// See [`StoryEventKind::DialogueComplete`].
    DialogueComplete,
    /// See [`StoryEventKind::ChoicesShown`].
    ChoicesShown,
    /// See [`StoryEventKind::ChoiceSelected`].
    ChoiceSelected,
    /// See [`StoryEventKind::CharacterEnter`].
    CharacterEnter,
    /// See [`StoryEventKind::CharacterExit`].
    CharacterExit,
    /// See [`StoryEventKind::CharacterExpression`].
    CharacterExpression,
    /// See [`StoryEventKind::BackgroundChange`].
    BackgroundChange,
    /// See [`StoryEventKind::BgmPlay`].
    BgmPlay,
    /// See [`StoryEventKind::BgmStop`].
    BgmStop,
    /// See [`StoryEventKind::EffectTriggered`].
    EffectTriggered,
    /// See [`StoryEventKind::EndingReached`].
    EndingReached,
    /// See [`StoryEventKind::Paused`].
    Paused,
    /// See [`StoryEventKind::Resumed`].
    Resumed,
    /// See [`StoryEventKind::StateSaved`].
    StateSaved,
    /// See [`StoryEventKind::StateRestored`].
    StateRestored,
}

impl StoryEventKind {
    /// The event's discriminant.
    pub fn kind(&self) -> EventKind {
        match self {
            StoryEventKind::SceneExit { .. } => EventKind::SceneExit,
            StoryEventKind::TransitionStart { .. } => EventKind::TransitionStart,
            StoryEventKind::SceneEnter { .. } => EventKind::SceneEnter,
            StoryEventKind::DialogueStart { .. } => EventKind::DialogueStart,
            StoryEventKind::DialogueComplete { .. } => EventKind::DialogueComplete,
            StoryEventKind::ChoicesShown { .. } => EventKind::ChoicesShown,
            StoryEventKind::ChoiceSelected { .. } => EventKind::ChoiceSelected,
            StoryEventKind::CharacterEnter { .. } => EventKind::CharacterEnter,
            StoryEventKind::CharacterExit { .. } => EventKind::CharacterExit,
            StoryEventKind::CharacterExpression { .. } => EventKind::CharacterExpression,
            StoryEventKind::BackgroundChange { .. } => EventKind::BackgroundChange,
            StoryEventKind::BgmPlay { .. } => EventKind::BgmPlay,
            StoryEventKind::BgmStop => EventKind::BgmStop,
            StoryEventKind::EffectTriggered { .. } => EventKind::EffectTriggered,
            StoryEventKind::EndingReached { .. } => EventKind::EndingReached,
            StoryEventKind::Paused => EventKind::Paused,
            StoryEventKind::Resumed => EventKind::Resumed,
            StoryEventKind::StateSaved => EventKind::StateSaved,
            StoryEventKind::StateRestored => EventKind::StateRestored,
        }
    }
}

/// A timestamped playback event.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryEvent {
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub kind: StoryEventKind,
}

impl StoryEvent {
    /// Create an event stamped with the current time.
    pub fn new(kind: StoryEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Unsubscribe token returned by [`EventBus::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

type Listener = Box<dyn FnMut(&StoryEvent)>;

struct Subscription {
    id: SubscriptionId,
    /// `None` subscribes to every event kind.
    filter: Option<EventKind>,
    listener: Listener,
}

/// Typed publish/subscribe channel between the interpreter and its
/// external collaborators (renderer, audio, persistence).
///
/// Emission is fire-and-forget: the interpreter never waits on a
/// listener's result, and a panicking listener is isolated and logged
/// rather than aborting emission to the others.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event kind. Returns an unsubscribe token.
    pub fn on(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&StoryEvent) + 'static,
    ) -> SubscriptionId {
        self.register(Some(kind), Box::new(listener))
    }

    /// Subscribe to every event kind. Returns an unsubscribe token.
    pub fn on_any(&mut self, listener: impl FnMut(&StoryEvent) + 'static) -> SubscriptionId {
        self.register(None, Box::new(listener))
    }

    fn register(&mut self, filter: Option<EventKind>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscriptions.push(Subscription {
            id,
            filter,
            listener,
        });
        id
    }

    /// Remove a subscription. Returns `true` if it existed.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Deliver an event to every matching listener.
    ///
    /// Each listener runs inside `catch_unwind`; a panic is logged and the
    /// remaining listeners still receive the event.
    pub fn emit(&mut self, event: &StoryEvent) {
        let kind = event.kind.kind();
        for sub in &mut self.subscriptions {
            if sub.filter.is_some_and(|f| f != kind) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| (sub.listener)(event)));
            if result.is_err() {
                tracing::error!(?kind, "event listener panicked; continuing emission");
            }
        }
    }
}
