use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sb_expr::Value;
use sb_graph::{CharacterId, ChoiceId, NodeId, ScreenPosition};

/// A character currently on stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterState {
    /// Which character.
    pub id: CharacterId,
    /// Stage slot.
    pub position: ScreenPosition,
    /// Current expression tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Render scale (renderer-owned, carried for save fidelity).
    pub scale: f64,
    /// Render opacity (renderer-owned, carried for save fidelity).
    pub alpha: f64,
}

/// One line of the dialogue backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Speaking character; `None` for the narrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<CharacterId>,
    /// The full line text.
    pub text: String,
    /// When the line was shown.
    pub timestamp: DateTime<Utc>,
}

/// A recorded player decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRecord {
    /// The node the choice belonged to.
    pub node: NodeId,
    /// The selected choice.
    pub choice: ChoiceId,
    /// When it was selected.
    pub timestamp: DateTime<Utc>,
}

/// The single mutable record of "where the player is".
///
/// Owned exclusively by the interpreter; external collaborators only ever
/// see deep copies. Serializable to a plain snapshot at any time — it holds
/// no timers, callbacks, or engine handles, which is the contract the
/// persistence layer depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeState {
    /// The node being played, once started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_node: Option<NodeId>,
    /// Index of the current dialogue line within the scene.
    pub dialogue_index: usize,
    /// The story's variable store.
    pub variables: BTreeMap<String, Value>,
    /// Characters currently on stage.
    pub visible_characters: Vec<CharacterState>,
    /// Current background reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_background: Option<String>,
    /// Current background music reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_bgm: Option<String>,
    /// Bounded dialogue backlog, oldest evicted.
    pub history: VecDeque<HistoryEntry>,
    /// Append-only log of player decisions.
    pub choices_made: Vec<ChoiceRecord>,
    /// Cumulative playtime in seconds.
    pub playtime_seconds: f64,
    /// Whether playback is paused.
    pub is_paused: bool,
    /// Whether auto-play is on.
    pub auto_play: bool,
    /// Whether skip mode is on.
    pub skip_mode: bool,
    /// Text reveal speed in `[0, 1]`.
    pub text_speed: f64,
}

impl RuntimeState {
    /// Fresh state for a new playthrough, preserving the player-facing
    /// settings (`text_speed`, `auto_play`) from the previous state.
    pub fn fresh(&self) -> Self {
        Self {
            text_speed: self.text_speed,
            auto_play: self.auto_play,
            ..Self::default()
        }
    }

    /// Append a line to the backlog, evicting the oldest beyond `limit`
    /// entries (0 = unlimited).
    pub fn push_history(&mut self, entry: HistoryEntry, limit: usize) {
        self.history.push_back(entry);
        if limit > 0 {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Record a player decision.
    pub fn record_choice(&mut self, node: NodeId, choice: ChoiceId) {
        self.choices_made.push(ChoiceRecord {
            node,
            choice,
            timestamp: Utc::now(),
        });
    }
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            id: CharacterId::new(""),
            position: ScreenPosition::default(),
            expression: None,
            scale: 1.0,
            alpha: 1.0,
        }
    }
}
