use serde::{Deserialize, Serialize};

use crate::id::{CharacterId, ChoiceId, DialogueId, NodeId};

/// Horizontal slot a character occupies on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScreenPosition {
    /// Left third of the stage.
    Left,
    /// Center of the stage.
    #[default]
    Center,
    /// Right third of the stage.
    Right,
}

/// A character present in a scene, with stage placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterPlacement {
    /// The character being placed.
    pub id: CharacterId,
    /// Where on the stage the character stands.
    #[serde(default)]
    pub position: ScreenPosition,
    /// Expression/pose tag (e.g. "smile", "angry"), renderer-defined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// A single authored dialogue line. Immutable once authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    /// Unique identifier of this line.
    pub id: DialogueId,
    /// Speaking character; `None` means the narrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<CharacterId>,
    /// The text to display.
    pub text: String,
    /// Emotion tag forwarded to the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// Voice clip reference forwarded to the audio layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// A player-selectable choice.
///
/// A choice with no direct [`target`](Choice::target) is resolved through a
/// choice-kind [`StoryEdge`](crate::StoryEdge) keyed to its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Unique identifier of this choice.
    pub id: ChoiceId,
    /// The text shown to the player.
    pub text: String,
    /// Visibility condition; empty or absent means always visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Direct target node, bypassing edge lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
}

/// An authored scene effect, opaque to the interpreter.
///
/// Effects (screen shakes, flashes, weather...) are forwarded verbatim as
/// events; only the renderer interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEffect {
    /// Renderer-defined effect kind.
    pub kind: String,
    /// Arbitrary effect parameters, passed through untouched.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Content of a scene node: the only node kind with player-visible content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    /// Ordered dialogue lines; always exhausted before choices are shown.
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    /// Ordered choice options presented after the last dialogue line.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Characters present while this scene plays.
    #[serde(default)]
    pub characters: Vec<CharacterPlacement>,
    /// Background/location reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Background music reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgm: Option<String>,
    /// Ordered scene effects, emitted verbatim on scene entry.
    #[serde(default)]
    pub effects: Vec<SceneEffect>,
}

/// Content of an end node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EndNode {
    /// Ending classification (e.g. "good", "bad", "neutral").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending_type: Option<String>,
}

/// A node in the story graph.
///
/// A closed set of variants: adding a node kind is a compile-time-checked
/// change at every traversal site, not a runtime string comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "lowercase")]
pub enum StoryNode {
    /// Entry point marker; skipped over automatically, never displayed.
    Start,
    /// A playable scene with dialogue, choices, and staged characters.
    Scene(SceneNode),
    /// Terminal marker with an optional ending classification.
    End(EndNode),
}

impl StoryNode {
    /// Return the scene content if this is a scene node.
    pub fn as_scene(&self) -> Option<&SceneNode> {
        match self {
            StoryNode::Scene(scene) => Some(scene),
            StoryNode::Start | StoryNode::End(_) => None,
        }
    }

    /// True for the start node.
    pub fn is_start(&self) -> bool {
        matches!(self, StoryNode::Start)
    }

    /// True for end nodes.
    pub fn is_end(&self) -> bool {
        matches!(self, StoryNode::End(_))
    }
}
