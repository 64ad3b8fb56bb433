//! Story graph model for Spielbuch: the immutable authored data.
//!
//! This crate defines the document format that authoring tools produce and
//! the validated, indexed [`StoryGraph`] the interpreter traverses. The
//! graph is loaded once and never mutated during playback — you can
//! construct a [`StoryDocument`] programmatically or deserialize one from
//! JSON.

/// Error types used throughout the crate.
pub mod error;
/// Story graph edges and their kinds.
pub mod edge;
/// The validated story graph container and its document format.
pub mod graph;
/// Identifier newtypes for nodes, edges, dialogue lines, choices, and characters.
pub mod id;
/// Story node variants and their scene content.
pub mod node;

/// Re-export error types.
pub use error::{GraphError, GraphResult};
/// Re-export edge types.
pub use edge::{EdgeKind, StoryEdge};
/// Re-export graph types.
pub use graph::{StoryDocument, StoryGraph, StoryMeta};
/// Re-export identifier newtypes.
pub use id::{CharacterId, ChoiceId, DialogueId, EdgeId, NodeId};
/// Re-export node types.
pub use node::{
    CharacterPlacement, Choice, Dialogue, EndNode, SceneEffect, SceneNode, ScreenPosition,
    StoryNode,
};
