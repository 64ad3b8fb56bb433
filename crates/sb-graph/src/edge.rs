use serde::{Deserialize, Serialize};

use crate::id::{ChoiceId, EdgeId, NodeId};

/// How an edge is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Traversed automatically when a node's content is exhausted.
    Flow,
    /// Traversed as the result of a specific player-selected choice.
    Choice,
}

/// A directed edge between two story nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryEdge {
    /// Unique identifier of this edge.
    pub id: EdgeId,
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Flow or choice traversal.
    #[serde(rename = "edgeType")]
    pub kind: EdgeKind,
    /// For choice edges: the choice this edge answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_id: Option<ChoiceId>,
    /// Traversal condition; empty or absent means always passable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Explicit evaluation priority among flow edges (lower first).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl StoryEdge {
    /// Create an unconditional flow edge.
    pub fn flow(id: impl Into<EdgeId>, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Flow,
            choice_id: None,
            condition: None,
            priority: None,
        }
    }

    /// Create a choice edge answering the given choice.
    pub fn choice(
        id: impl Into<EdgeId>,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        choice: impl Into<ChoiceId>,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind: EdgeKind::Choice,
            choice_id: Some(choice.into()),
            condition: None,
            priority: None,
        }
    }

    /// Set the traversal condition.
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set the evaluation priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}
