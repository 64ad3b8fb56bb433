use crate::id::{EdgeId, NodeId};

/// Alias for `Result<T, GraphError>`.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur when loading a story graph.
///
/// All of these are load errors: fatal to starting playback, reported
/// synchronously, no partial graph is produced.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The story document is not valid JSON or does not match the schema.
    #[error("malformed story document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two nodes share the same id.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Two edges share the same id.
    #[error("duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),

    /// An edge endpoint references a node that does not exist.
    #[error("edge {edge} references nonexistent node {node}")]
    DanglingEdge {
        /// The offending edge.
        edge: EdgeId,
        /// The missing endpoint.
        node: NodeId,
    },

    /// The document contains no start node.
    #[error("story has no start node")]
    NoStartNode,

    /// The document contains more than one start node.
    #[error("story has multiple start nodes: {0} and {1}")]
    MultipleStartNodes(NodeId, NodeId),

    /// A choice-kind edge carries no choice id to key on.
    #[error("choice edge {0} has no choiceId")]
    ChoiceEdgeWithoutChoice(EdgeId),
}
