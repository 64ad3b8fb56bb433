use sb_graph::{ChoiceId, NodeId};

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Content and navigation errors reported by the interpreter.
///
/// These are the "reported, recoverable halt" class: the engine stops
/// advancing from the offending point rather than guessing a fallback
/// target, and the error is returned (never panicked) across the public
/// entry points.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A referenced node does not exist in the graph (e.g. a restored
    /// snapshot from a different story).
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Dialogue and choices are exhausted but no outgoing flow edge passes
    /// its condition.
    #[error("no valid flow edge out of node {0}")]
    NoValidEdge(NodeId),

    /// A selected choice has neither a direct target nor a matching
    /// choice edge.
    #[error("choice {choice} in node {node} has no resolvable target")]
    ChoiceTargetUnresolved {
        /// The scene the choice belongs to.
        node: NodeId,
        /// The unresolvable choice.
        choice: ChoiceId,
    },
}
