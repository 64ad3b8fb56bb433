use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::edge::{EdgeKind, StoryEdge};
use crate::error::{GraphError, GraphResult};
use crate::id::{ChoiceId, EdgeId, NodeId};
use crate::node::StoryNode;

/// Metadata about the story itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoryMeta {
    /// Story title.
    #[serde(default)]
    pub title: String,
    /// Short description or blurb.
    #[serde(default)]
    pub description: String,
    /// Story authors.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Document schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    1
}

impl StoryMeta {
    /// Create metadata with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A node record as it appears in the authored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// The node's id.
    pub id: NodeId,
    /// The node's variant and content.
    #[serde(flatten)]
    pub node: StoryNode,
}

/// The raw, externally produced story document.
///
/// Authoring tools emit this format; [`StoryGraph::from_document`] validates
/// and indexes it. Node and edge order in the document is the authored
/// order traversal tie-breaking relies on.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoryDocument {
    /// Story metadata.
    #[serde(default)]
    pub meta: StoryMeta,
    /// All nodes, in authored order.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// All edges, in authored order.
    #[serde(default)]
    pub edges: Vec<StoryEdge>,
}

impl StoryDocument {
    /// Create an empty document with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            meta: StoryMeta::new(title),
            ..Self::default()
        }
    }

    /// Append a node.
    pub fn with_node(mut self, id: impl Into<NodeId>, node: StoryNode) -> Self {
        self.nodes.push(NodeRecord {
            id: id.into(),
            node,
        });
        self
    }

    /// Append an edge.
    pub fn with_edge(mut self, edge: StoryEdge) -> Self {
        self.edges.push(edge);
        self
    }
}

/// The validated, indexed story graph. Owns all nodes and edges.
///
/// Immutable after load: the interpreter only reads from it.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    meta: StoryMeta,
    nodes: HashMap<NodeId, StoryNode>,
    edges: HashMap<EdgeId, StoryEdge>,
    start: NodeId,

    // Indexes, built once at load
    flow_from: HashMap<NodeId, Vec<EdgeId>>,
    choice_from: HashMap<NodeId, Vec<EdgeId>>,
}

impl StoryGraph {
    /// Validate and index a story document.
    ///
    /// Checks performed: unique node/edge ids, every edge endpoint exists,
    /// exactly one start node, choice edges carry a choice id. Deeper
    /// validation (reachability of all nodes) is an authoring-time concern
    /// and deliberately not done here.
    pub fn from_document(doc: StoryDocument) -> GraphResult<Self> {
        let mut nodes = HashMap::with_capacity(doc.nodes.len());
        let mut start: Option<NodeId> = None;

        for record in doc.nodes {
            if nodes.contains_key(&record.id) {
                return Err(GraphError::DuplicateNode(record.id));
            }
            if record.node.is_start() {
                match &start {
                    Some(existing) => {
                        return Err(GraphError::MultipleStartNodes(
                            existing.clone(),
                            record.id,
                        ));
                    }
                    None => start = Some(record.id.clone()),
                }
            }
            nodes.insert(record.id, record.node);
        }

        let start = start.ok_or(GraphError::NoStartNode)?;

        let mut edges: HashMap<EdgeId, StoryEdge> = HashMap::with_capacity(doc.edges.len());
        let mut flow_from: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
        let mut choice_from: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();

        for edge in doc.edges {
            if edges.contains_key(&edge.id) {
                return Err(GraphError::DuplicateEdge(edge.id));
            }
            for endpoint in [&edge.from, &edge.to] {
                if !nodes.contains_key(endpoint) {
                    return Err(GraphError::DanglingEdge {
                        edge: edge.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
            match edge.kind {
                EdgeKind::Flow => {
                    flow_from
                        .entry(edge.from.clone())
                        .or_default()
                        .push(edge.id.clone());
                }
                EdgeKind::Choice => {
                    if edge.choice_id.is_none() {
                        return Err(GraphError::ChoiceEdgeWithoutChoice(edge.id));
                    }
                    choice_from
                        .entry(edge.from.clone())
                        .or_default()
                        .push(edge.id.clone());
                }
            }
            edges.insert(edge.id.clone(), edge);
        }

        // Flow-edge resolution order: explicit priorities first (ascending),
        // unprioritized edges after them in authored order. A stable sort
        // keeps authored order within equal keys, so documents that never
        // set `priority` are evaluated exactly in authored order.
        for ids in flow_from.values_mut() {
            ids.sort_by_key(|id| edges[id].priority.unwrap_or(i64::MAX));
        }

        Ok(Self {
            meta: doc.meta,
            nodes,
            edges,
            start,
            flow_from,
            choice_from,
        })
    }

    /// Parse and validate a JSON story document.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        let doc: StoryDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Story metadata.
    pub fn meta(&self) -> &StoryMeta {
        &self.meta
    }

    /// The unique start node's id.
    pub fn start(&self) -> &NodeId {
        &self.start
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&StoryNode> {
        self.nodes.get(id)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: &EdgeId) -> Option<&StoryEdge> {
        self.edges.get(id)
    }

    /// Flow edges leaving a node, in resolution order.
    pub fn flow_edges_from(&self, node: &NodeId) -> Vec<&StoryEdge> {
        self.flow_from
            .get(node)
            .map(|ids| ids.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// Choice edges leaving a node, in authored order.
    pub fn choice_edges_from(&self, node: &NodeId) -> Vec<&StoryEdge> {
        self.choice_from
            .get(node)
            .map(|ids| ids.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default()
    }

    /// The choice edge leaving `node` that answers `choice`, if any.
    pub fn choice_edge_for(&self, node: &NodeId, choice: &ChoiceId) -> Option<&StoryEdge> {
        self.choice_edges_from(node)
            .into_iter()
            .find(|edge| edge.choice_id.as_ref() == Some(choice))
    }

    /// All node ids (arbitrary order).
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// All nodes (arbitrary order).
    pub fn all_nodes(&self) -> impl Iterator<Item = (&NodeId, &StoryNode)> {
        self.nodes.iter()
    }

    /// All edges (arbitrary order).
    pub fn all_edges(&self) -> impl Iterator<Item = &StoryEdge> {
        self.edges.values()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{EndNode, SceneNode};

    fn scene() -> StoryNode {
        StoryNode::Scene(SceneNode::default())
    }

    fn minimal_doc() -> StoryDocument {
        StoryDocument::new("Test Story")
            .with_node("start", StoryNode::Start)
            .with_node("a", scene())
            .with_node("end", StoryNode::End(EndNode::default()))
            .with_edge(StoryEdge::flow("e1", "start", "a"))
            .with_edge(StoryEdge::flow("e2", "a", "end"))
    }

    #[test]
    fn load_minimal_document() {
        let graph = StoryGraph::from_document(minimal_doc()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.start().as_str(), "start");
        assert!(graph.node(&NodeId::new("a")).unwrap().as_scene().is_some());
    }

    #[test]
    fn missing_start_node_rejected() {
        let doc = StoryDocument::new("No Start").with_node("a", scene());
        assert!(matches!(
            StoryGraph::from_document(doc),
            Err(GraphError::NoStartNode)
        ));
    }

    #[test]
    fn multiple_start_nodes_rejected() {
        let doc = StoryDocument::new("Two Starts")
            .with_node("s1", StoryNode::Start)
            .with_node("s2", StoryNode::Start);
        assert!(matches!(
            StoryGraph::from_document(doc),
            Err(GraphError::MultipleStartNodes(_, _))
        ));
    }

    #[test]
    fn dangling_edge_rejected() {
        let doc = StoryDocument::new("Dangling")
            .with_node("start", StoryNode::Start)
            .with_edge(StoryEdge::flow("e1", "start", "nowhere"));
        match StoryGraph::from_document(doc) {
            Err(GraphError::DanglingEdge { edge, node }) => {
                assert_eq!(edge.as_str(), "e1");
                assert_eq!(node.as_str(), "nowhere");
            }
            other => panic!("expected DanglingEdge, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_node_rejected() {
        let doc = StoryDocument::new("Dup")
            .with_node("start", StoryNode::Start)
            .with_node("start", scene());
        assert!(matches!(
            StoryGraph::from_document(doc),
            Err(GraphError::DuplicateNode(_))
        ));
    }

    #[test]
    fn choice_edge_without_choice_id_rejected() {
        let mut edge = StoryEdge::flow("e1", "start", "a");
        edge.kind = EdgeKind::Choice;
        let doc = StoryDocument::new("Bad Choice")
            .with_node("start", StoryNode::Start)
            .with_node("a", scene())
            .with_edge(edge);
        assert!(matches!(
            StoryGraph::from_document(doc),
            Err(GraphError::ChoiceEdgeWithoutChoice(_))
        ));
    }

    #[test]
    fn flow_edges_keep_authored_order_without_priorities() {
        let doc = StoryDocument::new("Order")
            .with_node("start", StoryNode::Start)
            .with_node("a", scene())
            .with_node("b", scene())
            .with_node("c", scene())
            .with_edge(StoryEdge::flow("first", "start", "a"))
            .with_edge(StoryEdge::flow("second", "start", "b"))
            .with_edge(StoryEdge::flow("third", "start", "c"));
        let graph = StoryGraph::from_document(doc).unwrap();
        let order: Vec<_> = graph
            .flow_edges_from(&NodeId::new("start"))
            .iter()
            .map(|e| e.id.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn explicit_priorities_evaluated_first() {
        let doc = StoryDocument::new("Priority")
            .with_node("start", StoryNode::Start)
            .with_node("a", scene())
            .with_node("b", scene())
            .with_node("c", scene())
            .with_edge(StoryEdge::flow("plain", "start", "a"))
            .with_edge(StoryEdge::flow("low", "start", "b").with_priority(10))
            .with_edge(StoryEdge::flow("high", "start", "c").with_priority(1));
        let graph = StoryGraph::from_document(doc).unwrap();
        let order: Vec<_> = graph
            .flow_edges_from(&NodeId::new("start"))
            .iter()
            .map(|e| e.id.as_str().to_string())
            .collect();
        assert_eq!(order, vec!["high", "low", "plain"]);
    }

    #[test]
    fn choice_edge_lookup_by_choice_id() {
        let doc = StoryDocument::new("Choices")
            .with_node("start", StoryNode::Start)
            .with_node("a", scene())
            .with_node("b", scene())
            .with_edge(StoryEdge::choice("e1", "a", "b", "accept"));
        let graph = StoryGraph::from_document(doc).unwrap();
        let edge = graph
            .choice_edge_for(&NodeId::new("a"), &ChoiceId::new("accept"))
            .unwrap();
        assert_eq!(edge.to.as_str(), "b");
        assert!(
            graph
                .choice_edge_for(&NodeId::new("a"), &ChoiceId::new("refuse"))
                .is_none()
        );
    }

    #[test]
    fn from_json_round_trip() {
        let json = r#"{
            "meta": { "title": "Mini" },
            "nodes": [
                { "id": "start", "nodeType": "start" },
                { "id": "s1", "nodeType": "scene", "dialogues": [
                    { "id": "d1", "text": "It begins." }
                ]},
                { "id": "fin", "nodeType": "end", "endingType": "neutral" }
            ],
            "edges": [
                { "id": "e1", "from": "start", "to": "s1", "edgeType": "flow" },
                { "id": "e2", "from": "s1", "to": "fin", "edgeType": "flow" }
            ]
        }"#;
        let graph = StoryGraph::from_json(json).unwrap();
        assert_eq!(graph.meta().title, "Mini");
        let scene = graph
            .node(&NodeId::new("s1"))
            .unwrap()
            .as_scene()
            .unwrap();
        assert_eq!(scene.dialogues[0].text, "It begins.");
        assert!(scene.dialogues[0].speaker.is_none(), "narrator line");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            StoryGraph::from_json("{ not json"),
            Err(GraphError::Parse(_))
        ));
    }
}
