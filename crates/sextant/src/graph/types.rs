//! Graph data types returned to clients.

use serde::{Deserialize, Serialize};

use crate::types::{Definition, ScoredUsage, SymbolKind};

/// Configuration for graph construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GraphOptions {
    /// Outbound expansion depth; 0 builds inbound edges only.
    pub max_depth: u32,
    /// Usages scoring below this are dropped from edges.
    pub min_score: f64,
    /// Cap on the number of usages fetched for inbound analysis.
    pub max_usages: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            min_score: 0.0,
            max_usages: 500,
        }
    }
}

/// A symbol node: the primary definition or an outbound target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolNode {
    /// Node identity: `path:name:start_line`
    pub id: String,
    /// Symbol name
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// Defining file
    pub path: String,
    /// Definition start line
    pub line: u32,
}

impl SymbolNode {
    /// Build a node from a definition.
    #[must_use]
    pub fn from_definition(def: &Definition) -> Self {
        Self {
            id: def.node_id(),
            name: def.name.clone(),
            kind: def.kind,
            path: def.path.clone(),
            line: def.span.start_line,
        }
    }
}

/// Edge direction relative to the primary symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    /// A file whose usages point at the primary
    Inbound,
    /// A definition referenced from inside the primary's span
    Outbound,
}

/// An edge in the symbol graph.
///
/// Inbound edges originate from a referring *file* (aggregated); outbound
/// edges connect the primary node to a target symbol node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolEdge {
    /// Source: a file path (inbound) or node id (outbound)
    pub from: String,
    /// Target node id
    pub to: String,
    /// Direction relative to the primary
    pub direction: EdgeDirection,
    /// Number of refs behind this edge
    pub count: usize,
    /// Edge score, four decimals
    pub score: f64,
}

/// An aggregated file-to-file dependency edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEdge {
    /// Referring file
    pub from: String,
    /// Referenced file
    pub to: String,
    /// Summed ref count
    pub count: usize,
    /// Maximum score over collapsed symbol edges
    pub score: f64,
}

/// The full result of graph construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// The primary definition the graph is anchored on
    pub primary: Definition,
    /// Candidate definitions sharing the primary's name
    pub candidates: Vec<Definition>,
    /// Symbol nodes (primary plus outbound targets)
    pub nodes: Vec<SymbolNode>,
    /// Symbol edges (inbound per referring file, outbound per target)
    pub edges: Vec<SymbolEdge>,
    /// Collapsed file-to-file graph
    pub file_graph: Vec<FileEdge>,
    /// Scored usages, grouped order (descending group score, ascending
    /// line within a group)
    pub usages: Vec<ScoredUsage>,
}
