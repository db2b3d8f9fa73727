mod collect;
mod demo;
mod graph;
mod parse;

pub use collect::load_graph_file;
pub use demo::demo_graph;
pub use graph::{
    CodeGraph, EntityDetail, EntityLink, EntityType, GraphSnapshot, RawDegree, RelationType,
    SnapshotEdge, SnapshotNode,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphQueryError {
    #[error("node {0} is not part of the code graph")]
    NodeNotFound(String),
    #[error("graph source unavailable: {0}")]
    Unavailable(String),
}

/// Query surface the explorer consumes. Implementations are shared with
/// background fetch threads.
pub trait GraphQuery: Send + Sync {
    fn sample(
        &self,
        entity_type: EntityType,
        limit: usize,
        project: Option<&str>,
    ) -> Result<GraphSnapshot, GraphQueryError>;

    fn neighborhood(
        &self,
        node_id: &str,
        depth: usize,
        limit: usize,
    ) -> Result<GraphSnapshot, GraphQueryError>;

    fn entity(&self, node_id: &str) -> Result<EntityDetail, GraphQueryError>;

    fn projects(&self) -> Vec<String>;
}

impl GraphQuery for CodeGraph {
    fn sample(
        &self,
        entity_type: EntityType,
        limit: usize,
        project: Option<&str>,
    ) -> Result<GraphSnapshot, GraphQueryError> {
        Ok(CodeGraph::sample(self, entity_type, limit, project))
    }

    fn neighborhood(
        &self,
        node_id: &str,
        depth: usize,
        limit: usize,
    ) -> Result<GraphSnapshot, GraphQueryError> {
        CodeGraph::neighborhood(self, node_id, depth, limit)
    }

    fn entity(&self, node_id: &str) -> Result<EntityDetail, GraphQueryError> {
        CodeGraph::entity(self, node_id)
    }

    fn projects(&self) -> Vec<String> {
        CodeGraph::projects(self)
    }
}
