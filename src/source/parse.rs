use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::graph::{SnapshotEdge, SnapshotNode};

#[derive(Debug, Deserialize)]
struct RawExport {
    #[serde(default)]
    nodes: Vec<Value>,
    #[serde(default, alias = "links")]
    edges: Vec<Value>,
}

#[derive(Debug, Default)]
pub(super) struct ParsedExport {
    pub(super) nodes: Vec<SnapshotNode>,
    pub(super) edges: Vec<SnapshotEdge>,
    pub(super) skipped_nodes: usize,
    pub(super) skipped_edges: usize,
}

pub(super) fn parse_graph_export(raw: &str) -> Result<ParsedExport> {
    let export: RawExport = serde_json::from_str(raw).context("invalid graph export JSON")?;
    if export.nodes.is_empty() {
        return Err(anyhow!("graph export contains no nodes"));
    }

    let mut parsed = ParsedExport::default();

    for value in export.nodes {
        match SnapshotNode::deserialize(&value) {
            Ok(node) => parsed.nodes.push(node),
            Err(error) => {
                parsed.skipped_nodes += 1;
                warn!(%error, "skipping malformed node record");
            }
        }
    }

    for value in export.edges {
        match SnapshotEdge::deserialize(&value) {
            Ok(edge) => parsed.edges.push(edge),
            Err(error) => {
                parsed.skipped_edges += 1;
                warn!(%error, "skipping malformed edge record");
            }
        }
    }

    Ok(parsed)
}
