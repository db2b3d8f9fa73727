use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use super::graph::CodeGraph;
use super::parse::parse_graph_export;

pub fn load_graph_file(path: &Path) -> Result<CodeGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph export {}", path.display()))?;

    let parsed = parse_graph_export(&raw)
        .with_context(|| format!("failed to parse graph export {}", path.display()))?;
    let skipped_nodes = parsed.skipped_nodes;
    let skipped_edges = parsed.skipped_edges;

    let (graph, stats) = CodeGraph::from_records(parsed.nodes, parsed.edges);
    if graph.node_count() == 0 {
        return Err(anyhow!(
            "graph export {} has no usable node records",
            path.display()
        ));
    }

    if skipped_nodes + skipped_edges + stats.duplicate_nodes + stats.dangling_edges > 0 {
        warn!(
            skipped_nodes,
            skipped_edges,
            duplicate_nodes = stats.duplicate_nodes,
            dangling_edges = stats.dangling_edges,
            "graph export contained records that were ignored"
        );
    }

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded code graph"
    );
    Ok(graph)
}
