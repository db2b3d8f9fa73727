mod app;
mod layout;
mod source;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{ExplorerApp, ExplorerConfig};
use crate::source::{CodeGraph, EntityType, GraphQuery, demo_graph, load_graph_file};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON code-graph export to explore.
    #[arg(long, conflicts_with = "demo")]
    graph: Option<PathBuf>,

    /// Explore the built-in synthetic graph.
    #[arg(long)]
    demo: bool,

    /// Entity type sampled in the overview: function, class or document.
    #[arg(long, default_value = "function", value_parser = parse_entity_type)]
    entity_type: EntityType,

    /// Maximum number of nodes in the overview sample.
    #[arg(long, default_value_t = 80)]
    limit: usize,

    /// Restrict the overview sample to one project.
    #[arg(long)]
    project: Option<String>,

    /// Start focused on the neighborhood of this node id.
    #[arg(long)]
    node: Option<String>,

    /// Log filter; falls back to RUST_LOG, then "info".
    #[arg(long)]
    log: Option<String>,
}

fn parse_entity_type(value: &str) -> Result<EntityType, String> {
    EntityType::parse(value)
        .filter(|kind| EntityType::SAMPLED.contains(kind))
        .ok_or_else(|| format!("expected one of function, class, document; got {value:?}"))
}

fn init_tracing(filter: Option<&str>) -> Result<()> {
    let filter_layer = match filter {
        Some(filter) => EnvFilter::try_new(filter).with_context(|| format!("invalid log filter {filter:?}"))?,
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?,
    };
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn load_source(args: &Args) -> Result<CodeGraph> {
    match &args.graph {
        Some(path) => load_graph_file(path),
        None => {
            if !args.demo {
                info!("no --graph given, using the demo graph");
            }
            Ok(demo_graph())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;

    let graph = load_source(&args).context("failed to load the code graph")?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "code graph loaded"
    );
    let source: Arc<dyn GraphQuery> = Arc::new(graph);

    let config = ExplorerConfig {
        entity_type: args.entity_type,
        limit: args.limit,
        project: args.project,
        initial_node: args.node,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "codegraph-explorer",
        options,
        Box::new(move |cc| Ok(Box::new(ExplorerApp::new(cc, source, config)))),
    )
    .map_err(|error| anyhow!("failed to start the explorer window: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_and_entity_type_validation() {
        let args = Args::try_parse_from(["codegraph-explorer"]).unwrap();
        assert_eq!(args.entity_type, EntityType::Function);
        assert_eq!(args.limit, 80);
        assert!(args.graph.is_none());

        let args = Args::try_parse_from(["codegraph-explorer", "--entity-type", "class", "--node", "x"])
            .unwrap();
        assert_eq!(args.entity_type, EntityType::Class);
        assert_eq!(args.node.as_deref(), Some("x"));

        assert!(Args::try_parse_from(["codegraph-explorer", "--entity-type", "directory"]).is_err());
        assert!(Args::try_parse_from(["codegraph-explorer", "--graph", "g.json", "--demo"]).is_err());
    }
}
