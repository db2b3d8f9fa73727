use std::collections::{HashMap, HashSet, VecDeque};

use serde::Deserialize;

use super::GraphQueryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    #[serde(alias = "Function")]
    Function,
    #[serde(alias = "Class")]
    Class,
    #[serde(alias = "Document")]
    Document,
    #[serde(alias = "File")]
    File,
    #[serde(alias = "Directory")]
    Directory,
}

impl EntityType {
    pub const ALL: [Self; 5] = [
        Self::Function,
        Self::Class,
        Self::Document,
        Self::File,
        Self::Directory,
    ];

    /// Types the overview sampler accepts.
    pub const SAMPLED: [Self; 3] = [Self::Function, Self::Class, Self::Document];

    pub fn label(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Document => "document",
            Self::File => "file",
            Self::Directory => "directory",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value.trim()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Calls,
    Documents,
    Extends,
    Implements,
    Contains,
    Defines,
}

impl RelationType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Calls => "CALLS",
            Self::Documents => "DOCUMENTS",
            Self::Extends => "EXTENDS",
            Self::Implements => "IMPLEMENTS",
            Self::Contains => "CONTAINS",
            Self::Defines => "DEFINES",
        }
    }
}

/// Degree as delivered by the upstream graph driver: either a plain number or
/// a split 64-bit integer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDegree {
    Plain(i64),
    Float(f64),
    Pair {
        low: i64,
        #[serde(default)]
        high: i64,
    },
    Malformed(serde_json::Value),
}

#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityType,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub docstring: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub degree: Option<RawDegree>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SnapshotEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", alias = "relationship")]
    pub relation: RelationType,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub edges: Vec<SnapshotEdge>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityLink {
    pub relation: RelationType,
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct EntityDetail {
    pub id: String,
    pub name: String,
    pub kind: EntityType,
    pub file_path: Option<String>,
    pub qualified_name: Option<String>,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub project: Option<String>,
    pub incoming: Vec<EntityLink>,
    pub outgoing: Vec<EntityLink>,
}

#[derive(Clone, Copy, Debug)]
struct EdgeRecord {
    source: usize,
    target: usize,
    relation: RelationType,
}

#[derive(Clone, Debug, Default)]
pub struct LoadStats {
    pub duplicate_nodes: usize,
    pub dangling_edges: usize,
}

/// In-memory code graph answering the explorer's sample/neighborhood queries.
#[derive(Clone, Debug, Default)]
pub struct CodeGraph {
    nodes: Vec<SnapshotNode>,
    index_by_id: HashMap<String, usize>,
    edges: Vec<EdgeRecord>,
    neighbors: Vec<Vec<usize>>,
}

impl CodeGraph {
    pub fn from_records(
        records: Vec<SnapshotNode>,
        edge_records: Vec<SnapshotEdge>,
    ) -> (Self, LoadStats) {
        let mut stats = LoadStats::default();
        let mut nodes = Vec::with_capacity(records.len());
        let mut index_by_id = HashMap::with_capacity(records.len());

        for mut record in records {
            if index_by_id.contains_key(&record.id) {
                stats.duplicate_nodes += 1;
                continue;
            }
            if record.name.is_empty() {
                record.name = record.id.clone();
            }
            record.degree = None;
            index_by_id.insert(record.id.clone(), nodes.len());
            nodes.push(record);
        }

        let mut edges = Vec::with_capacity(edge_records.len());
        let mut neighbors = vec![Vec::new(); nodes.len()];
        for edge in edge_records {
            let (Some(&source), Some(&target)) =
                (index_by_id.get(&edge.source), index_by_id.get(&edge.target))
            else {
                stats.dangling_edges += 1;
                continue;
            };

            edges.push(EdgeRecord {
                source,
                target,
                relation: edge.relation,
            });
            if source != target {
                neighbors[source].push(target);
                neighbors[target].push(source);
            }
        }

        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }

        (
            Self {
                nodes,
                index_by_id,
                edges,
                neighbors,
            },
            stats,
        )
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn full_degree(&self, index: usize) -> usize {
        self.neighbors.get(index).map(Vec::len).unwrap_or(0)
    }

    pub fn sample(
        &self,
        entity_type: EntityType,
        limit: usize,
        project: Option<&str>,
    ) -> GraphSnapshot {
        let mut ranked = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.kind == entity_type)
            .filter(|(_, node)| project.is_none_or(|project| node.project.as_deref() == Some(project)))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        ranked.sort_by(|a, b| {
            self.full_degree(*b)
                .cmp(&self.full_degree(*a))
                .then_with(|| self.nodes[*a].id.cmp(&self.nodes[*b].id))
        });
        ranked.truncate(limit);

        self.induced_snapshot(&ranked)
    }

    pub fn neighborhood(
        &self,
        node_id: &str,
        depth: usize,
        limit: usize,
    ) -> Result<GraphSnapshot, GraphQueryError> {
        let &center = self
            .index_by_id
            .get(node_id)
            .ok_or_else(|| GraphQueryError::NodeNotFound(node_id.to_owned()))?;

        if limit == 0 {
            return Ok(GraphSnapshot::default());
        }

        let mut order = vec![center];
        let mut visited = HashSet::from([center]);
        let mut queue = VecDeque::from([(center, 0usize)]);

        'bfs: while let Some((index, hops)) = queue.pop_front() {
            if hops >= depth {
                continue;
            }

            for &next in &self.neighbors[index] {
                if order.len() >= limit {
                    break 'bfs;
                }
                if visited.insert(next) {
                    order.push(next);
                    queue.push_back((next, hops + 1));
                }
            }
        }

        Ok(self.induced_snapshot(&order))
    }

    pub fn entity(&self, node_id: &str) -> Result<EntityDetail, GraphQueryError> {
        let &index = self
            .index_by_id
            .get(node_id)
            .ok_or_else(|| GraphQueryError::NodeNotFound(node_id.to_owned()))?;
        let node = &self.nodes[index];

        let link = |relation: RelationType, other: usize| EntityLink {
            relation,
            id: self.nodes[other].id.clone(),
            name: self.nodes[other].name.clone(),
        };

        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        for edge in &self.edges {
            if edge.source == edge.target {
                continue;
            }
            if edge.target == index {
                incoming.push(link(edge.relation, edge.source));
            } else if edge.source == index {
                outgoing.push(link(edge.relation, edge.target));
            }
        }

        Ok(EntityDetail {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind,
            file_path: node.file_path.clone(),
            qualified_name: node.qualified_name.clone(),
            signature: node.signature.clone(),
            docstring: node.docstring.clone(),
            project: node.project.clone(),
            incoming,
            outgoing,
        })
    }

    pub fn projects(&self) -> Vec<String> {
        let mut projects = self
            .nodes
            .iter()
            .filter_map(|node| node.project.clone())
            .collect::<Vec<_>>();
        projects.sort();
        projects.dedup();
        projects
    }

    fn induced_snapshot(&self, indices: &[usize]) -> GraphSnapshot {
        let members = indices.iter().copied().collect::<HashSet<_>>();
        let mut local_degree = HashMap::<usize, i64>::with_capacity(indices.len());
        let mut edges = Vec::new();

        for edge in &self.edges {
            if !members.contains(&edge.source) || !members.contains(&edge.target) {
                continue;
            }

            *local_degree.entry(edge.source).or_default() += 1;
            if edge.source != edge.target {
                *local_degree.entry(edge.target).or_default() += 1;
            }
            edges.push(SnapshotEdge {
                source: self.nodes[edge.source].id.clone(),
                target: self.nodes[edge.target].id.clone(),
                relation: edge.relation,
            });
        }

        let nodes = indices
            .iter()
            .map(|&index| {
                let mut node = self.nodes[index].clone();
                node.degree = Some(RawDegree::Plain(
                    local_degree.get(&index).copied().unwrap_or(0),
                ));
                node
            })
            .collect();

        GraphSnapshot { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: EntityType, project: Option<&str>) -> SnapshotNode {
        SnapshotNode {
            id: id.to_owned(),
            name: String::new(),
            kind,
            file_path: None,
            qualified_name: None,
            signature: None,
            docstring: None,
            project: project.map(str::to_owned),
            degree: None,
        }
    }

    fn edge(source: &str, target: &str, relation: RelationType) -> SnapshotEdge {
        SnapshotEdge {
            source: source.to_owned(),
            target: target.to_owned(),
            relation,
        }
    }

    fn chain_graph() -> CodeGraph {
        let nodes = vec![
            node("a", EntityType::Function, Some("core")),
            node("b", EntityType::Function, Some("core")),
            node("c", EntityType::Function, Some("web")),
            node("d", EntityType::Class, Some("core")),
            node("e", EntityType::Function, Some("core")),
        ];
        let edges = vec![
            edge("a", "b", RelationType::Calls),
            edge("b", "c", RelationType::Calls),
            edge("c", "e", RelationType::Calls),
            edge("d", "a", RelationType::Defines),
            edge("a", "a", RelationType::Calls),
            edge("a", "ghost", RelationType::Calls),
        ];
        CodeGraph::from_records(nodes, edges).0
    }

    #[test]
    fn load_drops_dangling_edges_and_duplicate_ids() {
        let nodes = vec![
            node("a", EntityType::Function, None),
            node("a", EntityType::Class, None),
        ];
        let edges = vec![edge("a", "missing", RelationType::Calls)];
        let (graph, stats) = CodeGraph::from_records(nodes, edges);

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(stats.duplicate_nodes, 1);
        assert_eq!(stats.dangling_edges, 1);
    }

    #[test]
    fn sample_filters_by_type_and_project_and_ranks_by_degree() {
        let graph = chain_graph();

        let snapshot = graph.sample(EntityType::Function, 2, None);
        let ids = snapshot.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(snapshot.nodes.iter().all(|n| n.kind == EntityType::Function));

        let core = graph.sample(EntityType::Function, 10, Some("core"));
        assert!(core.nodes.iter().all(|n| n.project.as_deref() == Some("core")));
        assert_eq!(core.nodes.len(), 3);
    }

    #[test]
    fn sample_reports_snapshot_local_degree() {
        let graph = chain_graph();
        let snapshot = graph.sample(EntityType::Function, 2, None);

        let b = snapshot.nodes.iter().find(|n| n.id == "b").unwrap();
        assert_eq!(b.degree, Some(RawDegree::Plain(1)));
        assert!(snapshot.edges.iter().any(|e| e.source == "a" && e.target == "a"));
    }

    #[test]
    fn neighborhood_walks_both_directions_up_to_depth() {
        let graph = chain_graph();
        let snapshot = graph.neighborhood("b", 2, 60).unwrap();
        let mut ids = snapshot.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids[0], "b");
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);

        let shallow = graph.neighborhood("b", 1, 60).unwrap();
        assert_eq!(shallow.nodes.len(), 3);
    }

    #[test]
    fn neighborhood_respects_limit_and_unknown_ids() {
        let graph = chain_graph();
        assert_eq!(graph.neighborhood("a", 2, 2).unwrap().nodes.len(), 2);
        assert!(matches!(
            graph.neighborhood("nope", 2, 60),
            Err(GraphQueryError::NodeNotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn entity_lists_neighbors_without_self_loops() {
        let graph = chain_graph();
        let detail = graph.entity("a").unwrap();

        assert_eq!(detail.outgoing.len(), 1);
        assert_eq!(detail.outgoing[0].id, "b");
        assert_eq!(detail.incoming.len(), 1);
        assert_eq!(detail.incoming[0].relation, RelationType::Defines);
    }

    #[test]
    fn entity_type_parse_is_case_insensitive() {
        assert_eq!(EntityType::parse("Function"), Some(EntityType::Function));
        assert_eq!(EntityType::parse(" document "), Some(EntityType::Document));
        assert_eq!(EntityType::parse("module"), None);
    }
}
