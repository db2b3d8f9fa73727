use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::SimGraph;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct SearchHit {
    pub(in crate::app) index: usize,
    pub(in crate::app) id: String,
    pub(in crate::app) name: String,
    pub(in crate::app) score: i64,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Nodes whose name or qualified name fuzzy-matches `query`, best first.
pub(in crate::app) fn search_nodes(graph: &SimGraph, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut hits = graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let by_name = fuzzy_match_score(&matcher, &node.name, query);
            let by_path = node
                .qualified_name
                .as_deref()
                .and_then(|qualified| fuzzy_match_score(&matcher, qualified, query));
            let score = by_name.max(by_path)?;
            Some(SearchHit {
                index,
                id: node.id.clone(),
                name: node.name.clone(),
                score,
            })
        })
        .collect::<Vec<_>>();

    hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    hits
}

/// Last query's results for the current snapshot.
#[derive(Default)]
pub(in crate::app) struct SearchCache {
    query: String,
    hits: Vec<SearchHit>,
    matches: Arc<HashSet<usize>>,
}

impl SearchCache {
    pub(in crate::app) fn refresh(&mut self, graph: &SimGraph, query: &str) {
        let query = query.trim();
        if query == self.query {
            return;
        }

        self.query = query.to_owned();
        self.hits = search_nodes(graph, query);
        self.matches = Arc::new(self.hits.iter().map(|hit| hit.index).collect());
    }

    pub(in crate::app) fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub(in crate::app) fn matches(&self) -> Option<Arc<HashSet<usize>>> {
        (!self.query.is_empty()).then(|| Arc::clone(&self.matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::graph::transform;
    use crate::source::GraphSnapshot;

    fn graph() -> SimGraph {
        let snapshot: GraphSnapshot = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": "a", "name": "Scheduler", "type": "class",
                     "qualified_name": "runtime.Scheduler"},
                    {"id": "b", "name": "schedule_task", "type": "function"},
                    {"id": "c", "name": "README.md", "type": "document"},
                    {"id": "d", "name": "tick", "type": "function",
                     "qualified_name": "runtime.clock.tick"}
                ],
                "edges": []
            }"#,
        )
        .unwrap();
        transform(&snapshot.nodes, &snapshot.edges)
    }

    #[test]
    fn fuzzy_search_ranks_matches_and_ignores_case() {
        let graph = graph();
        let hits = search_nodes(&graph, "sched");
        let ids = hits.iter().map(|hit| hit.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"a"));
        assert!(ids.contains(&"b"));

        let by_path = search_nodes(&graph, "clock");
        assert_eq!(by_path.len(), 1);
        assert_eq!(by_path[0].id, "d");

        assert!(search_nodes(&graph, "   ").is_empty());
    }

    #[test]
    fn cache_reports_no_matches_for_blank_query() {
        let graph = graph();
        let mut cache = SearchCache::default();
        cache.refresh(&graph, "");
        assert!(cache.matches().is_none());

        cache.refresh(&graph, "readme");
        let matches = cache.matches().unwrap();
        assert!(matches.contains(&2));
        assert_eq!(cache.hits().len(), 1);
    }
}
