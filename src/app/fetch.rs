use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use eframe::egui::Context;
use tracing::{debug, warn};

use crate::source::{EntityDetail, GraphQuery, GraphQueryError, GraphSnapshot};

use super::interaction::QueryKey;

pub(in crate::app) enum FetchResult {
    Snapshot {
        key: QueryKey,
        transition: bool,
        result: Result<GraphSnapshot, GraphQueryError>,
    },
    Entity {
        id: String,
        result: Result<EntityDetail, GraphQueryError>,
    },
}

/// Runs graph queries on background threads. Results come back tagged with
/// the request that produced them; deciding whether they are still wanted is
/// left to the caller.
pub(in crate::app) struct Fetcher {
    source: Arc<dyn GraphQuery>,
    tx: Sender<FetchResult>,
    rx: Receiver<FetchResult>,
    in_flight: usize,
    repaint: Option<Context>,
}

impl Fetcher {
    pub(in crate::app) fn new(source: Arc<dyn GraphQuery>, repaint: Option<Context>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            in_flight: 0,
            repaint,
        }
    }

    pub(in crate::app) fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub(in crate::app) fn projects(&self) -> Vec<String> {
        self.source.projects()
    }

    pub(in crate::app) fn request_snapshot(&mut self, key: QueryKey, transition: bool) {
        debug!(?key, transition, "snapshot requested");
        let source = Arc::clone(&self.source);
        self.spawn(move || {
            let result = match &key {
                QueryKey::Sample {
                    entity_type,
                    limit,
                    project,
                } => source.sample(*entity_type, *limit, project.as_deref()),
                QueryKey::Neighborhood {
                    node_id,
                    depth,
                    limit,
                } => source.neighborhood(node_id, *depth, *limit),
            };
            FetchResult::Snapshot {
                key,
                transition,
                result,
            }
        });
    }

    pub(in crate::app) fn request_entity(&mut self, id: String) {
        let source = Arc::clone(&self.source);
        self.spawn(move || {
            let result = source.entity(&id);
            FetchResult::Entity { id, result }
        });
    }

    fn spawn(&mut self, job: impl FnOnce() -> FetchResult + Send + 'static) {
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let _ = tx.send(job());
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }

    /// Drains every finished request without blocking.
    pub(in crate::app) fn poll(&mut self) -> Vec<FetchResult> {
        let mut results = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(result) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    results.push(result);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("fetch channel disconnected");
                    self.in_flight = 0;
                    break;
                }
            }
        }
        results
    }

    #[cfg(test)]
    pub(in crate::app) fn wait(&mut self) -> FetchResult {
        let result = self
            .rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("fetch result");
        self.in_flight = self.in_flight.saturating_sub(1);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{EntityType, demo_graph};

    struct Offline;

    impl GraphQuery for Offline {
        fn sample(
            &self,
            _entity_type: EntityType,
            _limit: usize,
            _project: Option<&str>,
        ) -> Result<GraphSnapshot, GraphQueryError> {
            Err(GraphQueryError::Unavailable("offline".to_owned()))
        }

        fn neighborhood(
            &self,
            _node_id: &str,
            _depth: usize,
            _limit: usize,
        ) -> Result<GraphSnapshot, GraphQueryError> {
            Err(GraphQueryError::Unavailable("offline".to_owned()))
        }

        fn entity(&self, node_id: &str) -> Result<EntityDetail, GraphQueryError> {
            Err(GraphQueryError::NodeNotFound(node_id.to_owned()))
        }

        fn projects(&self) -> Vec<String> {
            Vec::new()
        }
    }

    fn sample_key(limit: usize) -> QueryKey {
        QueryKey::Sample {
            entity_type: EntityType::Function,
            limit,
            project: None,
        }
    }

    #[test]
    fn snapshot_result_carries_its_key() {
        let mut fetcher = Fetcher::new(Arc::new(demo_graph()), None);
        fetcher.request_snapshot(sample_key(25), true);
        assert_eq!(fetcher.in_flight(), 1);

        match fetcher.wait() {
            FetchResult::Snapshot {
                key,
                transition,
                result,
            } => {
                assert_eq!(key, sample_key(25));
                assert!(transition);
                let snapshot = result.unwrap();
                assert!(!snapshot.nodes.is_empty());
                assert!(snapshot.nodes.len() <= 25);
            }
            FetchResult::Entity { .. } => panic!("unexpected entity result"),
        }
        assert_eq!(fetcher.in_flight(), 0);
        assert!(fetcher.poll().is_empty());
    }

    #[test]
    fn failures_are_delivered_not_swallowed() {
        let mut fetcher = Fetcher::new(Arc::new(Offline), None);
        fetcher.request_snapshot(sample_key(10), false);
        fetcher.request_entity("missing".to_owned());

        let mut snapshot_failed = false;
        let mut entity_failed = false;
        for _ in 0..2 {
            match fetcher.wait() {
                FetchResult::Snapshot { result, .. } => {
                    snapshot_failed = matches!(result, Err(GraphQueryError::Unavailable(_)));
                }
                FetchResult::Entity { id, result } => {
                    assert_eq!(id, "missing");
                    entity_failed = result.is_err();
                }
            }
        }
        assert!(snapshot_failed);
        assert!(entity_failed);
    }
}
