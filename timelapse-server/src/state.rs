use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use timelapse_core::NetworkGraph;

use crate::projection::WebMercator;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// Locked for one synchronous engine call at a time, never across an await
    graph: Mutex<NetworkGraph>,
    document_json: String,
    geojson: String,
    pub projection: WebMercator,
}

impl AppState {
    /// Serializes the static network responses once up front
    pub fn new(graph: NetworkGraph) -> Result<Self, timelapse_core::Error> {
        let document_json = graph.to_document().to_json_string()?;
        let geojson = graph.to_geojson_string()?;
        Ok(Self {
            graph: Mutex::new(graph),
            document_json,
            geojson,
            projection: WebMercator,
        })
    }

    /// Locks the graph, recovering it if a previous holder panicked.
    ///
    /// The graph itself is immutable after loading and the path cache only
    /// ever gains complete entries, so a panic mid-request leaves nothing
    /// half-written behind.
    pub fn graph(&self) -> MutexGuard<'_, NetworkGraph> {
        self.graph.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("recovering network graph lock poisoned by a panicked request");
            self.graph.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn document_json(&self) -> &str {
        &self.document_json
    }

    pub fn geojson(&self) -> &str {
        &self.geojson
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const NETWORK: &str = r#"{
      "nodes": {
        "A": {"id": "A", "point": {"type": "Point", "coordinates": [0.0, 0.0]},
              "edgeIDs": ["AB"], "stopIDs": ["stopA"]},
        "B": {"id": "B", "point": {"type": "Point", "coordinates": [0.01, 0.0]},
              "edgeIDs": ["AB"], "stopIDs": ["stopB"]}
      },
      "edges": {
        "AB": {"id": "AB", "linestring": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.01, 0.0]]},
               "nodeID1": "A", "nodeID2": "B", "length": 1100.0, "routeIDs": ["1"]}
      }
    }"#;

    #[test]
    fn test_graph_survives_panicked_holder() {
        let graph = NetworkGraph::from_json_str(NETWORK).unwrap();
        let state = Arc::new(AppState::new(graph).unwrap());

        let holder = Arc::clone(&state);
        let result = thread::spawn(move || {
            let _graph = holder.graph();
            panic!("request handler failed while holding the graph");
        })
        .join();
        assert!(result.is_err());
        assert!(state.graph.is_poisoned());

        assert_eq!(state.graph().stop_count(), 2);
        assert!(!state.graph.is_poisoned());
    }
}
