use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use itertools::Itertools;
use serde_json::json;

use super::{Edge, NetworkGraph, Node};
use crate::Error;

impl NetworkGraph {
    /// Converts the network to a `GeoJSON` `FeatureCollection`: one
    /// `LineString` per edge and one `Point` per stop-serving node.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let edges = self
            .edges()
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .map(edge_feature);
        let stops = self
            .nodes()
            .filter(|node| node.has_stops())
            .sorted_by(|a, b| a.id.cmp(&b.id))
            .map(stop_feature);

        let features = edges.chain(stops).collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn edge_feature(edge: &Edge) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&edge.geometry));
    let routes: Vec<&str> = edge.route_ids.iter().map(|r| r.as_str()).sorted().collect();

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "feature_type": "edge",
            "id": edge.id,
            "node_id1": edge.node_id1,
            "node_id2": edge.node_id2,
            "length": edge.length,
            "route_ids": routes,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn stop_feature(node: &Node) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&node.point));
    let stops: Vec<&str> = node.stop_ids.iter().map(|s| s.as_str()).sorted().collect();

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "feature_type": "stop",
            "id": node.id,
            "stop_ids": stops,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
