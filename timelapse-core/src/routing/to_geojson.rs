use geojson::{Feature, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::Path;
use crate::{Error, NetworkGraph};

impl NetworkGraph {
    /// A path as a single `LineString` feature in travel order.
    ///
    /// Empty paths have no geometry, so they become a feature with a null
    /// geometry that still carries the path's properties.
    pub fn path_to_geojson(&self, path: &Path) -> Result<Feature, Error> {
        let geometry = if path.is_empty() {
            None
        } else {
            Some(Geometry::new(GeoJsonValue::from(&self.path_geometry(path))))
        };
        let edges: Vec<&str> = path.edges.iter().map(|step| step.edge_id.as_str()).collect();

        let value = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "length": self.path_length(path),
                "cost": path.cost,
                "left_preferred_route": path.left_preferred_route,
                "edge_ids": edges,
            }
        });

        serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::GraphFixture;
    use crate::{Path, RouteId, StopId};

    #[test]
    fn test_path_feature() {
        let mut graph = GraphFixture::new()
            .node("A", 0.0, 0.0, &["stopA"])
            .node("B", 1.0, 0.0, &[])
            .node("C", 1.0, 1.0, &["stopC"])
            .edge("AB", "A", "B", 10.0, &["1"])
            .edge("CB", "C", "B", 5.0, &["2"])
            .build();
        let path = graph
            .shortest_path(&StopId::new("stopA"), &StopId::new("stopC"), &RouteId::new("1"))
            .unwrap();

        let feature = graph.path_to_geojson(&path).unwrap();
        let geometry = serde_json::to_value(&feature.geometry).unwrap();
        assert_eq!(geometry["type"], "LineString");
        assert_eq!(
            geometry["coordinates"],
            serde_json::json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]])
        );
        assert_eq!(feature.property("length").unwrap(), 15.0);
        assert_eq!(feature.property("left_preferred_route").unwrap(), true);
        assert_eq!(
            feature.property("edge_ids").unwrap(),
            &serde_json::json!(["AB", "CB"])
        );
    }

    #[test]
    fn test_empty_path_has_no_geometry() {
        let graph = GraphFixture::new().node("A", 0.0, 0.0, &["stopA"]).build();

        let feature = graph.path_to_geojson(&Path::empty()).unwrap();
        assert!(feature.geometry.is_none());
        assert_eq!(feature.property("length").unwrap(), 0.0);
    }
}
