use geo::Point;

use super::{Projection, interpolate_line};
use crate::{Edge, NetworkGraph, Path, routing::Direction};

impl NetworkGraph {
    /// Point reached after travelling `fraction` of a path's total length.
    ///
    /// The edge containing the target distance is found from the stored edge
    /// lengths; the position inside that edge is interpolated along its
    /// geometry in `projection`'s planar space.
    ///
    /// # Panics
    ///
    /// If `fraction` is outside `[0, 1]`, the path is empty, or the path
    /// references edges that are not part of this graph. Paths come from
    /// [`NetworkGraph::shortest_path`], so any of these is a caller bug.
    pub fn interpolate_path<P: Projection + ?Sized>(
        &self,
        path: &Path,
        fraction: f64,
        projection: &P,
    ) -> Point<f64> {
        assert!(
            (0.0..=1.0).contains(&fraction),
            "interpolation fraction {fraction} outside [0, 1]"
        );

        let edges: Vec<(&Edge, Direction)> = path
            .edges
            .iter()
            .map(|step| (self.path_edge(step), step.direction))
            .collect();
        let Some(((last_edge, last_direction), leading)) = edges.split_last() else {
            panic!("cannot interpolate along an empty path");
        };

        let total: f64 = edges.iter().map(|(edge, _)| edge.length).sum();
        let mut remaining = fraction * total;

        for (edge, direction) in leading {
            if remaining <= edge.length {
                return interpolate_line(
                    &edge.geometry,
                    *direction,
                    edge_fraction(remaining, edge.length),
                    projection,
                );
            }
            remaining -= edge.length;
        }

        // The last edge absorbs any rounding residue past the end of the path
        let within = if fraction == 1.0 {
            1.0
        } else {
            edge_fraction(remaining, last_edge.length)
        };
        interpolate_line(&last_edge.geometry, *last_direction, within, projection)
    }
}

fn edge_fraction(remaining: f64, length: f64) -> f64 {
    if length > 0.0 {
        (remaining / length).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use geo::coord;

    use crate::fixtures::{GraphFixture, Identity, Mercator};
    use crate::{NetworkGraph, RouteId, StopId};

    /// A zig-zag line: A -(0,0)..(4,0)- B -(4,0)..(4,3)..(8,3)- C, with the
    /// second edge stored from C back to B.
    fn zig_zag() -> NetworkGraph {
        GraphFixture::new()
            .node("A", 0.0, 0.0, &["stopA"])
            .node("B", 4.0, 0.0, &[])
            .node("C", 8.0, 3.0, &["stopC"])
            .edge("AB", "A", "B", 4.0, &["1"])
            .edge_along(
                "CB",
                "C",
                "B",
                vec![
                    coord! { x: 8.0, y: 3.0 },
                    coord! { x: 4.0, y: 3.0 },
                    coord! { x: 4.0, y: 0.0 },
                ],
                7.0,
                &["1"],
            )
            .build()
    }

    fn path_a_to_c(graph: &mut NetworkGraph) -> std::sync::Arc<crate::Path> {
        graph
            .shortest_path(&StopId::new("stopA"), &StopId::new("stopC"), &RouteId::new("1"))
            .unwrap()
    }

    #[test]
    fn test_ends_of_path() {
        let mut graph = zig_zag();
        let path = path_a_to_c(&mut graph);

        assert_eq!(graph.interpolate_path(&path, 0.0, &Identity), geo::Point::new(0.0, 0.0));
        assert_eq!(graph.interpolate_path(&path, 1.0, &Identity), geo::Point::new(8.0, 3.0));
    }

    #[test]
    fn test_position_inside_reversed_edge() {
        let mut graph = zig_zag();
        let path = path_a_to_c(&mut graph);

        // 11 units in total; 6 units in is 2 units into the reversed edge
        let point = graph.interpolate_path(&path, 6.0 / 11.0, &Identity);
        assert_abs_diff_eq!(point.x(), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(point.y(), 2.0, epsilon = 1e-9);

        // 9 units in is 5 units into the reversed edge, past its corner
        let point = graph.interpolate_path(&path, 9.0 / 11.0, &Identity);
        assert_abs_diff_eq!(point.x(), 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(point.y(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut graph = zig_zag();
        let path = path_a_to_c(&mut graph);

        // Distance travelled along the zig-zag, recovered from the point
        let travelled = |p: geo::Point<f64>| -> f64 {
            if p.y() == 0.0 {
                p.x()
            } else if p.x() == 4.0 {
                4.0 + p.y()
            } else {
                7.0 + (p.x() - 4.0)
            }
        };

        let mut previous = 0.0;
        for step in 0..=100 {
            let point = graph.interpolate_path(&path, f64::from(step) / 100.0, &Identity);
            let distance = travelled(point);
            assert!(distance + 1e-9 >= previous, "step {step}: {distance} < {previous}");
            previous = distance;
        }
        assert_abs_diff_eq!(previous, 11.0, epsilon = 1e-9);
    }

    #[test]
    fn test_uses_caller_projection() {
        let graph = GraphFixture::new()
            .node("A", 0.0, 0.0, &["stopA"])
            .node("B", 0.0, 60.0, &["stopB"])
            .edge("AB", "A", "B", 6_671_000.0, &["1"])
            .build();
        let path = graph
            .find_path(&StopId::new("stopA"), &StopId::new("stopB"), &RouteId::new("1"))
            .unwrap();

        let flat = graph.interpolate_path(&path, 0.5, &Identity);
        let mercator = graph.interpolate_path(&path, 0.5, &Mercator);
        assert_abs_diff_eq!(flat.y(), 30.0, epsilon = 1e-9);
        assert!(mercator.y() > flat.y());
    }

    #[test]
    fn test_zero_length_edges() {
        let graph = GraphFixture::new()
            .node("A", 1.0, 1.0, &["stopA"])
            .node("B", 1.0, 1.0, &["stopB"])
            .edge("AB", "A", "B", 0.0, &["1"])
            .build();
        let path = graph
            .find_path(&StopId::new("stopA"), &StopId::new("stopB"), &RouteId::new("1"))
            .unwrap();

        let point = graph.interpolate_path(&path, 0.5, &Identity);
        assert_eq!(point, geo::Point::new(1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "empty path")]
    fn test_empty_path_is_a_contract_violation() {
        let graph = zig_zag();
        graph.interpolate_path(&crate::Path::empty(), 0.5, &Identity);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn test_negative_fraction_is_a_contract_violation() {
        let mut graph = zig_zag();
        let path = path_a_to_c(&mut graph);
        graph.interpolate_path(&path, -0.1, &Identity);
    }
}
