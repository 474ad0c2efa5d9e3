//! Island ordering and stitching into one layer path.

use geo::Relate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diagnostics::InterIslandCrossing;
use crate::geom::{Segment, Travel, TravelKind};
use crate::island::Island;
use crate::select::{greedy_tour, NextSelector};
use crate::travel::PathElement;

/// The routed path of one island.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandPath {
    /// Index of the island in the layer.
    pub island_index: usize,
    /// Extrusions with their connecting travels.
    pub elements: Vec<PathElement>,
}

impl IslandPath {
    /// Create an island path.
    pub fn new(island_index: usize, elements: Vec<PathElement>) -> Self {
        Self {
            island_index,
            elements,
        }
    }

    fn span(&self) -> Option<Segment> {
        let first = self.elements.iter().find_map(|e| e.extrude)?;
        let last = self.elements.iter().rev().find_map(|e| e.extrude)?;
        Some(Segment::new(first.start, last.end))
    }
}

/// The complete toolpath of one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPath {
    /// Path elements in execution order.
    pub elements: Vec<PathElement>,
    /// Island indices in the order they are visited.
    pub island_order: Vec<usize>,
}

impl LayerPath {
    /// Total deposited length.
    pub fn extrude_length(&self) -> f64 {
        self.elements
            .iter()
            .filter_map(|e| e.extrude.as_ref())
            .map(Segment::length)
            .sum()
    }

    /// Total non-depositing length.
    pub fn travel_length(&self) -> f64 {
        self.travels().map(Travel::length).sum()
    }

    /// Number of extrusions.
    pub fn extrude_count(&self) -> usize {
        self.elements.iter().filter(|e| e.extrude.is_some()).count()
    }

    /// Number of travel moves of a given kind.
    pub fn travel_count(&self, kind: TravelKind) -> usize {
        self.travels().filter(|t| t.kind == kind).count()
    }

    /// All travel moves in order.
    pub fn travels(&self) -> impl Iterator<Item = &Travel> {
        self.elements.iter().filter_map(|e| e.travel.as_ref())
    }

    /// Is there nothing to do on this layer?
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Order island paths and join them with inter-island travel.
///
/// Starts from the first non-empty path, then repeatedly moves to the
/// unvisited island whose first extrusion is closest to the current island's
/// last one, as picked by `selector`. Islands are never walked backwards.
pub fn sequence_islands(paths: &[IslandPath], selector: &dyn NextSelector) -> LayerPath {
    let (spans, nonempty): (Vec<Segment>, Vec<&IslandPath>) = paths
        .iter()
        .filter_map(|p| p.span().map(|s| (s, p)))
        .unzip();

    let tour = greedy_tour(&spans, selector, false);

    let mut layer = LayerPath::default();
    let mut previous: Option<Segment> = None;
    for choice in tour {
        let path = nonempty[choice.index];
        let span = spans[choice.index];
        if let Some(prev) = previous {
            layer
                .elements
                .push(PathElement::travel_only(Travel::inter_island(prev.end, span.start)));
        }
        layer.elements.extend(path.elements.iter().cloned());
        layer.island_order.push(path.island_index);
        previous = Some(span);
    }

    debug!(
        islands = layer.island_order.len(),
        elements = layer.elements.len(),
        "islands sequenced"
    );
    layer
}

/// Find inter-island moves that pass through the interior of any island.
///
/// Only reports; the path is left as is.
pub fn find_inter_island_crossings(
    layer: &LayerPath,
    islands: &[Island],
) -> Vec<InterIslandCrossing> {
    let polygons: Vec<_> = islands.iter().map(Island::to_polygon).collect();
    let mut crossings = Vec::new();

    for travel in layer.travels().filter(|t| t.kind == TravelKind::InterIsland) {
        let (Some(&from), Some(&to)) = (travel.start(), travel.end()) else {
            continue;
        };
        let line = Segment::new(from, to).to_line();
        let crossed_islands: Vec<usize> = polygons
            .iter()
            .enumerate()
            .filter(|(_, polygon)| {
                line.relate(*polygon)
                    .matches("T********")
                    .unwrap_or(false)
            })
            .map(|(i, _)| i)
            .collect();

        if !crossed_islands.is_empty() {
            warn!(
                from = ?(from.x, from.y),
                to = ?(to.x, to.y),
                islands = ?crossed_islands,
                "inter-island travel crosses material"
            );
            crossings.push(InterIslandCrossing {
                from,
                to,
                crossed_islands,
            });
        }
    }

    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point2;
    use crate::select::NearestEndpoint;

    fn stroke(x0: f64, y0: f64, x1: f64, y1: f64) -> PathElement {
        PathElement::extrude(
            Segment::new(Point2::new(x0, y0), Point2::new(x1, y1)),
            None,
        )
    }

    fn unit_square(x0: f64) -> Island {
        Island::new(
            vec![
                Point2::new(x0, 0.0),
                Point2::new(x0 + 1.0, 0.0),
                Point2::new(x0 + 1.0, 1.0),
                Point2::new(x0, 1.0),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_two_islands_one_inter_travel() {
        let paths = vec![
            IslandPath::new(0, vec![stroke(0.0, 0.5, 1.0, 0.5)]),
            IslandPath::new(1, vec![stroke(100.0, 0.5, 101.0, 0.5)]),
        ];
        let layer = sequence_islands(&paths, &NearestEndpoint);

        assert_eq!(layer.island_order, vec![0, 1]);
        assert_eq!(layer.travel_count(TravelKind::InterIsland), 1);
        let travel = layer.travels().next().unwrap();
        assert!(travel.length() > 98.9 && travel.length() < 101.1);
        assert!(layer.elements[1].extrude.is_none());
        assert!((layer.extrude_length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_island_next() {
        let paths = vec![
            IslandPath::new(0, vec![stroke(0.0, 0.0, 1.0, 0.0)]),
            IslandPath::new(1, vec![stroke(50.0, 0.0, 51.0, 0.0)]),
            IslandPath::new(2, vec![stroke(5.0, 0.0, 6.0, 0.0)]),
        ];
        let layer = sequence_islands(&paths, &NearestEndpoint);
        assert_eq!(layer.island_order, vec![0, 2, 1]);

        let mut visited = layer.island_order.clone();
        visited.sort_unstable();
        visited.dedup();
        assert_eq!(visited.len(), layer.island_order.len());
    }

    #[test]
    fn test_empty_paths_skipped() {
        let paths = vec![
            IslandPath::new(0, Vec::new()),
            IslandPath::new(1, vec![stroke(3.0, 0.0, 4.0, 0.0)]),
        ];
        let layer = sequence_islands(&paths, &NearestEndpoint);
        assert_eq!(layer.island_order, vec![1]);
        assert_eq!(layer.travel_count(TravelKind::InterIsland), 0);

        assert!(sequence_islands(&[], &NearestEndpoint).is_empty());
    }

    #[test]
    fn test_crossing_check_reports_only() {
        let islands = vec![unit_square(0.0), unit_square(10.0), unit_square(20.0)];
        let paths = vec![
            IslandPath::new(0, vec![stroke(0.0, 0.5, 1.0, 0.5)]),
            IslandPath::new(2, vec![stroke(20.0, 0.5, 21.0, 0.5)]),
        ];
        let layer = sequence_islands(&paths, &NearestEndpoint);
        let before = layer.clone();

        let crossings = find_inter_island_crossings(&layer, &islands);
        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].crossed_islands, vec![1]);
        assert_eq!(layer, before);
    }

    #[test]
    fn test_clear_inter_travel_not_reported() {
        let islands = vec![unit_square(0.0), unit_square(100.0)];
        let paths = vec![
            IslandPath::new(0, vec![stroke(0.0, 0.5, 1.0, 0.5)]),
            IslandPath::new(1, vec![stroke(100.0, 0.5, 101.0, 0.5)]),
        ];
        let layer = sequence_islands(&paths, &NearestEndpoint);
        assert!(find_inter_island_crossings(&layer, &islands).is_empty());
    }
}
