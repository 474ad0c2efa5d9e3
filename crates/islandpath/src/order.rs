//! Visiting order of the infill segments inside one island.

use crate::geom::{Segment, Vec2};
use crate::select::{greedy_tour, NearestEndpoint, NextSelector};

/// Order segments with the default nearest-endpoint selector.
///
/// Segments are first swept along the fill direction, then chained greedily
/// from the first one; each pick may be reversed so that its nearer endpoint
/// connects to the tail. The result has the same length as the input.
pub fn order_segments(segments: &[Segment], angle_deg: f64) -> Vec<Segment> {
    order_segments_with(segments, angle_deg, &NearestEndpoint)
}

/// Order segments with a caller-supplied selector.
pub fn order_segments_with(
    segments: &[Segment],
    angle_deg: f64,
    selector: &dyn NextSelector,
) -> Vec<Segment> {
    if segments.is_empty() {
        return Vec::new();
    }

    let sorted = sweep_sort(segments, angle_deg);
    greedy_tour(&sorted, selector, true)
        .into_iter()
        .map(|choice| {
            let seg = sorted[choice.index];
            if choice.reversed {
                seg.reversed()
            } else {
                seg
            }
        })
        .collect()
}

/// Stable sort by midpoint projection on the fill direction.
fn sweep_sort(segments: &[Segment], angle_deg: f64) -> Vec<Segment> {
    let theta = angle_deg.to_radians();
    let dir = Vec2::new(theta.cos(), theta.sin());

    let mut keyed: Vec<(f64, Segment)> = segments
        .iter()
        .map(|s| (s.midpoint().coords.dot(&dir), *s))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, s)| s).collect()
}
