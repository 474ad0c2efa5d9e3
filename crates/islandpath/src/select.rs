//! Greedy tour construction with pluggable next-element selection.
//!
//! Both segment ordering inside an island and island sequencing inside a
//! layer are greedy chains: from the current tail, pick something unvisited,
//! possibly walk it backwards, repeat. The choice of "something" is a
//! [`NextSelector`], so a smarter strategy can replace the nearest-neighbour
//! default without touching either caller.

use crate::config::OrderingStrategy;
use crate::geom::{Point2, Segment};

/// A selected candidate and its orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    /// Index into the candidate slice.
    pub index: usize,
    /// Visit the candidate end-to-start.
    pub reversed: bool,
}

/// Strategy that picks the next element of a tour.
pub trait NextSelector: Send + Sync {
    /// Choose among candidates not yet `visited`, given the tour's tail.
    ///
    /// Must return `Some` while any candidate is unvisited. `reversed` may
    /// only be set when `allow_reverse` is true.
    fn select(
        &self,
        tail: &Point2,
        candidates: &[Segment],
        visited: &[bool],
        allow_reverse: bool,
    ) -> Option<Choice>;
}

/// Strictly nearest endpoint wins; ties go to the first found, start before
/// end.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestEndpoint;

impl NextSelector for NearestEndpoint {
    fn select(
        &self,
        tail: &Point2,
        candidates: &[Segment],
        visited: &[bool],
        allow_reverse: bool,
    ) -> Option<Choice> {
        let mut best: Option<Choice> = None;
        let mut best_dist = f64::INFINITY;

        for (index, candidate) in candidates.iter().enumerate() {
            if visited[index] {
                continue;
            }

            let d_start = (candidate.start - tail).norm();
            if d_start < best_dist || best.is_none() {
                best_dist = d_start;
                best = Some(Choice {
                    index,
                    reversed: false,
                });
            }

            if allow_reverse {
                let d_end = (candidate.end - tail).norm();
                if d_end < best_dist {
                    best_dist = d_end;
                    best = Some(Choice {
                        index,
                        reversed: true,
                    });
                }
            }
        }

        best
    }
}

/// Keep the input order, only flipping each element toward the tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOrder;

impl NextSelector for SweepOrder {
    fn select(
        &self,
        tail: &Point2,
        candidates: &[Segment],
        visited: &[bool],
        allow_reverse: bool,
    ) -> Option<Choice> {
        let index = visited.iter().position(|v| !v)?;
        let candidate = &candidates[index];
        let reversed =
            allow_reverse && (candidate.end - tail).norm() < (candidate.start - tail).norm();
        Some(Choice { index, reversed })
    }
}

/// Selector for a configured strategy.
pub fn selector_for(strategy: OrderingStrategy) -> Box<dyn NextSelector> {
    match strategy {
        OrderingStrategy::NearestEndpoint => Box::new(NearestEndpoint),
        OrderingStrategy::Sweep => Box::new(SweepOrder),
    }
}

/// Build a tour over all candidates, starting with the first one as given.
///
/// Every candidate appears exactly once in the result. A selector that gives
/// up early is backfilled with the remaining candidates in input order.
pub fn greedy_tour(
    candidates: &[Segment],
    selector: &dyn NextSelector,
    allow_reverse: bool,
) -> Vec<Choice> {
    let n = candidates.len();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);

    visited[0] = true;
    tour.push(Choice {
        index: 0,
        reversed: false,
    });
    let mut tail = candidates[0].end;

    for _ in 1..n {
        let choice = selector
            .select(&tail, candidates, &visited, allow_reverse)
            .filter(|c| !visited[c.index])
            .or_else(|| {
                visited.iter().position(|v| !v).map(|index| Choice {
                    index,
                    reversed: false,
                })
            });
        let Some(choice) = choice else {
            break;
        };
        let choice = Choice {
            reversed: choice.reversed && allow_reverse,
            ..choice
        };

        visited[choice.index] = true;
        let chosen = &candidates[choice.index];
        tail = if choice.reversed { chosen.start } else { chosen.end };
        tour.push(choice);
    }

    tour
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn test_nearest_prefers_closer_endpoint() {
        let candidates = vec![seg(0.0, 0.0, 10.0, 0.0), seg(0.0, 5.0, 10.0, 5.0)];
        let visited = vec![true, false];
        let choice = NearestEndpoint
            .select(&Point2::new(10.0, 0.0), &candidates, &visited, true)
            .unwrap();
        assert_eq!(
            choice,
            Choice {
                index: 1,
                reversed: true
            }
        );
    }

    #[test]
    fn test_nearest_without_reverse() {
        let candidates = vec![seg(0.0, 5.0, 10.0, 5.0), seg(20.0, 5.0, 30.0, 5.0)];
        let visited = vec![false, false];
        let choice = NearestEndpoint
            .select(&Point2::new(11.0, 5.0), &candidates, &visited, false)
            .unwrap();
        // End of the first candidate is closest but may not be used.
        assert_eq!(
            choice,
            Choice {
                index: 0,
                reversed: false
            }
        );
    }

    #[test]
    fn test_ties_go_to_first_found() {
        let candidates = vec![seg(1.0, 0.0, 5.0, 0.0), seg(-1.0, 0.0, -5.0, 0.0)];
        let visited = vec![false, false];
        let choice = NearestEndpoint
            .select(&Point2::origin(), &candidates, &visited, true)
            .unwrap();
        assert_eq!(choice.index, 0);
        assert!(!choice.reversed);
    }

    #[test]
    fn test_sweep_keeps_order() {
        let candidates = vec![
            seg(0.0, 0.0, 10.0, 0.0),
            seg(0.0, 100.0, 10.0, 100.0),
            seg(0.0, 1.0, 10.0, 1.0),
        ];
        let tour = greedy_tour(&candidates, &SweepOrder, true);
        let order: Vec<usize> = tour.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(tour[1].reversed);
    }

    #[test]
    fn test_tour_visits_everything_once() {
        let candidates: Vec<Segment> = (0..7)
            .map(|i| seg(i as f64 * 3.0, 0.0, i as f64 * 3.0, 2.0))
            .rev()
            .collect();
        let tour = greedy_tour(&candidates, &NearestEndpoint, true);
        let mut seen: Vec<usize> = tour.iter().map(|c| c.index).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
    }

    struct GivesUp;

    impl NextSelector for GivesUp {
        fn select(&self, _: &Point2, _: &[Segment], _: &[bool], _: bool) -> Option<Choice> {
            None
        }
    }

    #[test]
    fn test_tour_backfills_when_selector_gives_up() {
        let candidates = vec![seg(0.0, 0.0, 1.0, 0.0), seg(5.0, 0.0, 6.0, 0.0)];
        let tour = greedy_tour(&candidates, &GivesUp, true);
        assert_eq!(tour.len(), 2);
        assert_eq!(tour[1].index, 1);
    }
}
