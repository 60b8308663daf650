//! Adjacency construction and shortest-path search over the point/line graph.
//!
//! Grounded on the teacher's grid-based Dijkstra (`game/map/dijkstra.rs` in the original
//! workspace): a `BinaryHeap` of `(distance, point)` pairs ordered so the heap behaves as a
//! min-heap, with distance relaxation recording the predecessor on the shortest path found so
//! far.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BinaryHeap, HashMap, HashSet},
};

use super::{
    ids::{LineId, PointId},
    line::Line,
};

/// `point -> {neighbor -> line}`, symmetric by construction: if `u` maps to `v` via line `l`,
/// `v` maps to `u` via the same `l`. The inner map is a `BTreeMap` so iteration order is
/// ascending by point id, which is what gives the shortest-path tie-break below its
/// determinism.
pub type AdjacencyMap = HashMap<PointId, BTreeMap<PointId, LineId>>;

/// Builds the adjacency map for a line set, omitting any line that touches an excluded point or
/// is itself excluded.
pub fn build_adjacency(
    lines: impl Iterator<Item = impl std::borrow::Borrow<Line>>,
    exclude_points: &HashSet<PointId>,
    exclude_lines: &HashSet<LineId>,
) -> AdjacencyMap {
    let mut adjacency: AdjacencyMap = AdjacencyMap::new();
    for line_ref in lines {
        let line = line_ref.borrow();
        if exclude_lines.contains(&line.idx) {
            continue;
        }
        let (a, b) = (line.start(), line.end());
        if exclude_points.contains(&a) || exclude_points.contains(&b) {
            continue;
        }
        adjacency.entry(a).or_default().insert(b, line.idx);
        adjacency.entry(b).or_default().insert(a, line.idx);
    }
    adjacency
}

#[derive(Debug, Clone)]
pub struct ShortestPaths {
    pub dist: HashMap<PointId, u32>,
    pub prev: HashMap<PointId, PointId>,
}

impl ShortestPaths {
    /// Reconstructs the path from the Dijkstra source to `target`, inclusive of both ends.
    /// `None` if `target` was unreachable.
    pub fn path_to(&self, source: PointId, target: PointId) -> Option<Vec<PointId>> {
        if !self.dist.contains_key(&target) {
            return None;
        }
        let mut path = vec![target];
        let mut current = target;
        while current != source {
            let prev = *self.prev.get(&current)?;
            path.push(prev);
            current = prev;
        }
        path.reverse();
        Some(path)
    }

    pub fn distance_to(&self, target: PointId) -> Option<u32> {
        self.dist.get(&target).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapItem {
    dist: u32,
    point: PointId,
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed distance ordering turns `BinaryHeap` (a max-heap) into a min-heap on
        // distance. Ties break on the smaller point id, per the spec's determinism
        // requirement.
        other.dist.cmp(&self.dist).then_with(|| other.point.cmp(&self.point))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra's algorithm from `source` over `adjacency`, weighted by line length. Tolerates
/// disconnected components: unreachable points are simply absent from the result.
pub fn dijkstra(adjacency: &AdjacencyMap, source: PointId, lines: &HashMap<LineId, Line>) -> ShortestPaths {
    let mut dist: HashMap<PointId, u32> = HashMap::new();
    let mut prev: HashMap<PointId, PointId> = HashMap::new();
    let mut heap = BinaryHeap::new();

    dist.insert(source, 0);
    heap.push(HeapItem { dist: 0, point: source });

    while let Some(HeapItem { dist: d, point }) = heap.pop() {
        if let Some(&best) = dist.get(&point) {
            if d > best {
                continue;
            }
        }

        let Some(neighbors) = adjacency.get(&point) else {
            continue;
        };

        for (&neighbor, &line_idx) in neighbors {
            let Some(line) = lines.get(&line_idx) else {
                continue;
            };
            let new_dist = d + line.length;
            let better = dist.get(&neighbor).map_or(true, |&cur| new_dist < cur);
            if better {
                dist.insert(neighbor, new_dist);
                prev.insert(neighbor, point);
                heap.push(HeapItem { dist: new_dist, point: neighbor });
            }
        }
    }

    ShortestPaths { dist, prev }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_lines() -> HashMap<LineId, Line> {
        // 0 - 1 - 2 - 3 - 0, each edge length 10.
        [
            Line { idx: LineId(0), length: 10, points: [PointId(0), PointId(1)] },
            Line { idx: LineId(1), length: 10, points: [PointId(1), PointId(2)] },
            Line { idx: LineId(2), length: 10, points: [PointId(2), PointId(3)] },
            Line { idx: LineId(3), length: 10, points: [PointId(3), PointId(0)] },
        ]
        .into_iter()
        .map(|l| (l.idx, l))
        .collect()
    }

    #[test]
    fn adjacency_is_symmetric() {
        let lines = ring_lines();
        let adjacency = build_adjacency(lines.values(), &HashSet::new(), &HashSet::new());
        for line in lines.values() {
            let (a, b) = (line.start(), line.end());
            assert_eq!(adjacency[&a][&b], line.idx);
            assert_eq!(adjacency[&b][&a], line.idx);
        }
    }

    #[test]
    fn dijkstra_on_a_ring_matches_spec_scenario() {
        let lines = ring_lines();
        let adjacency = build_adjacency(lines.values(), &HashSet::new(), &HashSet::new());
        let sp = dijkstra(&adjacency, PointId(0), &lines);

        assert_eq!(sp.distance_to(PointId(0)), Some(0));
        assert_eq!(sp.distance_to(PointId(1)), Some(10));
        assert_eq!(sp.distance_to(PointId(2)), Some(20));
        assert_eq!(sp.distance_to(PointId(3)), Some(10));

        // Tie-break: point 2 is reachable via 1 or 3, both at distance 10; the smaller
        // neighbor id (1) wins.
        assert_eq!(sp.prev[&PointId(2)], PointId(1));
    }

    #[test]
    fn disconnected_components_are_tolerated() {
        let mut lines = ring_lines();
        lines.insert(
            LineId(4),
            Line { idx: LineId(4), length: 5, points: [PointId(10), PointId(11)] },
        );
        let adjacency = build_adjacency(lines.values(), &HashSet::new(), &HashSet::new());
        let sp = dijkstra(&adjacency, PointId(0), &lines);
        assert_eq!(sp.distance_to(PointId(10)), None);
        assert!(sp.path_to(PointId(0), PointId(10)).is_none());
    }

    #[test]
    fn excluded_points_remove_touching_lines() {
        let lines = ring_lines();
        let mut exclude = HashSet::new();
        exclude.insert(PointId(1));
        let adjacency = build_adjacency(lines.values(), &exclude, &HashSet::new());
        assert!(!adjacency.contains_key(&PointId(1)));
        assert!(!adjacency[&PointId(0)].contains_key(&PointId(1)));
        assert!(!adjacency[&PointId(2)].contains_key(&PointId(1)));
    }
}
