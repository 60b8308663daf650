use serde::{Deserialize, Serialize};

use super::ids::{LineId, PointId};

/// An undirected edge between two points. `length` doubles as both the Dijkstra edge weight and
/// the number of integer positions a train crosses end to end (§9 of the spec: these two
/// semantics are not separable).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Line {
    pub idx: LineId,
    pub length: u32,
    /// `points[0]` is the line's start, `points[1]` its end. Train position 0 sits at the start,
    /// position `length` at the end.
    pub points: [PointId; 2],
}

impl Line {
    pub fn start(&self) -> PointId {
        self.points[0]
    }

    pub fn end(&self) -> PointId {
        self.points[1]
    }

    /// The other endpoint of the line, given one of its endpoints. Panics if `point` is not an
    /// endpoint of this line -- callers only ever ask this of a line they already know a train
    /// sits on.
    pub fn other_end(&self, point: PointId) -> PointId {
        if point == self.start() {
            self.end()
        } else if point == self.end() {
            self.start()
        } else {
            panic!("{:?} is not an endpoint of line {:?}", point, self.idx);
        }
    }

    pub fn has_endpoint(&self, point: PointId) -> bool {
        self.start() == point || self.end() == point
    }

    /// The direction (+1/-1) a train must move in to go from `from` to the other endpoint.
    pub fn direction_from(&self, from: PointId) -> i8 {
        if from == self.start() {
            1
        } else {
            -1
        }
    }

    /// The in-line position of one of this line's endpoints.
    pub fn position_of(&self, point: PointId) -> u32 {
        if point == self.start() {
            0
        } else {
            self.length
        }
    }
}
