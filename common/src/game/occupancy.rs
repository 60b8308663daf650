use std::collections::{HashMap, HashSet};

use super::{
    ids::{LineId, PointId, TrainId},
    line::Line,
    state::Game,
};

/// Projected positions for every train, used by the collision check (§4.6). For our own trains
/// this is the position the Executor is about to MOVE them to this tick; for opponents it is
/// their last observed position advanced by their last observed speed.
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    pub positions: HashMap<TrainId, (LineId, u32)>,
}

impl Occupancy {
    /// Seeds projected positions for every train currently known to `game`, extrapolating
    /// opponents by one step and leaving ours for the Executor to overwrite as it plans them.
    pub fn project_opponents(game: &Game) -> Self {
        let mut positions = HashMap::new();
        for train in game.trains.values() {
            if train.owner == game.own_player {
                continue;
            }
            let Some(line) = game.lines.get(&train.line_idx) else {
                continue;
            };
            let next = (train.position as i64 + train.speed as i64).clamp(0, line.length as i64) as u32;
            positions.insert(train.idx, (train.line_idx, next));
        }
        Self { positions }
    }

    pub fn set(&mut self, train: TrainId, line: LineId, position: u32) {
        self.positions.insert(train, (line, position));
    }

    /// `line -> {occupied positions}`, derived from the current projection.
    pub fn occupied_lines(&self) -> HashMap<LineId, HashSet<u32>> {
        let mut map: HashMap<LineId, HashSet<u32>> = HashMap::new();
        for &(line, position) in self.positions.values() {
            map.entry(line).or_default().insert(position);
        }
        map
    }

    /// The set of points occupied by a train sitting exactly at a line endpoint.
    pub fn occupied_points(&self, lines: &HashMap<LineId, Line>) -> HashSet<PointId> {
        let mut points = HashSet::new();
        for &(line_idx, position) in self.positions.values() {
            if let Some(line) = lines.get(&line_idx) {
                if position == 0 {
                    points.insert(line.start());
                } else if position == line.length {
                    points.insert(line.end());
                }
            }
        }
        points
    }
}
