use std::collections::HashMap;

use log::warn;

use super::{
    ids::{LineId, PlayerId, PointId, TrainId},
    line::Line,
    point::Point,
    post::Post,
    reservation::GoodsReservation,
    train::Train,
    wire::{DynamicMap, Rating, StaticMap},
};

/// The in-memory model of one game: map, posts, trains, ratings and our own trains' goods
/// reservations.
///
/// Points and lines are set once from the static snapshot (LOGIN+MAP(static)) and never change
/// again. Posts, trains, and ratings are replaced wholesale by every MAP(dynamic) snapshot --
/// they are small enough that there is no benefit to a field-by-field merge, and replacing them
/// keeps "what the server just told us" unambiguous. Reservations persist across ticks and are
/// owned and mutated only by the Planner.
#[derive(Debug, Clone)]
pub struct Game {
    pub idx: i64,
    pub own_player: PlayerId,
    pub own_town: PointId,

    pub points: HashMap<PointId, Point>,
    pub lines: HashMap<LineId, Line>,

    pub posts: HashMap<PointId, Post>,
    pub trains: HashMap<TrainId, Train>,
    pub ratings: HashMap<PlayerId, Rating>,

    pub reservations: HashMap<TrainId, GoodsReservation>,

    /// Bumped whenever the line set changes, so adjacency caches know to rebuild. In practice
    /// the line set is fixed for the lifetime of a game, so this only ever moves from 0 to 1.
    pub lines_version: u64,
}

impl Game {
    pub fn new(own_player: PlayerId, own_town: PointId, static_map: StaticMap) -> Self {
        let points = static_map
            .points
            .into_iter()
            .map(|p| (p.idx, Point { idx: p.idx, post_idx: p.post_idx }))
            .collect();
        let lines = static_map
            .lines
            .into_iter()
            .map(|l| (l.idx, Line { idx: l.idx, length: l.length, points: l.points }))
            .collect();

        Self {
            idx: static_map.idx,
            own_player,
            own_town,
            points,
            lines,
            posts: HashMap::new(),
            trains: HashMap::new(),
            ratings: HashMap::new(),
            reservations: HashMap::new(),
            lines_version: 0,
        }
    }

    /// Merges a MAP(dynamic) snapshot in-place: posts, trains, and ratings are wholesale
    /// replaced. Posts that fail to decode (unrecognized type, missing field) are dropped with a
    /// warning rather than aborting the whole merge -- one malformed post should not blind the
    /// bot to every other post on the map.
    pub fn merge_dynamic(&mut self, dynamic: DynamicMap) {
        self.posts = dynamic
            .posts
            .into_iter()
            .filter_map(|dto| {
                let point_idx = dto.point_idx;
                match Post::try_from(dto) {
                    Ok(post) => Some((point_idx, post)),
                    Err(e) => {
                        warn!("dropping undecodable post at point {point_idx}: {e}");
                        None
                    }
                }
            })
            .collect();
        self.trains = dynamic.trains.into_iter().map(|t| (t.idx, t)).collect();
        self.ratings = dynamic.ratings;
    }

    pub fn own_trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.values().filter(|t| t.owner == self.own_player)
    }

    pub fn opponent_trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.values().filter(|t| t.owner != self.own_player)
    }

    pub fn own_town_post(&self) -> Option<&super::post::Town> {
        self.posts.get(&self.own_town).and_then(Post::as_town)
    }

    pub fn line(&self, idx: LineId) -> Option<&Line> {
        self.lines.get(&idx)
    }

    pub fn post_at(&self, point: PointId) -> Option<&Post> {
        self.posts.get(&point)
    }

    /// The line directly joining two points, if one exists. Used by the Executor to turn a
    /// route's first two points back into a concrete (line, direction) to MOVE on.
    pub fn line_between(&self, a: PointId, b: PointId) -> Option<LineId> {
        self.lines
            .values()
            .find(|line| line.has_endpoint(a) && line.has_endpoint(b))
            .map(|line| line.idx)
    }

    /// The point a train currently occupies, valid only when the train sits exactly at one of
    /// its line's endpoints (§3: position 0 is the start, position == length is the end).
    pub fn train_current_point(&self, train: &Train) -> Option<PointId> {
        let line = self.line(train.line_idx)?;
        if train.position == 0 {
            Some(line.start())
        } else if train.position == line.length {
            Some(line.end())
        } else {
            None
        }
    }

    /// Advances every reservation's `trip_remaining` for trains that moved this tick, and drops
    /// reservations for trains whose route is exhausted at TOWN (§3 lifecycle).
    pub fn tick_reservations(&mut self) {
        let mut to_clear = Vec::new();
        for (&train_idx, reservation) in self.reservations.iter_mut() {
            let moved = self
                .trains
                .get(&train_idx)
                .map(|t| t.speed != 0)
                .unwrap_or(false);
            reservation.tick(moved);

            let at_town = self
                .trains
                .get(&train_idx)
                .and_then(|t| self.train_current_point(t))
                .map(|p| p == self.own_town)
                .unwrap_or(false);
            if at_town && reservation.target() == Some(self.own_town) {
                to_clear.push(train_idx);
            }
        }
        for train_idx in to_clear {
            self.reservations.remove(&train_idx);
        }
    }
}
