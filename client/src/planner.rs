//! Per-train goods-type selection and route construction (§4.5).
//!
//! Grounded on the adjacency/Dijkstra engine in `common::game::graph`; this module adds the
//! goods-type profitability scoring and route-target search on top of it.

use std::collections::{HashMap, HashSet};

use common::error::PlanningError;
use common::game::graph::{build_adjacency, dijkstra, AdjacencyMap};
use common::game::{Game, GoodsReservation, GoodsType, Line, LineId, Post, PointId, Train};
use log::debug;

/// Caches the three adjacency variants the Planner reaches for repeatedly, rebuilding them only
/// when the line set changes (§4.4). Exclusion requests outside these three variants (collision
/// re-plans) always rebuild on demand and are never cached.
#[derive(Debug, Default)]
struct AdjacencyCache {
    lines_version: u64,
    full: AdjacencyMap,
    no_markets: AdjacencyMap,
    no_storages: AdjacencyMap,
}

impl AdjacencyCache {
    fn refresh(&mut self, game: &Game) {
        if self.lines_version == game.lines_version && !self.full.is_empty() {
            return;
        }
        let empty_lines = HashSet::new();
        self.full = build_adjacency(game.lines.values(), &HashSet::new(), &empty_lines);

        let market_points: HashSet<PointId> = game
            .posts
            .values()
            .filter(|p| matches!(p, Post::Market(_)))
            .map(Post::point_idx)
            .collect();
        self.no_markets = build_adjacency(game.lines.values(), &market_points, &empty_lines);

        let storage_points: HashSet<PointId> = game
            .posts
            .values()
            .filter(|p| matches!(p, Post::Storage(_)))
            .map(Post::point_idx)
            .collect();
        self.no_storages = build_adjacency(game.lines.values(), &storage_points, &empty_lines);

        self.lines_version = game.lines_version;
    }

    /// The variant that excludes posts of the opposite goods type, for a pickup leg starting
    /// empty (§4.5).
    fn pickup_variant(&self, goods_type: GoodsType) -> &AdjacencyMap {
        match goods_type {
            GoodsType::Product => &self.no_storages,
            GoodsType::Armor => &self.no_markets,
            GoodsType::Empty => &self.full,
        }
    }
}

struct Candidate {
    route: Vec<PointId>,
    expected_amount: u32,
    trip: u32,
    profit: f64,
}

pub struct Planner {
    adjacency: AdjacencyCache,
}

impl Planner {
    pub fn new() -> Self {
        Self { adjacency: AdjacencyCache::default() }
    }

    /// (Re)computes a [`GoodsReservation`] for `train`, which the caller has already determined
    /// is at a decision point. `extra_exclude_lines` carries collision-avoidance exclusions on
    /// top of whichever adjacency variant this call selects.
    pub fn plan(
        &mut self,
        game: &Game,
        train: &Train,
        extra_exclude_lines: &HashSet<LineId>,
    ) -> Result<GoodsReservation, PlanningError> {
        self.adjacency.refresh(game);

        let current_point = game.train_current_point(train).ok_or(PlanningError::UnknownPosition)?;
        let line = game.line(train.line_idx).ok_or(PlanningError::UnknownPosition)?;

        if train.is_full() {
            let route = self.route_to_town(game, current_point, extra_exclude_lines, train.goods)?;
            debug!("train {} full, heading to town via {:?}", train.idx, route.route);
            return Ok(GoodsReservation {
                goods_type: train.goods_type,
                expected_amount: train.goods,
                trip_remaining: route.trip,
                route: normalize_route(route.route, line, current_point),
            });
        }

        if train.goods > 0 {
            // Type-locked: keep pursuing the goods type already aboard.
            let candidate = self
                .best_candidate_for_type(game, train, current_point, train.goods_type, true, extra_exclude_lines)
                .ok_or(PlanningError::NoReachableTarget)?;
            return Ok(GoodsReservation {
                goods_type: train.goods_type,
                expected_amount: candidate.expected_amount,
                trip_remaining: candidate.trip,
                route: normalize_route(candidate.route, line, current_point),
            });
        }

        let product =
            self.best_candidate_for_type(game, train, current_point, GoodsType::Product, false, extra_exclude_lines);
        let armor =
            self.best_candidate_for_type(game, train, current_point, GoodsType::Armor, false, extra_exclude_lines);

        let (goods_type, candidate) = match (product, armor) {
            (Some(p), Some(a)) => {
                if self.product_trains_outnumber_armor(game) {
                    (GoodsType::Armor, a)
                } else {
                    (GoodsType::Product, p)
                }
            }
            (Some(p), None) => (GoodsType::Product, p),
            (None, Some(a)) => (GoodsType::Armor, a),
            (None, None) => return Err(PlanningError::NoReachableTarget),
        };

        Ok(GoodsReservation {
            goods_type,
            expected_amount: candidate.expected_amount,
            trip_remaining: candidate.trip,
            route: normalize_route(candidate.route, line, current_point),
        })
    }

    /// Count-based load-balancing rule (§4.5, Open Question resolution in DESIGN.md): favor
    /// armor once more than twice as many own trains are already hauling product as armor.
    fn product_trains_outnumber_armor(&self, game: &Game) -> bool {
        let (mut product, mut armor) = (0u32, 0u32);
        for reservation in game.reservations.values() {
            match reservation.goods_type {
                GoodsType::Product => product += 1,
                GoodsType::Armor => armor += 1,
                GoodsType::Empty => {}
            }
        }
        product > armor * 2
    }

    fn route_to_town(
        &self,
        game: &Game,
        current_point: PointId,
        extra_exclude_lines: &HashSet<LineId>,
        current_load: u32,
    ) -> Result<Candidate, PlanningError> {
        let adjacency = self.with_extra_exclusions(&self.adjacency.full, game, extra_exclude_lines);
        let sp = dijkstra(&adjacency, current_point, &game.lines);
        let route = sp.path_to(current_point, game.own_town).ok_or(PlanningError::NoReachableTarget)?;
        let trip = sp.distance_to(game.own_town).unwrap_or(0);
        Ok(Candidate { route, expected_amount: current_load, trip, profit: 0.0 })
    }

    fn best_candidate_for_type(
        &self,
        game: &Game,
        train: &Train,
        current_point: PointId,
        goods_type: GoodsType,
        loaded: bool,
        extra_exclude_lines: &HashSet<LineId>,
    ) -> Option<Candidate> {
        // §4.5: the no-opposite-type variant applies only to the empty pickup leg; a train
        // already carrying goods searches the full adjacency for its (type-locked) out leg.
        let out_base = if loaded { &self.adjacency.full } else { self.adjacency.pickup_variant(goods_type) };
        let search_adjacency = self.with_extra_exclusions(out_base, game, extra_exclude_lines);
        let full_adjacency = self.with_extra_exclusions(&self.adjacency.full, game, extra_exclude_lines);

        let out_sp = dijkstra(&search_adjacency, current_point, &game.lines);

        let mut best: Option<Candidate> = None;

        for post in game.posts.values() {
            if post.goods_type() != Some(goods_type) {
                continue;
            }
            let target = post.point_idx();
            let Some(out_trip) = out_sp.distance_to(target) else { continue };
            let Some(out_route) = out_sp.path_to(current_point, target) else { continue };
            let return_sp = dijkstra(&full_adjacency, target, &game.lines);
            let Some(return_trip) = return_sp.distance_to(game.own_town) else { continue };

            let trip = out_trip + return_trip;
            let (stock, capacity, replenishment) = match post {
                Post::Market(m) => (m.product, m.product_capacity, m.replenishment),
                Post::Storage(s) => (s.armor, s.armor_capacity, s.replenishment),
                Post::Town(_) => continue,
            };

            // §4.5: subtract expected_amount for *all* other reservations arriving sooner than
            // this out leg, not just ones bound for this same target/type.
            let reserved: u32 = game
                .reservations
                .iter()
                .filter(|(&idx, _)| idx != train.idx)
                .filter(|(_, r)| r.trip_remaining < out_trip)
                .map(|(_, r)| r.expected_amount)
                .sum();

            let available = (stock + replenishment * out_trip).saturating_sub(reserved).min(capacity);
            let loaded = available.min(train.free_space());
            if loaded == 0 {
                continue;
            }

            let profit = profit_for(goods_type, loaded, trip, game.own_town_post().map(|t| t.population).unwrap_or(1));

            // The reservation's route only covers the current leg (current point -> target);
            // the return leg is re-planned once the train arrives, per the Executor's
            // decision-point trigger (§4.6: "train arrived at route's last point ≠ TOWN"). The
            // full round trip above is used only to score candidates.
            if best.as_ref().map(|b| profit > b.profit).unwrap_or(true) {
                best = Some(Candidate { route: out_route, expected_amount: loaded, trip: out_trip, profit });
            }
        }

        // Terminal "unload" target: standing on a matching post already, head straight to town.
        if let Some(post) = game.post_at(current_point) {
            if post.goods_type() == Some(goods_type) && train.goods > 0 {
                let return_sp = dijkstra(&full_adjacency, current_point, &game.lines);
                if let (Some(route), Some(trip)) =
                    (return_sp.path_to(current_point, game.own_town), return_sp.distance_to(game.own_town))
                {
                    let population = game.own_town_post().map(|t| t.population).unwrap_or(1);
                    let profit = train.goods as f64 - (trip as f64 * population as f64);
                    if best.as_ref().map(|b| profit > b.profit).unwrap_or(true) {
                        best = Some(Candidate { route, expected_amount: train.goods, trip, profit });
                    }
                }
            }
        }

        best
    }

    /// Rebuilds an adjacency variant with additional line exclusions layered on top (never
    /// cached, per §4.4).
    fn with_extra_exclusions(
        &self,
        base: &AdjacencyMap,
        game: &Game,
        extra_exclude_lines: &HashSet<LineId>,
    ) -> AdjacencyMap {
        if extra_exclude_lines.is_empty() {
            return base.clone();
        }
        let mut adjacency = base.clone();
        for (_, neighbors) in adjacency.iter_mut() {
            neighbors.retain(|_, line_idx| !extra_exclude_lines.contains(line_idx));
        }
        adjacency.retain(|_, neighbors| {
            !neighbors.is_empty() || game.lines.values().all(|l| !extra_exclude_lines.contains(&l.idx))
        });
        adjacency
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

fn profit_for(goods_type: GoodsType, loaded: u32, trip: u32, population: u32) -> f64 {
    match goods_type {
        GoodsType::Product => loaded as f64 - (trip as f64 * population as f64),
        GoodsType::Armor => {
            if trip == 0 {
                loaded as f64
            } else {
                loaded as f64 / trip as f64
            }
        }
        GoodsType::Empty => 0.0,
    }
}

/// Ensures both endpoints of the train's current line are represented at the head of the route
/// (§4.5). Dijkstra always sources from `current_point`, one endpoint of `line` by construction,
/// so this only needs to guard the degenerate case where the route is otherwise empty.
fn normalize_route(mut route: Vec<PointId>, line: &Line, current_point: PointId) -> Vec<PointId> {
    if route.is_empty() {
        route.push(current_point);
    }
    if route.len() == 1 {
        let other = line.other_end(current_point);
        if route[0] != other {
            route.push(other);
            route.reverse();
        }
    }
    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::game::wire::StaticMap;
    use common::game::{PlayerId, Post};
    use std::collections::HashMap as Map;

    fn town_post(point_idx: PointId, population: u32) -> Post {
        Post::Town(common::game::post::Town {
            point_idx,
            owner: PlayerId(1),
            population,
            population_capacity: 100,
            product: 0,
            product_capacity: 100,
            armor: 0,
            armor_capacity: 100,
            next_level_price: None,
            events: Vec::new(),
        })
    }

    fn market_post(point_idx: PointId, product: u32, capacity: u32, replenishment: u32) -> Post {
        Post::Market(common::game::post::Market { point_idx, product, product_capacity: capacity, replenishment })
    }

    fn train(idx: i64, line: LineId, position: u32) -> Train {
        Train {
            idx: common::game::TrainId(idx),
            owner: PlayerId(1),
            line_idx: line,
            position,
            speed: 0,
            goods: 0,
            goods_capacity: 40,
            goods_type: GoodsType::Empty,
            cooldown: 0,
            next_level_price: None,
        }
    }

    /// Mirrors spec scenario 3 exactly: TOWN(0) -- L0(len5) -- MARKET(1) with stock 10/cap
    /// 20/replenishment 1 (out=5, return=5, loaded=15, profit=5); TOWN(0) -- L1(len2) --
    /// MARKET(2) with stock 6/cap 20/replenishment 1 (out=2, return=2, loaded=8, profit=4).
    fn scenario_game() -> Game {
        let static_map = StaticMap {
            idx: 1,
            name: "s".into(),
            points: vec![],
            lines: vec![
                common::game::wire::LineDto { idx: LineId(0), length: 5, points: [PointId(0), PointId(1)] },
                common::game::wire::LineDto { idx: LineId(1), length: 2, points: [PointId(0), PointId(2)] },
            ],
        };
        let mut game = Game::new(PlayerId(1), PointId(0), static_map);
        let mut posts = Map::new();
        posts.insert(PointId(0), town_post(PointId(0), 1));
        posts.insert(PointId(1), market_post(PointId(1), 10, 20, 1));
        posts.insert(PointId(2), market_post(PointId(2), 6, 20, 1));
        game.posts = posts;
        game
    }

    #[test]
    fn picks_the_more_profitable_of_two_markets() {
        let game = scenario_game();
        let mut planner = Planner::new();
        let t = train(1, LineId(0), 0);
        let reservation = planner.plan(&game, &t, &HashSet::new()).unwrap();

        assert_eq!(reservation.goods_type, GoodsType::Product);
        assert_eq!(reservation.expected_amount, 15);
        assert_eq!(reservation.trip_remaining, 5);
        // Market 1 (profit 5) beats market 2 (profit 4), matching the spec's worked example.
        assert_eq!(*reservation.route.last().unwrap(), PointId(1));
    }

    #[test]
    fn full_train_always_heads_home() {
        let game = scenario_game();
        let mut planner = Planner::new();
        let mut t = train(1, LineId(0), 5);
        t.goods = 40;
        t.goods_capacity = 40;
        t.goods_type = GoodsType::Product;
        let reservation = planner.plan(&game, &t, &HashSet::new()).unwrap();
        assert_eq!(reservation.route.last().copied(), Some(PointId(0)));
        assert_eq!(reservation.expected_amount, 40);
    }
}
