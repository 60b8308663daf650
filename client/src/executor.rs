//! Per-tick MOVE/UPGRADE/TURN dispatch, collision avoidance, and upgrade spending (§4.6).
//!
//! Grounded on the teacher's turn-loop shape (`client/src/main.rs`'s player-turn cycle): one
//! pass over the bot's own units per tick, side effects dispatched through the `Client`, then an
//! explicit turn-advance call before the next pass reads a fresh snapshot.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::{debug, info, warn};

use common::{
    bridge::{BridgeEvent, BridgeSender},
    client::Client,
    error::ClientError,
    game::{occupancy::Occupancy, Game, Line, LineId, PointId, Train, TrainId},
};

use crate::planner::Planner;

/// A cooperative stop flag: checked at the top of every tick, never interrupts an in-flight
/// socket call (§5: "in-flight socket calls complete or time out first").
#[derive(Clone)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the Client, the Planner, and the reservation-driven tick loop.
pub struct Executor {
    client: Client,
    planner: Planner,
    bridge: BridgeSender,
}

impl Executor {
    pub fn new(client: Client, planner: Planner, bridge: BridgeSender) -> Self {
        Self { client, planner, bridge }
    }

    /// Runs ticks until `stop` is set, a GAME_OVER event appears on the own town, or a fatal
    /// error occurs. Always attempts LOGOUT on the way out (§4.6, §7).
    pub async fn run(&mut self, game: &mut Game, stop: &StopSignal) -> Result<(), ClientError> {
        let result = self.run_inner(game, stop).await;

        if let Err(e) = &result {
            self.bridge.send(BridgeEvent::StatusText(format!("Error: {e}"))).await;
            self.bridge.send(BridgeEvent::GameOver).await;
        }

        if let Err(e) = self.client.logout().await {
            warn!("logout failed on exit: {e}");
        }

        result
    }

    async fn run_inner(&mut self, game: &mut Game, stop: &StopSignal) -> Result<(), ClientError> {
        loop {
            if stop.is_stopped() {
                info!("stop requested; ending run before the next tick");
                return Ok(());
            }

            if let Some(town) = game.own_town_post() {
                if town.events.iter().any(|e| e.is_game_over()) {
                    info!("game over event received on own town");
                    self.bridge.send(BridgeEvent::GameOver).await;
                    return Ok(());
                }
            }

            self.tick(game).await?;
        }
    }

    async fn tick(&mut self, game: &mut Game) -> Result<(), ClientError> {
        let mut occupancy = Occupancy::project_opponents(game);

        let mut own_train_ids: Vec<TrainId> = game.own_trains().map(|t| t.idx).collect();
        own_train_ids.sort();

        let mut moves = Vec::with_capacity(own_train_ids.len());
        for train_idx in own_train_ids {
            let Some(train) = game.trains.get(&train_idx) else { continue };
            if train.cooldown > 0 {
                // Not eligible for a MOVE this tick, but still occupies its current slot for
                // everyone else's collision check.
                occupancy.set(train_idx, train.line_idx, train.position);
                continue;
            }

            let (next_line, next_position, next_speed) = self.decide_move(game, train_idx, &occupancy);
            occupancy.set(train_idx, next_line, next_position);
            moves.push((train_idx, next_line, next_speed));
        }

        for (train_idx, line_idx, speed) in moves {
            if let Err(e) = self.client.move_train(line_idx, speed, train_idx).await {
                warn!("MOVE failed for train {train_idx}: {e}");
            }
        }

        let (upgrade_posts, upgrade_trains) = self.plan_upgrades(game, &occupancy);
        if !upgrade_posts.is_empty() || !upgrade_trains.is_empty() {
            if let Err(e) = self.client.upgrade(upgrade_posts, upgrade_trains).await {
                warn!("UPGRADE failed: {e}");
            }
        }

        self.client.turn().await?;
        let dynamic = self.client.map_dynamic().await?;
        match serde_json::to_value(&dynamic) {
            Ok(value) => self.bridge.send(BridgeEvent::MapDynamic(value)).await,
            Err(e) => warn!("failed to serialize dynamic snapshot for the bridge: {e}"),
        }
        game.merge_dynamic(dynamic);
        game.tick_reservations();

        Ok(())
    }

    /// Decides this tick's (line, position, speed) for one own train: plans or re-plans at
    /// decision points (§4.5/§4.6 step 1.a), otherwise simply continues along the current line
    /// (step 1.b), then runs the result through collision avoidance.
    fn decide_move(&mut self, game: &mut Game, train_idx: TrainId, occupancy: &Occupancy) -> (LineId, u32, i8) {
        let train = game.trains.get(&train_idx).expect("train just looked up by idx").clone();
        let Some(line) = game.line(train.line_idx).cloned() else {
            return (train.line_idx, train.position, 0);
        };

        if !train.at_decision_point(line.length) {
            let next_position = clamp_step(train.position, train.speed, line.length);
            if conflicts(game, train.line_idx, next_position, occupancy) {
                return (train.line_idx, train.position, 0);
            }
            return (train.line_idx, next_position, train.speed);
        }

        if self.needs_replan(game, &train) {
            match self.planner.plan(game, &train, &HashSet::new()) {
                Ok(reservation) => {
                    game.reservations.insert(train_idx, reservation);
                }
                Err(e) => {
                    // Keep whatever reservation (if any) the train already had rather than
                    // clearing it -- a mid-line collision stop reaches this branch with
                    // `goods == 0` and an undefined graph position, which the Planner can't
                    // route from, but the train's existing leg is still valid to resume.
                    debug!("train {train_idx}: planner declined a new route, keeping prior one if any: {e}");
                }
            }
        }

        self.follow_reservation(game, &train, occupancy)
    }

    /// True when the train's current reservation must be (re)computed before it can move this
    /// tick (§4.6 step 1.a): no reservation yet, the train just filled up and isn't already
    /// homeward bound, it is empty and not yet committed to a pickup, or it just reached the end
    /// of a non-TOWN leg.
    fn needs_replan(&self, game: &Game, train: &Train) -> bool {
        let Some(reservation) = game.reservations.get(&train.idx) else {
            return true;
        };
        let tail_is_town = reservation.target() == Some(game.own_town);

        if train.is_full() && !tail_is_town {
            return true;
        }
        if train.goods == 0 && !tail_is_town {
            return true;
        }
        let current_point = game.train_current_point(train);
        current_point.is_some() && current_point == reservation.target() && !tail_is_town
    }

    /// Turns the train's current reservation into a concrete next (line, position, speed),
    /// retrying with collision-avoidance exclusions until a conflict-free hop is found or none
    /// remains (§4.6 collision avoidance).
    ///
    /// The stepping base is the train's *actual* position, not the route's nominal endpoint
    /// position: this is what lets a train resume correctly after a mid-line collision stop
    /// (speed 0, position strictly between the line's endpoints) without a fresh Planner call,
    /// since `route[0]`/`route[1]` still describe the same leg it was already partway through.
    fn follow_reservation(&mut self, game: &mut Game, train: &Train, occupancy: &Occupancy) -> (LineId, u32, i8) {
        let mut exclude_lines: HashSet<LineId> = HashSet::new();

        loop {
            let Some(reservation) = game.reservations.get(&train.idx).cloned() else {
                return (train.line_idx, train.position, 0);
            };
            if reservation.route.len() < 2 {
                return (train.line_idx, train.position, 0);
            }

            let (p0, p1) = (reservation.route[0], reservation.route[1]);
            let Some(next_line_idx) = game.line_between(p0, p1) else {
                return (train.line_idx, train.position, 0);
            };
            let next_line: Line = game.line(next_line_idx).expect("line_between returned a known line").clone();
            let direction = next_line.direction_from(p0);
            let base_position = if next_line_idx == train.line_idx {
                train.position
            } else {
                next_line.position_of(p0)
            };
            let next_position = clamp_step(base_position, direction, next_line.length);

            if !conflicts(game, next_line_idx, next_position, occupancy) {
                return (next_line_idx, next_position, direction);
            }

            if !exclude_lines.insert(next_line_idx) {
                // Already tried excluding this line once; no further alternative to try.
                return (train.line_idx, train.position, 0);
            }

            match self.planner.plan(game, train, &exclude_lines) {
                Ok(new_reservation) => {
                    game.reservations.insert(train.idx, new_reservation);
                }
                Err(_) => return (train.line_idx, train.position, 0),
            }
        }
    }

    /// Upgrade policy (§4.6): trains sitting at TOWN this tick get first call on half the town's
    /// armor, greedily by train id; if none are there, the town itself may upgrade instead.
    fn plan_upgrades(&self, game: &Game, occupancy: &Occupancy) -> (Vec<PointId>, Vec<TrainId>) {
        let Some(town) = game.own_town_post() else {
            return (Vec::new(), Vec::new());
        };
        let mut budget = (town.armor as f64 * 0.5).floor() as u32;

        let mut trains_at_town: Vec<&Train> = game
            .own_trains()
            .filter(|t| {
                occupancy
                    .positions
                    .get(&t.idx)
                    .map(|&(line_idx, position)| {
                        game.line(line_idx)
                            .map(|line| position_is_point(line, position, game.own_town))
                            .unwrap_or(false)
                    })
                    .unwrap_or(false)
            })
            .collect();
        trains_at_town.sort_by_key(|t| t.idx);

        let mut upgrade_trains = Vec::new();
        for train in &trains_at_town {
            if let Some(price) = train.next_level_price {
                if price <= budget {
                    upgrade_trains.push(train.idx);
                    budget -= price;
                }
            }
        }

        let mut upgrade_posts = Vec::new();
        if trains_at_town.is_empty() {
            if let Some(price) = town.next_level_price {
                if price <= budget {
                    upgrade_posts.push(game.own_town);
                }
            }
        }

        (upgrade_posts, upgrade_trains)
    }
}

fn clamp_step(position: u32, speed: i8, line_length: u32) -> u32 {
    (position as i64 + speed as i64).clamp(0, line_length as i64) as u32
}

fn position_is_point(line: &Line, position: u32, point: PointId) -> bool {
    (position == 0 && line.start() == point) || (position == line.length && line.end() == point)
}

/// A proposed (line, position) conflicts with another train's projected position (§4.6): either
/// it lands on an already-occupied in-line position (TOWN's own endpoint excepted, so trains can
/// queue there), or it lands on a point another train already occupies.
fn conflicts(game: &Game, line_idx: LineId, position: u32, occupancy: &Occupancy) -> bool {
    let occupied_lines = occupancy.occupied_lines();
    if occupied_lines.get(&line_idx).map(|set| set.contains(&position)).unwrap_or(false) {
        let at_town_endpoint = game
            .line(line_idx)
            .map(|line| position_is_point(line, position, game.own_town))
            .unwrap_or(false);
        if !at_town_endpoint {
            return true;
        }
    }

    if let Some(line) = game.line(line_idx) {
        if position == 0 || position == line.length {
            let point = if position == 0 { line.start() } else { line.end() };
            if occupancy.occupied_points(&game.lines).contains(&point) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::game::wire::{LineDto, StaticMap};
    use common::game::{GoodsType, PlayerId};
    use std::collections::HashMap as Map;

    fn two_line_game() -> Game {
        // TOWN(0) -- L0(len5) -- P(1) -- L1(len5) -- P(2)
        let static_map = StaticMap {
            idx: 1,
            name: "s".into(),
            points: vec![],
            lines: vec![
                LineDto { idx: LineId(0), length: 5, points: [PointId(0), PointId(1)] },
                LineDto { idx: LineId(1), length: 5, points: [PointId(1), PointId(2)] },
            ],
        };
        Game::new(PlayerId(1), PointId(0), static_map)
    }

    fn train(idx: i64, line: LineId, position: u32, speed: i8) -> Train {
        Train {
            idx: TrainId(idx),
            owner: PlayerId(1),
            line_idx: line,
            position,
            speed,
            goods: 0,
            goods_capacity: 40,
            goods_type: GoodsType::Empty,
            cooldown: 0,
            next_level_price: None,
        }
    }

    #[test]
    fn mid_line_conflict_is_detected_at_the_projected_position() {
        let mut game = two_line_game();
        let a = train(1, LineId(0), 3, 1);
        let b = train(2, LineId(0), 4, 0);
        game.trains.insert(a.idx, a.clone());
        game.trains.insert(b.idx, b.clone());

        let mut occupancy = Occupancy::default();
        occupancy.set(b.idx, LineId(0), 4);

        // Mirrors spec scenario 4: A's projected (L, 4) collides with B, which already holds it.
        assert!(conflicts(&game, LineId(0), 4, &occupancy));
        assert!(!conflicts(&game, LineId(0), 3, &occupancy));
    }

    #[test]
    fn mid_line_conflict_stops_the_train_in_place() {
        let mut game = two_line_game();
        let a = train(1, LineId(0), 3, 1);
        let b = train(2, LineId(0), 4, 0);
        game.trains.insert(a.idx, a.clone());
        game.trains.insert(b.idx, b.clone());

        let mut occupancy = Occupancy::default();
        occupancy.set(b.idx, LineId(0), 4);

        let (client, bridge) = test_fixtures();
        let mut executor = Executor::new(client, Planner::new(), bridge);
        let (next_line, next_position, next_speed) = executor.decide_move(&mut game, a.idx, &occupancy);

        assert_eq!(next_line, LineId(0));
        assert_eq!(next_position, 3);
        assert_eq!(next_speed, 0);
    }

    #[test]
    fn upgrade_budget_is_never_exceeded() {
        let mut game = two_line_game();
        let town = common::game::post::Town {
            point_idx: PointId(0),
            owner: PlayerId(1),
            population: 1,
            population_capacity: 10,
            product: 0,
            product_capacity: 10,
            armor: 100,
            armor_capacity: 200,
            next_level_price: None,
            events: Vec::new(),
        };
        let mut posts = Map::new();
        posts.insert(PointId(0), common::game::Post::Town(town));
        game.posts = posts;

        let mut t1 = train(1, LineId(0), 0, 0);
        t1.next_level_price = Some(30);
        let mut t2 = train(2, LineId(0), 0, 0);
        t2.next_level_price = Some(25);
        game.trains.insert(t1.idx, t1.clone());
        game.trains.insert(t2.idx, t2.clone());

        let mut occupancy = Occupancy::default();
        occupancy.set(t1.idx, LineId(0), 0);
        occupancy.set(t2.idx, LineId(0), 0);

        let (client, bridge) = test_fixtures();
        let executor = Executor::new(client, Planner::new(), bridge);
        let (upgrade_posts, upgrade_trains) = executor.plan_upgrades(&game, &occupancy);
        assert!(upgrade_posts.is_empty());
        assert_eq!(upgrade_trains, vec![t1.idx]);
    }

    fn test_fixtures() -> (Client, BridgeSender) {
        let client = Client::new(common::conf::Config::default());
        let (tx, _rx) = common::bridge::channel(8);
        (client, tx)
    }
}
