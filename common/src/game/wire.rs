//! Raw JSON request/response bodies for the MAP, LOGIN, PLAYER, and GAMES actions.
//!
//! These mirror the wire shapes in §6 of the spec field-for-field; [`super::state::Game`] is the
//! merged, query-friendly domain model built from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    ids::{LineId, PlayerId, PointId, TrainId},
    post::PostDto,
    train::Train,
};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_players: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_turns: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TownRef {
    pub idx: PointId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub idx: PlayerId,
    pub name: String,
    pub rating: f64,
    pub town: TownRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveRequest {
    pub line_idx: LineId,
    pub speed: i8,
    pub train_idx: TrainId,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpgradeRequest {
    pub posts: Vec<PointId>,
    pub trains: Vec<TrainId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapRequest {
    pub layer: u8,
}

pub const MAP_LAYER_STATIC: u8 = 0;
pub const MAP_LAYER_DYNAMIC: u8 = 1;
pub const MAP_LAYER_COORDINATES: u8 = 10;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointDto {
    pub idx: PointId,
    #[serde(default)]
    pub post_idx: Option<PointId>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineDto {
    pub idx: LineId,
    pub length: u32,
    pub points: [PointId; 2],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticMap {
    pub idx: i64,
    pub name: String,
    pub points: Vec<PointDto>,
    pub lines: Vec<LineDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rating {
    pub name: String,
    pub rating: f64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DynamicMap {
    pub idx: i64,
    #[serde(default)]
    pub ratings: HashMap<PlayerId, Rating>,
    pub posts: Vec<PostDto>,
    pub trains: Vec<Train>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PointCoordinate {
    pub idx: PointId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoordinateMap {
    pub idx: i64,
    pub coordinates: Vec<PointCoordinate>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerRecord {
    pub idx: PlayerId,
    pub name: String,
    pub rating: f64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameSummary {
    pub idx: i64,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GamesResponse {
    pub games: Vec<GameSummary>,
}
