use serde::{Deserialize, Serialize};

use super::{event::Event, ids::PointId, PlayerId};

/// The raw wire representation of a post: a dict keyed by `type` whose remaining fields depend
/// on which variant it is. `PostDto` captures that shape directly; [`Post`] is the tagged-variant
/// domain type derived from it (§9: "dynamic attribute bags become tagged variants").
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostDto {
    pub point_idx: PointId,
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub owner: Option<PlayerId>,
    #[serde(default)]
    pub population: Option<u32>,
    #[serde(default)]
    pub population_capacity: Option<u32>,
    #[serde(default)]
    pub product: Option<u32>,
    #[serde(default)]
    pub product_capacity: Option<u32>,
    #[serde(default)]
    pub armor: Option<u32>,
    #[serde(default)]
    pub armor_capacity: Option<u32>,
    #[serde(default)]
    pub next_level_price: Option<u32>,
    #[serde(default)]
    pub replenishment: Option<u32>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PostDecodeError {
    #[error("post at point {point_idx} has unrecognized type {kind}")]
    UnrecognizedType { point_idx: PointId, kind: u8 },
    #[error("post at point {point_idx} is missing required field `{field}`")]
    MissingField {
        point_idx: PointId,
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Town {
    pub point_idx: PointId,
    pub owner: PlayerId,
    pub population: u32,
    pub population_capacity: u32,
    pub product: u32,
    pub product_capacity: u32,
    pub armor: u32,
    pub armor_capacity: u32,
    pub next_level_price: Option<u32>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Market {
    pub point_idx: PointId,
    pub product: u32,
    pub product_capacity: u32,
    pub replenishment: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    pub point_idx: PointId,
    pub armor: u32,
    pub armor_capacity: u32,
    pub replenishment: u32,
}

/// A functional overlay on a point. At most one TOWN post is ever ours -- see
/// [`super::state::Game::own_town`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Post {
    Town(Town),
    Market(Market),
    Storage(Storage),
}

impl Post {
    pub fn point_idx(&self) -> PointId {
        match self {
            Post::Town(t) => t.point_idx,
            Post::Market(m) => m.point_idx,
            Post::Storage(s) => s.point_idx,
        }
    }

    pub fn goods_type(&self) -> Option<super::goods::GoodsType> {
        match self {
            Post::Town(_) => None,
            Post::Market(_) => Some(super::goods::GoodsType::Product),
            Post::Storage(_) => Some(super::goods::GoodsType::Armor),
        }
    }

    pub fn as_town(&self) -> Option<&Town> {
        match self {
            Post::Town(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_market(&self) -> Option<&Market> {
        match self {
            Post::Market(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_storage(&self) -> Option<&Storage> {
        match self {
            Post::Storage(s) => Some(s),
            _ => None,
        }
    }
}

fn required<T>(
    point_idx: PointId,
    field: &'static str,
    value: Option<T>,
) -> Result<T, PostDecodeError> {
    value.ok_or(PostDecodeError::MissingField { point_idx, field })
}

impl TryFrom<PostDto> for Post {
    type Error = PostDecodeError;

    fn try_from(dto: PostDto) -> Result<Self, Self::Error> {
        match dto.kind {
            1 => Ok(Post::Town(Town {
                point_idx: dto.point_idx,
                owner: required(dto.point_idx, "owner", dto.owner)?,
                population: required(dto.point_idx, "population", dto.population)?,
                population_capacity: required(
                    dto.point_idx,
                    "population_capacity",
                    dto.population_capacity,
                )?,
                product: required(dto.point_idx, "product", dto.product)?,
                product_capacity: required(dto.point_idx, "product_capacity", dto.product_capacity)?,
                armor: required(dto.point_idx, "armor", dto.armor)?,
                armor_capacity: required(dto.point_idx, "armor_capacity", dto.armor_capacity)?,
                next_level_price: dto.next_level_price,
                events: dto.events,
            })),
            2 => Ok(Post::Market(Market {
                point_idx: dto.point_idx,
                product: required(dto.point_idx, "product", dto.product)?,
                product_capacity: required(dto.point_idx, "product_capacity", dto.product_capacity)?,
                replenishment: required(dto.point_idx, "replenishment", dto.replenishment)?,
            })),
            3 => Ok(Post::Storage(Storage {
                point_idx: dto.point_idx,
                armor: required(dto.point_idx, "armor", dto.armor)?,
                armor_capacity: required(dto.point_idx, "armor_capacity", dto.armor_capacity)?,
                replenishment: required(dto.point_idx, "replenishment", dto.replenishment)?,
            })),
            kind => Err(PostDecodeError::UnrecognizedType {
                point_idx: dto.point_idx,
                kind,
            }),
        }
    }
}
