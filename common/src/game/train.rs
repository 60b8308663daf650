use serde::{Deserialize, Serialize};

use super::{
    goods::GoodsType,
    ids::{LineId, PlayerId, TrainId},
};

/// A mobile agent on a single line at any instant.
///
/// Invariants (§3 of the spec): if `speed == 1` the position next tick is `position + 1`
/// (bounded by the line length); `speed == -1` is symmetric; a train strictly between a line's
/// endpoints has nonzero speed absent a collision-induced stop; `cooldown` decrements by one each
/// tick.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Train {
    pub idx: TrainId,
    pub owner: PlayerId,
    pub line_idx: LineId,
    pub position: u32,
    pub speed: i8,
    pub goods: u32,
    pub goods_capacity: u32,
    pub goods_type: GoodsType,
    #[serde(default)]
    pub cooldown: u32,
    #[serde(default)]
    pub next_level_price: Option<u32>,
}

impl Train {
    pub fn is_full(&self) -> bool {
        self.goods >= self.goods_capacity
    }

    pub fn is_empty(&self) -> bool {
        self.goods == 0
    }

    pub fn free_space(&self) -> u32 {
        self.goods_capacity.saturating_sub(self.goods)
    }

    /// A train is at a decision point when it sits on a line endpoint or has stopped.
    pub fn at_decision_point(&self, line_length: u32) -> bool {
        self.speed == 0 || self.position == 0 || self.position == line_length
    }
}
