use super::{goods::GoodsType, ids::PointId};

/// A planner's intention record for one own train.
///
/// `trip_remaining` decrements once per tick while the owning train's speed is nonzero; the
/// reservation is cleared once the train returns to TOWN with `route` exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodsReservation {
    pub goods_type: GoodsType,
    pub expected_amount: u32,
    pub trip_remaining: u32,
    pub route: Vec<PointId>,
}

impl GoodsReservation {
    /// The final point of the planned route, if any -- the target the train is currently headed
    /// toward (a matching post, or TOWN to unload/consume).
    pub fn target(&self) -> Option<PointId> {
        self.route.last().copied()
    }

    pub fn tick(&mut self, train_moved: bool) {
        if train_moved && self.trip_remaining > 0 {
            self.trip_remaining -= 1;
        }
    }
}
