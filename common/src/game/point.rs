use serde::{Deserialize, Serialize};

use super::ids::PointId;

/// A node in the map graph. `post_idx` is set when a post sits on this point; per the wire
/// protocol the post is addressed by this same id (see [`super::ids::PostId`]).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Point {
    pub idx: PointId,
    #[serde(default)]
    pub post_idx: Option<PointId>,
}

impl Point {
    pub fn has_post(&self) -> bool {
        self.post_idx.is_some()
    }
}
