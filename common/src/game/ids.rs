//! Identifier newtypes for the entities that make up a game.
//!
//! These are thin wrappers around `i64` rather than bare integers so that, e.g., a `PointId`
//! can never be passed where a `TrainId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self(v)
            }
        }

        impl From<$name> for i64 {
            fn from(v: $name) -> Self {
                v.0
            }
        }
    };
}

id_type!(PointId);
id_type!(LineId);
id_type!(TrainId);
id_type!(PlayerId);

/// Posts have no identifier of their own on the wire; they are addressed by the id of the point
/// they sit on (`Post.point_idx` in the spec). This alias documents that choice at call sites.
pub type PostId = PointId;
