use serde::{Deserialize, Serialize};

/// The kind of cargo a train is carrying (or a post trades in), per the wire protocol's numeric
/// codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum GoodsType {
    Empty,
    Product,
    Armor,
}

impl GoodsType {
    pub fn code(self) -> i64 {
        match self {
            Self::Empty => 0,
            Self::Product => 2,
            Self::Armor => 3,
        }
    }
}

impl TryFrom<i64> for GoodsType {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Empty),
            2 => Ok(Self::Product),
            3 => Ok(Self::Armor),
            other => Err(format!("unrecognized goods type code {other}")),
        }
    }
}

impl From<GoodsType> for i64 {
    fn from(g: GoodsType) -> Self {
        g.code()
    }
}
