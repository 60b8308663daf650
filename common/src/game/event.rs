use serde::{Deserialize, Serialize};

/// Event type 100, per the wire protocol.
pub const EVENT_TYPE_GAME_OVER: i64 = 100;
/// Event type 4, per the wire protocol.
pub const EVENT_TYPE_REFUGEE: i64 = 4;

/// A server-emitted notice attached to a TOWN post.
///
/// The wire format is a loosely-typed bag (`{type, tick, ...}`) whose extra fields depend on
/// `type`; refugee events additionally carry `refugees_number`. Rather than modeling every event
/// type as its own variant up front, the raw `type` tag and the one field we act on are kept
/// directly and the rest is ignored -- new event types show up as `Event::kind` values we simply
/// don't branch on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: i64,
    pub tick: u64,
    #[serde(default)]
    pub refugees_number: Option<u32>,
}

impl Event {
    pub fn is_game_over(&self) -> bool {
        self.kind == EVENT_TYPE_GAME_OVER
    }

    pub fn is_refugee(&self) -> bool {
        self.kind == EVENT_TYPE_REFUGEE
    }
}
