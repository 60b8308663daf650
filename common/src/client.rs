//! Typed commands over the wire codec (§4.3): one method per action code, returning a typed
//! response or a [`ClientError`].

use log::{debug, info};

use crate::{
    codec::{Action, Status},
    conf::Config,
    error::ClientError,
    game::wire::{
        CoordinateMap, DynamicMap, GamesResponse, LoginRequest, LoginResponse, MapRequest,
        MoveRequest, PlayerRecord, StaticMap, UpgradeRequest, MAP_LAYER_COORDINATES,
        MAP_LAYER_DYNAMIC, MAP_LAYER_STATIC,
    },
    game::{LineId, PointId, TrainId},
    transport::{Timeout, Transport},
};

pub struct Client {
    transport: Transport,
    config: Config,
}

impl Client {
    pub fn new(config: Config) -> Self {
        let timeout = match config.timeout {
            Some(secs) => Timeout::Seconds(secs),
            None => Timeout::Unlimited,
        };
        Self { transport: Transport::new(timeout), config }
    }

    pub async fn connect(&mut self) -> Result<(), ClientError> {
        let host = self.config.host.as_ref().ok_or(ClientError::HostMissing)?;
        let port = self.config.port.ok_or(ClientError::PortMissing)?;
        info!("connecting to {host}:{port}");
        self.transport.connect(host, port).await?;
        Ok(())
    }

    async fn request<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &mut self,
        action: Action,
        body: Option<&Req>,
    ) -> Result<Resp, ClientError> {
        let bytes = match body {
            Some(body) => serde_json::to_vec(body)?,
            None => Vec::new(),
        };
        let (status, response_body) = self.transport.call(action, &bytes).await?;
        self.check_status(status, &response_body)?;
        if response_body.is_empty() {
            // Empty-bodied responses (LOGOUT, MOVE, UPGRADE, TURN) are only ever requested with
            // Resp = (); serde_json happily decodes `null` into it.
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&response_body)?)
    }

    fn check_status(&self, status: Status, body: &[u8]) -> Result<(), ClientError> {
        if status.is_ok() {
            return Ok(());
        }
        let message = if body.is_empty() {
            String::new()
        } else {
            serde_json::from_slice::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
                .unwrap_or_default()
        };
        Err(ClientError::BadServerResponse { status, message })
    }

    pub async fn login(&mut self) -> Result<LoginResponse, ClientError> {
        let name = self.config.username.clone().ok_or(ClientError::UsernameMissing)?;
        let body = LoginRequest {
            name,
            password: self.config.password.clone(),
            game: self.config.game.clone(),
            num_players: self.config.num_players,
            num_turns: self.config.num_turns,
        };
        self.request(Action::Login, Some(&body)).await
    }

    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result: Result<(), ClientError> = self.request::<(), ()>(Action::Logout, None).await;
        self.transport.close();
        debug!("connection closed after logout");
        result
    }

    pub async fn move_train(
        &mut self,
        line_idx: LineId,
        speed: i8,
        train_idx: TrainId,
    ) -> Result<(), ClientError> {
        let body = MoveRequest { line_idx, speed, train_idx };
        self.request(Action::Move, Some(&body)).await
    }

    pub async fn upgrade(
        &mut self,
        posts: Vec<PointId>,
        trains: Vec<TrainId>,
    ) -> Result<(), ClientError> {
        let body = UpgradeRequest { posts, trains };
        self.request(Action::Upgrade, Some(&body)).await
    }

    pub async fn turn(&mut self) -> Result<(), ClientError> {
        self.request::<(), ()>(Action::Turn, None).await
    }

    pub async fn player(&mut self) -> Result<PlayerRecord, ClientError> {
        self.request::<(), PlayerRecord>(Action::Player, None).await
    }

    pub async fn games(&mut self) -> Result<GamesResponse, ClientError> {
        self.request::<(), GamesResponse>(Action::Games, None).await
    }

    pub async fn map_static(&mut self) -> Result<StaticMap, ClientError> {
        let body = MapRequest { layer: MAP_LAYER_STATIC };
        self.request(Action::Map, Some(&body)).await
    }

    pub async fn map_dynamic(&mut self) -> Result<DynamicMap, ClientError> {
        let body = MapRequest { layer: MAP_LAYER_DYNAMIC };
        self.request(Action::Map, Some(&body)).await
    }

    pub async fn map_coordinates(&mut self) -> Result<CoordinateMap, ClientError> {
        let body = MapRequest { layer: MAP_LAYER_COORDINATES };
        self.request(Action::Map, Some(&body)).await
    }
}
