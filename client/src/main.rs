//! `trainbot`: an autonomous client for the train-empire game server.
//!
//! Wires the ambient stack (config, CLI, logging) from `common` to this binary's own
//! `Planner`/`Executor` pair: connect, log in, fetch the static map, then hand control to the
//! Executor's tick loop until it returns.

#![forbid(unsafe_code)]

use std::process::ExitCode;

use log::{error, info};

use common::{
    bridge::{self, BridgeEvent},
    cli,
    client::Client,
    conf::{self, Config},
    game::Game,
};

mod error;
mod executor;
mod planner;

use error::BotError;
use executor::{Executor, StopSignal};
use planner::Planner;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let matches = cli::app().get_matches();
    let config = match cli::config_from_matches(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            return exit_code(conf::EXIT_PROTOCOL_ERROR);
        }
    };

    if let Err(e) = config.validate() {
        error!("configuration error: {e}");
        return exit_code(conf::EXIT_PROTOCOL_ERROR);
    }

    match run(config).await {
        Ok(()) => exit_code(conf::EXIT_OK),
        Err(e) => {
            error!("{e}");
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}

async fn run(config: Config) -> Result<(), BotError> {
    // The Bridge's consumer is the (out-of-scope) visualizer; a trainbot-only run still needs a
    // receiver to exist so `send` never blocks on a full, unconsumed queue.
    let (bridge_tx, _bridge_rx) = bridge::channel(64);

    let mut client = Client::new(config);
    client.connect().await?;

    let login = client.login().await?;
    info!("logged in as '{}' (player {}, rating {})", login.name, login.idx, login.rating);
    bridge_tx.send(BridgeEvent::PlayerId(login.idx)).await;

    let static_map = client.map_static().await?;
    if let Ok(value) = serde_json::to_value(&static_map) {
        bridge_tx.send(BridgeEvent::MapStatic(value)).await;
    }

    let mut game = Game::new(login.idx, login.town.idx, static_map);
    let dynamic = client.map_dynamic().await?;
    game.merge_dynamic(dynamic);

    let stop = StopSignal::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received interrupt, stopping after the current tick");
                stop.stop();
            }
        });
    }

    let mut executor = Executor::new(client, Planner::new(), bridge_tx);
    executor.run(&mut game, &stop).await?;

    Ok(())
}
