//! A standardized `clap` command line, built with the builder API (not derive) to match the
//! rest of this codebase's style. [`app`] produces the argument set; [`config_from_matches`]
//! folds the matches into a [`Config`] overlay (§4.8).

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgMatches, Command};

use crate::conf::{Config, APP_NAME, APP_SUBTITLE, APP_VERSION};

/// The standard command line for the bot binary.
pub fn app() -> Command {
    Command::new(APP_NAME)
        .version(APP_VERSION)
        .about(APP_SUBTITLE)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON config file; overridden by any flag given explicitly")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(Arg::new("host").long("host").help("Game server host"))
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Game server port")
                .value_parser(value_parser!(u16)),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Per-call timeout in seconds; omit for unlimited")
                .value_parser(value_parser!(u64)),
        )
        .arg(Arg::new("username").short('u').long("username").help("Login name"))
        .arg(Arg::new("password").long("password").help("Login password"))
        .arg(Arg::new("game").short('g').long("game").help("Game name to join or create"))
        .arg(
            Arg::new("num_players")
                .long("num-players")
                .help("Number of players required to start the game")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("num_turns")
                .long("num-turns")
                .help("Number of turns in the game")
                .value_parser(value_parser!(u32)),
        )
}

/// Builds a `Config` purely from the flags present on the command line (not yet overlaid on a
/// config file).
fn config_from_flags(matches: &ArgMatches) -> Config {
    Config {
        host: matches.get_one::<String>("host").cloned(),
        port: matches.get_one::<u16>("port").copied(),
        timeout: matches.get_one::<u64>("timeout").copied(),
        username: matches.get_one::<String>("username").cloned(),
        password: matches.get_one::<String>("password").cloned(),
        game: matches.get_one::<String>("game").cloned(),
        num_players: matches.get_one::<u32>("num_players").copied(),
        num_turns: matches.get_one::<u32>("num_turns").copied(),
    }
}

/// Resolves the effective `Config`: the config file named by `--config`, if any, overlaid by
/// whatever flags were actually given.
pub fn config_from_matches(matches: &ArgMatches) -> Result<Config, crate::conf::ConfigError> {
    let base = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    Ok(base.overlay(config_from_flags(matches)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_override_an_empty_base_config() {
        let matches = app()
            .try_get_matches_from(["trainbot", "--host", "example.com", "--port", "1234", "--username", "bob"])
            .unwrap();
        let config = config_from_matches(&matches).unwrap();
        assert_eq!(config.host.as_deref(), Some("example.com"));
        assert_eq!(config.port, Some(1234));
        assert_eq!(config.username.as_deref(), Some("bob"));
        assert_eq!(config.timeout, None);
    }
}
