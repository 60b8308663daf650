#![forbid(unsafe_code)]

pub mod bridge;
pub mod cli;
pub mod client;
pub mod codec;
pub mod conf;
pub mod error;
pub mod game;
pub mod transport;
