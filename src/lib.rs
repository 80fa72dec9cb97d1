pub mod cli;
pub mod combat;
pub mod config;
pub mod data;
pub mod game;
pub mod logging;
pub mod optimizer;
pub mod parallel;
pub mod server;
