pub mod benchmark;
pub mod bots;
pub mod config;
pub mod frame;
pub mod game;
pub mod policy;
pub mod runner;
pub mod util;
