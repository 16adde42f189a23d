//! CLI module graph.

pub mod bet;
pub mod command;
pub mod config;
pub mod diagnostic;
pub mod market;
pub mod odds;
pub mod output;
pub mod reserve;
pub mod run;
pub mod settle;
pub mod status;
