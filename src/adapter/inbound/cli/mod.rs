//! CLI module graph.

pub mod command;
pub mod dispatch;
pub mod market;
pub mod odds;
pub mod output;
pub mod position;
