//! Core library for ccmon: ccusage report parsing, session and cost state,
//! network health tracking and the polling loop that ties them together.

pub mod config;
pub mod health;
pub mod monitor;
pub mod notify;
pub mod usage;
