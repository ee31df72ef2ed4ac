//! Core translation engine module

pub mod client;
pub mod config;
pub mod error_log;
pub mod errors;
pub mod models;
