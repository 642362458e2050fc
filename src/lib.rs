pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod host;
pub mod logging;
pub mod platform;
pub mod ui;
