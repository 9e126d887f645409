pub mod audit;
pub mod cli;
pub mod config;
pub mod core;
pub mod exit;
pub mod strip;
pub mod summary;
pub mod ui;
pub mod vcs;
