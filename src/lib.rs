pub mod cli;
pub mod config;
pub mod error;
pub mod camera;
pub mod store;
pub mod detector;
pub mod monitor;
pub mod render;
