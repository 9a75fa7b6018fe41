pub mod config;
pub mod error;
pub mod firework;
pub mod palette;
pub mod particle;
pub mod show;
pub mod surface;
pub mod terminal;
