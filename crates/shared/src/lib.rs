pub mod config;
pub mod network;
pub mod style;

pub use anstyle;
