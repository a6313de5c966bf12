pub mod breaker;
pub mod config;

pub use breaker::*;
pub use config::*;
