extern crate serde;

pub static API_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod events;
pub mod packet;
pub mod stats;
pub mod utils;
