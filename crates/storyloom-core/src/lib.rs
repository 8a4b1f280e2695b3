//! Storyloom Core — error taxonomy and process configuration.

pub mod config;
pub mod error;

pub use config::StoryloomConfig;
pub use error::{Error, Result};
