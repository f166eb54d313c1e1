pub mod config;

pub use config::{Config, ConfigError, ConfigLoader, Value};
