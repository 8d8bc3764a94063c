mod config;
mod defaults;
mod tests;

pub use config::{Config, ConfigLoader};
