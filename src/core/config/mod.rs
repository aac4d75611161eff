pub mod data;
pub mod io;
pub mod settings;

pub use data::{Config, Environment, FeatureSettings, UiSettings, WebhookSettings};
pub use io::ConfigError;

#[cfg(test)]
mod tests;
