pub mod paths;
pub mod service;

pub use paths::ConfigPaths;
pub use service::{DetectionConfig, ParaphraseConfig, ServiceConfig};
