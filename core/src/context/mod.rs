mod config;
mod error;

pub use config::{
    AppConfig, AppConfigExt, AudioSettings, EngineSettings, OverlapPolicy, ResumePolicy,
};
pub use error::ConfigError;
