//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CompatConfig, ConfigError, Environment, InstanceConfig, LogFormat,
};
