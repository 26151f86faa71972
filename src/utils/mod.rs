/// TOML configuration and hot-reloading manager.
pub mod toml_config;
