use crate::config::BridgeConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads bridge configuration by merging TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<BridgeConfig> {
        let config: BridgeConfig = Figment::new()
            .merge(Toml::file("config/Bridge.toml"))
            .merge(Env::prefixed("BRIDGE_").split("__"))
            .join(Json::file("config/Bridge.json"))
            .extract()?;

        Ok(config)
    }

    /// Loads bridge configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(profile: &str) -> Result<BridgeConfig> {
        let config: BridgeConfig = Figment::new()
            .merge(Toml::file("config/Bridge.toml"))
            .merge(Toml::file(format!("config/Bridge.{profile}.toml")))
            .merge(Env::prefixed("BRIDGE_").split("__"))
            .join(Json::file("config/Bridge.json"))
            .extract()?;

        Ok(config)
    }
}
