use config::{Config, ConfigError, Environment, File};
use infrastructure::{MonitoringConfig, MqttConfig};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub monitoring: MonitoringConfig,
    pub mqtt: MqttConfig,
    pub homeassistant: crate::adapter::homeassistant::HomeAssistant,
    pub climate: ClimateSettings,
    pub frontend: crate::frontend::Frontend,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config.toml"))
            .add_source(Environment::default().separator("_").list_separator(","));

        let s = builder.build()?;
        s.try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[allow(unused)]
pub struct ClimateSettings {
    pub name: String,
    pub entity_id: String,
    //accepted for compatibility with the old platform config, not evaluated
    pub hide_parent: Option<bool>,
}
