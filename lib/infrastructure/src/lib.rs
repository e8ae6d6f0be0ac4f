mod monitoring;
mod mqtt;

pub use monitoring::MonitoringConfig;
pub use mqtt::{Mqtt, MqttConfig, MqttInMessage, MqttOutMessage};
