mod client;
mod event;
mod light;

pub use client::HaHttpClient;
pub use event::{StateChangedEvent, StateValue};
pub use light::HaLightExecutor;

use infrastructure::{Mqtt, MqttInMessage};
use serde::Deserialize;
use tokio::sync::mpsc;

#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistant {
    pub topic_event: String,
    pub url: String,
    pub token: String,
}

impl HomeAssistant {
    pub fn new_http_client(&self) -> anyhow::Result<HaHttpClient> {
        HaHttpClient::new(&self.url, &self.token)
    }

    pub fn new_light_executor(&self) -> anyhow::Result<HaLightExecutor> {
        Ok(HaLightExecutor::new(self.new_http_client()?))
    }

    pub async fn new_event_subscription(&self, mqtt: &mut Mqtt) -> anyhow::Result<mpsc::Receiver<MqttInMessage>> {
        mqtt.subscribe(self.topic_event.clone()).await
    }
}
