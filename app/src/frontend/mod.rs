mod command;
mod state;

use infrastructure::{Mqtt, MqttOutMessage};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};

use crate::climate::{ClimateClient, ClimateDescriptor};
use crate::home::PilotWireMode;

/// MQTT surface of the climate entity towards the frontend bridge: a
/// registration payload, a retained state topic and a set topic.
#[derive(Debug, Deserialize, Clone)]
pub struct Frontend {
    pub base_topic: String,
}

impl Frontend {
    pub fn export_state(
        &self,
        descriptor: ClimateDescriptor,
        tx: mpsc::Sender<MqttOutMessage>,
        mode_rx: watch::Receiver<PilotWireMode>,
    ) -> impl Future<Output = ()> + use<> {
        let base_topic = self.base_topic.clone();
        async move { state::export_state(base_topic, descriptor, tx, mode_rx).await }
    }

    pub async fn process_commands(
        &self,
        mqtt: &mut Mqtt,
        descriptor: &ClimateDescriptor,
        client: ClimateClient,
    ) -> anyhow::Result<impl Future<Output = ()> + use<>> {
        let topic = command_topic(&self.base_topic, &object_id(&descriptor.name));
        let rx = mqtt.subscribe(topic).await?;

        Ok(async move { command::process_commands(rx, client).await })
    }
}

fn object_id(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn registration_topic(base_topic: &str) -> String {
    format!("{}/add", base_topic)
}

fn state_topic(base_topic: &str, object_id: &str) -> String {
    format!("{}/{}/mode", base_topic, object_id)
}

fn command_topic(base_topic: &str, object_id: &str) -> String {
    format!("{}/{}/mode/set", base_topic, object_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_is_topic_safe() {
        assert_eq!(object_id("Chauffage Salon"), "chauffage_salon");
        assert_eq!(object_id("Chambre n°2"), "chambre_n_2");
    }

    #[test]
    fn topics_are_derived_from_base_and_object_id() {
        assert_eq!(registration_topic("climate"), "climate/add");
        assert_eq!(state_topic("climate", "chauffage_salon"), "climate/chauffage_salon/mode");
        assert_eq!(
            command_topic("climate", "chauffage_salon"),
            "climate/chauffage_salon/mode/set"
        );
    }
}
