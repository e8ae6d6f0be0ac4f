use infrastructure::MqttOutMessage;
use tokio::sync::{mpsc, watch};

use crate::climate::ClimateDescriptor;
use crate::home::PilotWireMode;

use super::{object_id, registration_topic, state_topic};

pub(super) async fn export_state(
    base_topic: String,
    descriptor: ClimateDescriptor,
    tx: mpsc::Sender<MqttOutMessage>,
    mut mode_rx: watch::Receiver<PilotWireMode>,
) {
    if let Err(e) = register_entity(&base_topic, &descriptor, &tx).await {
        tracing::error!("Error announcing climate entity {}: {:?}", descriptor.name, e);
    }

    let topic = state_topic(&base_topic, &object_id(&descriptor.name));
    let mut last_sent: Option<&'static str> = None;

    loop {
        let label = mode_rx.borrow_and_update().label();

        if last_sent != Some(label) {
            let msg = MqttOutMessage::retained(topic.clone(), label);
            if let Err(e) = tx.send(msg).await {
                tracing::error!("Error publishing mode of {}: {}", descriptor.name, e);
            }
            last_sent = Some(label);
        }

        if mode_rx.changed().await.is_err() {
            break;
        }
    }
}

async fn register_entity(
    base_topic: &str,
    descriptor: &ClimateDescriptor,
    tx: &mpsc::Sender<MqttOutMessage>,
) -> anyhow::Result<()> {
    let payload = serde_json::to_string(descriptor)?;
    let msg = MqttOutMessage::retained(registration_topic(base_topic), payload);

    tx.send(msg).await?;
    Ok(())
}
