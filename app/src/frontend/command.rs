use infrastructure::MqttInMessage;
use tokio::sync::mpsc;

use crate::climate::ClimateClient;

pub(super) async fn process_commands(mut rx: mpsc::Receiver<MqttInMessage>, client: ClimateClient) {
    while let Some(msg) = rx.recv().await {
        let label = msg.payload.trim();

        tracing::info!("Received operation mode selection on {}: {}", msg.topic, label);

        //unknown labels are rejected and reported by the runner
        if let Err(e) = client.set_operation_mode(label).await {
            tracing::error!("Error forwarding operation mode selection: {:?}", e);
        }
    }
}
