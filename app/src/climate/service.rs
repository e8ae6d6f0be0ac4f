use infrastructure::MqttInMessage;
use tokio::sync::{mpsc, watch};

use crate::adapter::homeassistant::StateChangedEvent;
use crate::climate::{ClimateDescriptor, PilotWireClimate, UnknownModeError};
use crate::home::PilotWireMode;
use crate::port::LightCommandExecutor;

#[derive(Debug, Clone)]
enum ClimateMessage {
    SetOperationMode(String),
}

/// Handle for user-driven mode selections, served by the runner task.
#[derive(Clone)]
pub struct ClimateClient {
    tx: mpsc::Sender<ClimateMessage>,
}

impl ClimateClient {
    pub async fn set_operation_mode(&self, label: &str) -> anyhow::Result<()> {
        self.tx
            .send(ClimateMessage::SetOperationMode(label.to_string()))
            .await
            .map_err(|e| anyhow::anyhow!("Climate runner not accepting commands: {}", e))
    }
}

/// Owns the climate entity and serializes all access to it: dimmer events
/// and mode selections are delivered through channels and processed one at a
/// time, so the entity itself needs no locking.
pub struct ClimateRunner<C> {
    entity: PilotWireClimate<C>,
    event_rx: mpsc::Receiver<MqttInMessage>,
    command_tx: mpsc::Sender<ClimateMessage>,
    command_rx: mpsc::Receiver<ClimateMessage>,
    mode_tx: watch::Sender<PilotWireMode>,
}

impl<C> ClimateRunner<C>
where
    C: LightCommandExecutor,
{
    pub fn new(entity: PilotWireClimate<C>, event_rx: mpsc::Receiver<MqttInMessage>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (mode_tx, _) = watch::channel(entity.current_mode());

        Self {
            entity,
            event_rx,
            command_tx,
            command_rx,
            mode_tx,
        }
    }

    pub fn client(&self) -> ClimateClient {
        ClimateClient {
            tx: self.command_tx.clone(),
        }
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<PilotWireMode> {
        self.mode_tx.subscribe()
    }

    pub fn descriptor(&self) -> ClimateDescriptor {
        self.entity.descriptor()
    }

    /// Seeds the recorded mode from a state fetched at startup.
    pub fn bootstrap(&mut self, state: &StateChangedEvent) {
        match self.entity.handle_state_changed(state) {
            Ok(true) => {
                tracing::info!("Initial mode of {}: {}", self.entity.name(), self.entity.current_mode());
                self.publish_mode();
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Error deriving initial mode, staying at default: {:?}", e);
            }
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(msg) = self.event_rx.recv() => {
                    self.handle_event(msg);
                }

                Some(command) = self.command_rx.recv() => {
                    self.handle_command(command).await;
                }

                else => break,
            }
        }
    }

    fn handle_event(&mut self, msg: MqttInMessage) {
        let event: StateChangedEvent = match serde_json::from_str(&msg.payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Error parsing state_changed event on {}: {:?}", msg.topic, e);
                return;
            }
        };

        match self.entity.handle_state_changed(&event) {
            Ok(true) => self.publish_mode(),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Error processing state_changed event of {}: {:?}", event.entity_id, e);
            }
        }
    }

    async fn handle_command(&mut self, command: ClimateMessage) {
        match command {
            ClimateMessage::SetOperationMode(label) => {
                match self.entity.set_operation_mode(&label).await {
                    Ok(()) => self.publish_mode(),
                    //caller error, not a fault of the bridge
                    Err(e) if e.is::<UnknownModeError>() => {
                        tracing::warn!("Rejected operation mode selection for {}: {}", self.entity.name(), e);
                    }
                    Err(e) => {
                        tracing::error!("Error setting operation mode of {}: {:?}", self.entity.name(), e);
                    }
                }
            }
        }
    }

    fn publish_mode(&self) {
        self.mode_tx.send_replace(self.entity.current_mode());
    }
}
