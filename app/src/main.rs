use settings::Settings;

use crate::climate::{ClimateRunner, PilotWireClimate};

mod adapter;
mod climate;
mod frontend;
mod home;
mod port;
mod settings;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    settings.monitoring.init().expect("Error initializing monitoring");

    let mut mqtt_client = settings.mqtt.new_client();

    let executor = settings
        .homeassistant
        .new_light_executor()
        .expect("Error initializing Home Assistant REST client");

    let entity = PilotWireClimate::new(&settings.climate.name, &settings.climate.entity_id, executor);

    let event_rx = settings
        .homeassistant
        .new_event_subscription(&mut mqtt_client)
        .await
        .expect("Error subscribing to Home Assistant event topic");

    let mut runner = ClimateRunner::new(entity, event_rx);
    let descriptor = runner.descriptor();

    let frontend_export =
        settings
            .frontend
            .export_state(descriptor.clone(), mqtt_client.new_publisher(), runner.subscribe_mode());

    let frontend_commands = settings
        .frontend
        .process_commands(&mut mqtt_client, &descriptor, runner.client())
        .await
        .expect("Error subscribing to frontend command topic");

    //Seed the current mode from the dimmer's last known state. The entity is
    //push-updated afterwards, so a failure here only delays the first sync.
    let ha_client = settings
        .homeassistant
        .new_http_client()
        .expect("Error initializing Home Assistant REST client");

    match ha_client.get_state(&settings.climate.entity_id).await {
        Ok(state) => runner.bootstrap(&state),
        Err(e) => {
            tracing::warn!("Error loading initial dimmer state, starting at default mode: {:?}", e);
        }
    }

    tracing::info!("Starting main loop");

    tokio::select!(
        _ = mqtt_client.process() => {},
        _ = runner.run() => {},
        _ = frontend_export => {},
        _ = frontend_commands => {},
    );
}
