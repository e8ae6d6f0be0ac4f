use anyhow::Context;
use serde::Serialize;

use crate::adapter::homeassistant::{StateChangedEvent, StateValue};
use crate::home::PilotWireMode;
use crate::port::LightCommandExecutor;

/// Adapts one dimmer into a climate device with a finite operation-mode
/// selector. The only mutable state is the recorded mode; everything else is
/// fixed at construction.
pub struct PilotWireClimate<C> {
    name: String,
    dimmer_entity_id: String,
    current_mode: PilotWireMode,
    executor: C,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Unknown operation mode: {mode}")]
pub struct UnknownModeError {
    pub mode: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateFeature {
    OperationMode,
}

/// Static entity surface announced to the frontend bridge.
#[derive(Debug, Clone, Serialize)]
pub struct ClimateDescriptor {
    pub name: String,
    pub operation_modes: Vec<&'static str>,
    pub temperature_unit: &'static str,
    pub should_poll: bool,
    pub supported_features: Vec<ClimateFeature>,
}

impl<C> PilotWireClimate<C>
where
    C: LightCommandExecutor,
{
    pub fn new(name: &str, dimmer_entity_id: &str, executor: C) -> Self {
        Self {
            name: name.to_string(),
            dimmer_entity_id: dimmer_entity_id.to_string(),
            current_mode: PilotWireMode::Comfort,
            executor,
        }
    }

    /// Applies a state-changed event of the bridged dimmer. Events of other
    /// entities are ignored. Returns whether the recorded mode was set from
    /// the event.
    ///
    /// A non-off state without a brightness attribute is a defect of the
    /// source and surfaces as an error instead of a silent default.
    pub fn handle_state_changed(&mut self, event: &StateChangedEvent) -> anyhow::Result<bool> {
        if event.entity_id != self.dimmer_entity_id {
            return Ok(false);
        }

        let mode = match &event.state {
            StateValue::Unavailable => {
                tracing::warn!(
                    "Dimmer {} is not available (last update {}), keeping mode {}",
                    self.dimmer_entity_id,
                    event.last_updated,
                    self.current_mode
                );
                return Ok(false);
            }
            state if state.is_off() => PilotWireMode::Off,
            _ => {
                let raw = event
                    .brightness()
                    .with_context(|| format!("No brightness attribute in state of {}", event.entity_id))?;
                PilotWireMode::from_raw_brightness(raw)
            }
        };

        tracing::debug!(
            "Dimmer {} reported state of {}: mode {}",
            self.dimmer_entity_id,
            event.last_changed,
            mode
        );

        self.current_mode = mode;
        Ok(true)
    }

    /// Resolves the label and commands the matching brightness. The new mode
    /// is recorded once the service call is accepted; the physical result is
    /// not verified. A rejected call is reported and absorbed, leaving the
    /// recorded mode unchanged.
    pub async fn set_operation_mode(&mut self, label: &str) -> anyhow::Result<()> {
        let mode = PilotWireMode::from_label(label).ok_or_else(|| UnknownModeError { mode: label.to_string() })?;

        let brightness_pct = mode.brightness_pct();
        if let Err(e) = self.executor.set_brightness_pct(&self.dimmer_entity_id, brightness_pct).await {
            tracing::error!(
                "Error setting brightness of {} to {} % for mode {}: {:?}",
                self.dimmer_entity_id,
                brightness_pct,
                mode,
                e
            );
            return Ok(());
        }

        self.current_mode = mode;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_mode(&self) -> PilotWireMode {
        self.current_mode
    }

    pub fn current_operation(&self) -> &'static str {
        self.current_mode.label()
    }

    pub fn operation_list(&self) -> Vec<&'static str> {
        PilotWireMode::VARIANTS.iter().map(|mode| mode.label()).collect()
    }

    //push-updated, the host never needs to poll
    pub fn should_poll(&self) -> bool {
        false
    }

    //required by the climate capability set, not used for control
    pub fn temperature_unit(&self) -> &'static str {
        "°C"
    }

    pub fn supported_features(&self) -> Vec<ClimateFeature> {
        vec![ClimateFeature::OperationMode]
    }

    pub fn descriptor(&self) -> ClimateDescriptor {
        ClimateDescriptor {
            name: self.name.clone(),
            operation_modes: self.operation_list(),
            temperature_unit: self.temperature_unit(),
            should_poll: self.should_poll(),
            supported_features: self.supported_features(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    struct FakeDimmer {
        calls: RefCell<Vec<(String, u8)>>,
        fail: bool,
    }

    impl FakeDimmer {
        fn new() -> Self {
            Self {
                calls: RefCell::new(vec![]),
                fail: false,
            }
        }

        fn unreachable() -> Self {
            Self {
                calls: RefCell::new(vec![]),
                fail: true,
            }
        }
    }

    impl LightCommandExecutor for FakeDimmer {
        async fn set_brightness_pct(&self, entity_id: &str, brightness_pct: u8) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("dimmer unreachable");
            }

            self.calls.borrow_mut().push((entity_id.to_string(), brightness_pct));
            Ok(())
        }
    }

    fn entity() -> PilotWireClimate<FakeDimmer> {
        PilotWireClimate::new("Chauffage Salon", "light.heater_salon", FakeDimmer::new())
    }

    fn dimmer_event(entity_id: &str, state: &str, attributes: serde_json::Value) -> StateChangedEvent {
        serde_json::from_value(json!({
            "entity_id": entity_id,
            "state": state,
            "last_changed": "2019-03-14T20:30:00+00:00",
            "last_updated": "2019-03-14T20:30:00+00:00",
            "attributes": attributes
        }))
        .unwrap()
    }

    #[test]
    fn starts_at_comfort() {
        let entity = entity();
        assert_eq!(entity.current_mode(), PilotWireMode::Comfort);
        assert_eq!(entity.current_operation(), "Confort");
    }

    #[test]
    fn brightness_event_updates_mode() {
        let mut entity = entity();

        let event = dimmer_event("light.heater_salon", "on", json!({"brightness": 204}));
        assert!(entity.handle_state_changed(&event).unwrap());

        assert_eq!(entity.current_mode(), PilotWireMode::Comfort);

        let event = dimmer_event("light.heater_salon", "on", json!({"brightness": 64}));
        assert!(entity.handle_state_changed(&event).unwrap());

        assert_eq!(entity.current_mode(), PilotWireMode::Eco);
    }

    #[test]
    fn off_state_forces_off_mode_despite_stale_brightness() {
        let mut entity = entity();

        let event = dimmer_event("light.heater_salon", "off", json!({"brightness": 204}));
        assert!(entity.handle_state_changed(&event).unwrap());

        assert_eq!(entity.current_mode(), PilotWireMode::Off);
    }

    #[test]
    fn event_of_other_entity_is_ignored() {
        let mut entity = entity();

        let event = dimmer_event("light.other", "on", json!({"brightness": 25}));
        assert!(!entity.handle_state_changed(&event).unwrap());

        assert_eq!(entity.current_mode(), PilotWireMode::Comfort);
    }

    #[test]
    fn unavailable_state_keeps_mode() {
        let mut entity = entity();

        let event = dimmer_event("light.heater_salon", "unavailable", json!({}));
        assert!(!entity.handle_state_changed(&event).unwrap());

        assert_eq!(entity.current_mode(), PilotWireMode::Comfort);
    }

    #[test]
    fn missing_brightness_attribute_is_an_error() {
        let mut entity = entity();

        let event = dimmer_event("light.heater_salon", "on", json!({}));
        let result = entity.handle_state_changed(&event);

        assert!(result.is_err());
        assert_eq!(entity.current_mode(), PilotWireMode::Comfort);
    }

    #[tokio::test]
    async fn set_operation_mode_commands_bucket_midpoint() {
        let mut entity = entity();

        entity.set_operation_mode("Eco").await.unwrap();

        assert_eq!(entity.current_mode(), PilotWireMode::Eco);
        assert_eq!(
            *entity.executor.calls.borrow(),
            vec![("light.heater_salon".to_string(), 25)]
        );
    }

    #[tokio::test]
    async fn unknown_operation_mode_fails_and_keeps_mode() {
        let mut entity = entity();

        let error = entity.set_operation_mode("Boost").await.unwrap_err();

        let unknown = error
            .downcast_ref::<UnknownModeError>()
            .expect("expected an unknown-mode error");
        assert_eq!(unknown.mode, "Boost");

        assert_eq!(entity.current_mode(), PilotWireMode::Comfort);
        assert!(entity.executor.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn command_failure_is_absorbed_and_keeps_mode() {
        let mut entity =
            PilotWireClimate::new("Chauffage Salon", "light.heater_salon", FakeDimmer::unreachable());

        entity.set_operation_mode("Eco").await.unwrap();

        assert_eq!(entity.current_mode(), PilotWireMode::Comfort);
    }

    #[test]
    fn entity_surface() {
        let entity = entity();

        assert_eq!(entity.name(), "Chauffage Salon");
        assert!(!entity.should_poll());
        assert_eq!(entity.temperature_unit(), "°C");
        assert_eq!(
            entity.operation_list(),
            vec!["Off", "No Frost", "Eco", "Confort -2°C", "Confort -1°C", "Confort"]
        );
        assert_eq!(entity.supported_features(), vec![ClimateFeature::OperationMode]);
    }
}
