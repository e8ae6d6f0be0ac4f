use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// State object of an entity, as mirrored to the MQTT event topic on every
/// `state_changed` event and as returned by `GET /api/states/<entity_id>`.
#[derive(Debug, Deserialize)]
pub struct StateChangedEvent {
    pub entity_id: String,
    pub state: StateValue,
    pub last_changed: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl StateChangedEvent {
    pub fn brightness(&self) -> Option<i64> {
        self.attributes.get("brightness").and_then(|v| v.as_i64())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateValue {
    Available(String),
    Unavailable,
}

impl StateValue {
    pub fn is_off(&self) -> bool {
        matches!(self, StateValue::Available(state) if state == "off")
    }
}

impl<'de> Deserialize<'de> for StateValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "unavailable" => Ok(StateValue::Unavailable),
            _ => Ok(StateValue::Available(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_dimmer_state() {
        let event: StateChangedEvent = serde_json::from_value(json!({
            "entity_id": "light.heater_salon",
            "state": "on",
            "last_changed": "2019-03-14T20:30:00+00:00",
            "last_updated": "2019-03-14T20:30:00+00:00",
            "attributes": {
                "brightness": 204,
                "friendly_name": "Heater Salon"
            }
        }))
        .unwrap();

        assert_eq!(event.entity_id, "light.heater_salon");
        assert_eq!(event.state, StateValue::Available("on".to_string()));
        assert!(!event.state.is_off());
        assert_eq!(event.brightness(), Some(204));
    }

    #[test]
    fn deserializes_off_state_without_brightness() {
        let event: StateChangedEvent = serde_json::from_value(json!({
            "entity_id": "light.heater_salon",
            "state": "off",
            "last_changed": "2019-03-14T20:30:00+00:00",
            "last_updated": "2019-03-14T20:30:00+00:00",
            "attributes": {}
        }))
        .unwrap();

        assert!(event.state.is_off());
        assert_eq!(event.brightness(), None);
    }

    #[test]
    fn unavailable_state_is_special_cased() {
        let event: StateChangedEvent = serde_json::from_value(json!({
            "entity_id": "light.heater_salon",
            "state": "unavailable",
            "last_changed": "2019-03-14T20:30:00+00:00",
            "last_updated": "2019-03-14T20:30:00+00:00"
        }))
        .unwrap();

        assert_eq!(event.state, StateValue::Unavailable);
        assert!(!event.state.is_off());
    }
}
