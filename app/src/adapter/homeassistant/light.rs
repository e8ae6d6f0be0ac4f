use serde_json::json;

use super::HaHttpClient;
use crate::port::LightCommandExecutor;

/// Drives the bridged dimmer through the `light.turn_on` service.
pub struct HaLightExecutor {
    client: HaHttpClient,
}

impl HaLightExecutor {
    pub fn new(client: HaHttpClient) -> Self {
        Self { client }
    }
}

impl LightCommandExecutor for HaLightExecutor {
    async fn set_brightness_pct(&self, entity_id: &str, brightness_pct: u8) -> anyhow::Result<()> {
        self.client
            .call_service("light", "turn_on", turn_on_payload(entity_id, brightness_pct))
            .await
    }
}

fn turn_on_payload(entity_id: &str, brightness_pct: u8) -> serde_json::Value {
    json!({
        "entity_id": vec![entity_id.to_string()],
        "brightness_pct": brightness_pct,
    })
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_eq;

    use super::*;

    #[test]
    fn test_turn_on_payload() {
        let payload = turn_on_payload("light.heater_salon", 25);

        assert_json_eq!(
            payload,
            serde_json::json!({
                "entity_id": ["light.heater_salon"],
                "brightness_pct": 25
            })
        );
    }
}
