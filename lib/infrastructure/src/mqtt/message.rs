use std::str::Utf8Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttInMessage {
    pub topic: String,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttOutMessage {
    pub topic: String,
    pub payload: String,
    pub retain: bool,
}

impl MqttOutMessage {
    pub fn retained(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: true,
        }
    }

    pub fn transient(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain: false,
        }
    }
}

impl TryFrom<&rumqttc::v5::mqttbytes::v5::Publish> for MqttInMessage {
    type Error = Utf8Error;

    fn try_from(publish: &rumqttc::v5::mqttbytes::v5::Publish) -> Result<Self, Self::Error> {
        Ok(MqttInMessage {
            topic: std::str::from_utf8(&publish.topic)?.to_string(),
            payload: std::str::from_utf8(&publish.payload)?.to_string(),
        })
    }
}
