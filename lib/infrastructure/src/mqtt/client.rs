use rumqttc::v5::{
    AsyncClient, EventLoop, MqttOptions,
    mqttbytes::{QoS, v5::ConnectProperties},
};

use rumqttc::v5::Event::Incoming;
use tokio::sync::mpsc;

use super::{MqttInMessage, MqttOutMessage};

pub struct Mqtt {
    client: AsyncClient,
    event_loop: EventLoop,
    subscriptions: Vec<Subscription>,
    out_tx: mpsc::Sender<MqttOutMessage>,
    out_rx: mpsc::Receiver<MqttOutMessage>,
}

struct Subscription {
    topic_filter: String,
    txs: Vec<mpsc::Sender<MqttInMessage>>,
}

impl Mqtt {
    pub fn connect(host: &str, port: u16, client_id: &str) -> Self {
        let mut mqttoptions = MqttOptions::new(client_id, host, port);
        mqttoptions.set_keep_alive(::std::time::Duration::from_secs(5));
        mqttoptions.set_clean_start(false);

        let mut connect_props = ConnectProperties::new();
        connect_props.session_expiry_interval = 60.into();
        connect_props.max_packet_size = Some(1024 * 1024);
        mqttoptions.set_connect_properties(connect_props);

        let (client, event_loop) = AsyncClient::new(mqttoptions, 10);
        let (out_tx, out_rx) = mpsc::channel(16);

        Mqtt {
            client,
            event_loop,
            subscriptions: vec![],
            out_tx,
            out_rx,
        }
    }

    pub async fn subscribe(&mut self, topic: impl Into<String>) -> anyhow::Result<mpsc::Receiver<MqttInMessage>> {
        let topic = topic.into();
        let (tx, rx) = mpsc::channel::<MqttInMessage>(32);

        if let Some(subscription) = self.subscriptions.iter_mut().find(|s| s.topic_filter == topic) {
            tracing::info!("Adding receiver to existing subscription: {:?}", topic);
            subscription.txs.push(tx);
            return Ok(rx);
        }

        tracing::info!("Creating new subscription for topic: {:?}", topic);

        self.client.subscribe(topic.clone(), QoS::AtLeastOnce).await?;
        self.subscriptions.push(Subscription {
            topic_filter: topic,
            txs: vec![tx],
        });

        Ok(rx)
    }

    pub fn new_publisher(&self) -> mpsc::Sender<MqttOutMessage> {
        self.out_tx.clone()
    }

    //Receive and forward MQTT messages in both directions
    pub async fn process(self) {
        let mut event_loop = self.event_loop;
        let mut out_rx = self.out_rx;
        let client = self.client;
        let subscriptions = self.subscriptions;

        loop {
            tokio::select! {
                event = event_loop.poll() => match event {
                    Ok(Incoming(rumqttc::v5::mqttbytes::v5::Packet::Publish(publish))) => {
                        dispatch_publish(&subscriptions, publish).await;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("MQTT error: {}", e);
                    }
                },

                Some(msg) = out_rx.recv() => {
                    publish_outgoing(&client, msg).await;
                }
            }
        }
    }
}

async fn dispatch_publish(subscriptions: &[Subscription], publish: rumqttc::v5::mqttbytes::v5::Publish) {
    let msg: MqttInMessage = match (&publish).try_into() {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("Error parsing MQTT message: {}", e);
            return;
        }
    };

    tracing::trace!("Received MQTT message on topic {}", msg.topic);

    for subscription in subscriptions.iter().filter(|s| topic_matches(&s.topic_filter, &msg.topic)) {
        for tx in subscription.txs.iter() {
            if let Err(e) = tx.send(msg.clone()).await {
                tracing::error!(
                    "Failed to forward MQTT message to subscriber of {}: {}",
                    subscription.topic_filter,
                    e
                );
            }
        }
    }
}

async fn publish_outgoing(client: &AsyncClient, msg: MqttOutMessage) {
    tracing::debug!(
        "Publishing MQTT message to {} (retain={}): {:?}",
        msg.topic,
        msg.retain,
        msg.payload
    );

    if let Err(e) = client
        .publish(msg.topic.clone(), QoS::AtLeastOnce, msg.retain, msg.payload)
        .await
    {
        tracing::error!("Error publishing MQTT message to {}: {}", msg.topic, e);
    }
}

//Topic filter matching with single-level (+) and multi-level (#) wildcards
fn topic_matches(filter: &str, topic: &str) -> bool {
    let mut filter_parts = filter.split('/');
    let mut topic_parts = topic.split('/');

    loop {
        match (filter_parts.next(), topic_parts.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => continue,
            (Some(f), Some(t)) if f == t => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}
