use anyhow::Context;
use reqwest::header::{self, HeaderMap};
use reqwest_middleware::ClientWithMiddleware;
use reqwest_tracing::TracingMiddleware;

use super::StateChangedEvent;

#[derive(Debug, Clone)]
pub struct HaHttpClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HaHttpClient {
    pub fn new(url: &str, token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth_value = header::HeaderValue::from_str(&format!("Bearer {}", token))?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        let client = reqwest_middleware::ClientBuilder::new(client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get_state(&self, entity_id: &str) -> anyhow::Result<StateChangedEvent> {
        let response = self
            .client
            .get(format!("{}/api/states/{}", self.base_url, entity_id))
            .send()
            .await?
            .error_for_status()?;

        response
            .json::<StateChangedEvent>()
            .await
            .with_context(|| format!("Error getting state of {}", entity_id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn call_service(&self, domain: &str, service: &str, service_data: serde_json::Value) -> anyhow::Result<()> {
        let url = format!("{}/api/services/{}/{}", self.base_url, domain, service);

        tracing::info!("Calling HA service {}: {}", url, service_data);

        self.client
            .post(url)
            .json(&service_data)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("Error calling service {}/{}", domain, service))?;

        Ok(())
    }
}
