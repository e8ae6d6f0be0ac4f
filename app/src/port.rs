#![allow(async_fn_in_trait)]

use anyhow::Result;

/// Outbound seam towards the bridged dimmer. The climate entity only ever
/// issues one command shape, so the interface stays this narrow.
pub trait LightCommandExecutor {
    async fn set_brightness_pct(&self, entity_id: &str, brightness_pct: u8) -> Result<()>;
}
