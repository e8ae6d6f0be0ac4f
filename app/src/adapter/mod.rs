pub mod homeassistant;
