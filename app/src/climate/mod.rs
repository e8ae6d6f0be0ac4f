mod entity;
mod service;

pub use entity::{ClimateDescriptor, ClimateFeature, PilotWireClimate, UnknownModeError};
pub use service::{ClimateClient, ClimateRunner};
