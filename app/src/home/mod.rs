pub mod mode;

pub use mode::PilotWireMode;
