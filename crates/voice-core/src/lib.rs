pub mod event_bus;
pub mod ports;
pub mod tools;
pub mod transcript;
pub mod registry;
pub mod state;
pub mod processor;
pub mod orchestrator;
pub mod telemetry;
pub mod session;
