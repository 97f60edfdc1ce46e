// Domain layer: incubator model, rotation scheduler and the store port.
// No I/O here; adapters implement the port.

pub mod model;
pub mod ports;
pub mod scheduler;
