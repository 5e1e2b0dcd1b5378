// Domain layer: order and summary models plus the ports the engine runs against.

pub mod model;
pub mod ports;
