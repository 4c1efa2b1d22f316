// Domain layer: matching models and ports (interfaces).

pub mod model;
pub mod ports;
