// Domain layer: wire models and ports (interfaces). No HTTP or config concerns here.

pub mod model;
pub mod ports;
