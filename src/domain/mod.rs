// Domain layer: plain data model and the seams (ports) the engine is built on.

pub mod model;
pub mod ports;
