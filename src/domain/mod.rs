// Domain layer: log records, documents and the ports the logger talks through.

pub mod model;
pub mod ports;
