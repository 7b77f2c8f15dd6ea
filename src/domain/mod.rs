// Domain layer: core models and ports (interfaces). No dependencies beyond
// std/serde and the crate's error types.

pub mod model;
pub mod ports;
