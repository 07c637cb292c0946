// src/hal/mod.rs
//! Device settings HAL surface and the in-process backend

pub mod simulator;
pub mod status;
pub mod traits;
pub mod types;


pub use simulator::SimulatedHal;
pub use status::{DsStatus, HalResult};
pub use traits::*;
pub use types::*;
