//! Camera capability abstraction

mod simulated;
mod traits;

pub use simulated::{DecodeInjector, SimulatedCamera};
pub use traits::{CameraCapability, PermissionState};
