// Macros (must be first for visibility)
#[macro_use]
pub mod macros;

pub mod common;
pub mod config;
pub mod display;
pub mod error;
pub mod pstate;

pub use common::{Device, HardwareTransport, RegisterTransport};
pub use config::{PlatformConfig, TransportConfig};
pub use error::{K15Error, Result, Warning};
pub use pstate::{CpuOverrides, NbOverrides, PStateController, PStateSelection};
