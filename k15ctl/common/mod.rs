#[cfg(test)]
pub mod mock;
pub mod transport;

pub use transport::{Device, HardwareTransport, RegisterTransport};
