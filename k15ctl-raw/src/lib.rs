//! # k15ctl-raw
//!
//! Register definitions for AMD Family 15h P-state and northbridge power
//! management.
//!
//! This crate provides type-safe layouts for the P-state definition MSRs,
//! the COF/VID status MSR and the northbridge configuration space registers,
//! the formulas that turn their encodings into clock, voltage, current and
//! power figures, and the raw MSR / PCI configuration space primitives.
//!
//! ## Features
//!
//! Select the target family via feature flags:
//! - `fam15h` (default) - Family 15h (Bulldozer / Piledriver) definitions
//!
//! ## Usage
//!
//! ```ignore
//! use k15ctl_raw::current_arch::{msr, pstate::PStateDef};
//! use k15ctl_raw::{read_msr, write_msr, RegisterLayout};
//!
//! let mut p0 = PStateDef::from_raw(read_msr(0, msr::PSTATE_DEF_BASE)?);
//! println!("P0: {} MHz, {:.1} mV", p0.core_clock_mhz(), p0.voltage_mv());
//!
//! p0.cpu_vid = 22;
//! p0.validate()?;
//! write_msr(0, msr::PSTATE_DEF_BASE, p0.to_raw())?;
//! ```

pub mod arch;
pub mod msr;
pub mod pci;
pub mod register;

// Re-export for convenience
pub use msr::{read_msr, write_msr, MsrError};
pub use pci::{read_pci32, write_pci32, PciError, PciFunction};
pub use register::{RawValue, Register, RegisterLayout};

// Export current architecture based on feature flag
#[cfg(feature = "fam15h")]
pub use arch::fam15h as current_arch;
