//! Architecture-specific register definitions
//!
//! Each AMD processor family has its own P-state MSR block, northbridge
//! configuration space layout and voltage encoding. This module provides
//! family-specific definitions.
//!
//! ## Supported Architectures
//!
//! - **Family 15h** (`fam15h` feature) - Bulldozer / Piledriver

#[cfg(feature = "fam15h")]
pub mod fam15h;
