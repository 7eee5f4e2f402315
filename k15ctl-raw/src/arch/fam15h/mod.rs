//! AMD Family 15h (Bulldozer) register definitions
//!
//! This module provides the P-state and northbridge power management
//! registers of AMD Family 15h processors.
//!
//! ## Register Blocks
//!
//! - **P-state definitions** - eight per-core MSRs starting at `MSRC001_0064`
//! - **COF/VID status** - current operating point and platform voltage limits
//! - **Northbridge P-states** - two dwords in D18F5 configuration space
//! - **CPB control** - number of boosted P-states, D18F4 configuration space
//!
//! ## References
//!
//! - BIOS and Kernel Developer's Guide (BKDG) for AMD Family 15h Processors

pub mod cofvid;
pub mod cpb;
pub mod nb;
pub mod pstate;

/// Number of P-state definition MSRs per core (boosted + ordinary)
pub const PSTATE_NUM: usize = 8;

/// Number of northbridge P-state registers per node
pub const NB_PSTATE_NUM: usize = 2;

/// Upper bound of the boosted P-state count reported by CPB control
pub const MAX_BOOST_STATES: u8 = 3;

/// First voltage identifier that switches the regulator off
pub const VID_OFF: u8 = 0x7C;

/// MSR addresses for P-state management
pub mod msr {
    /// P-state 0 definition, slots 1-7 follow contiguously
    pub const PSTATE_DEF_BASE: u64 = 0xC001_0064;

    /// COF/VID Status
    pub const COFVID_STATUS: u64 = 0xC001_0071;
}

/// PCI configuration addresses for the northbridge
pub mod pci {
    /// Device number of node 0; node `n` is at `NODE0_DEVICE + n` on bus 0
    pub const NODE0_DEVICE: u8 = 0x18;

    /// Miscellaneous control function (CPB control)
    pub const FUNC_MISC: u8 = 4;

    /// Extended miscellaneous control function (northbridge P-states)
    pub const FUNC_NB_PSTATE: u8 = 5;

    /// Core Performance Boost Control (D18F4x15C)
    pub const CPB_CTRL: u64 = 0x15C;

    /// Northbridge P-state 0 (D18F5x160)
    pub const NB_PSTATE0: u64 = 0x160;

    /// Northbridge P-state 1 (D18F5x164)
    pub const NB_PSTATE1: u64 = 0x164;

    /// Northbridge P-state offsets indexed by slot
    pub const NB_PSTATES: [u64; super::NB_PSTATE_NUM] = [NB_PSTATE0, NB_PSTATE1];
}

/// Supply voltage in millivolts for a voltage identifier
///
/// Shared by core and northbridge VIDs: 1.550 V at VID 0, 12.5 mV lower per
/// step, and 0 V from [`VID_OFF`] upwards.
pub fn vid_to_millivolts(vid: u8) -> f64 {
    if vid >= VID_OFF {
        0.0
    } else {
        1550.0 - f64::from(vid) * 12.5
    }
}
