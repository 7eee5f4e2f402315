//! Per-core P-state definition register (MSRC001_00[6B:64])
//!
//! Each core has eight P-state definitions. The first `NumBoostStates` of
//! them are boosted states; ordinary P-state `n` therefore lives at
//! `PSTATE_DEF_BASE + NumBoostStates + n`.

use super::vid_to_millivolts;
use crate::register::{field, mask, place, RegisterLayout};

const CPU_FID: (u32, u32) = (0, 6);
const CPU_DID: (u32, u32) = (6, 3);
const CPU_VID: (u32, u32) = (9, 7);
const NB_PSTATE: (u32, u32) = (22, 1);
const IDD_VALUE: (u32, u32) = (32, 8);
const IDD_DIV: (u32, u32) = (40, 2);
const PSTATE_EN: (u32, u32) = (63, 1);

/// Every bit owned by a named field; the rest is passed through untouched
const FIELD_BITS: u64 = (mask(CPU_FID.1) << CPU_FID.0)
    | (mask(CPU_DID.1) << CPU_DID.0)
    | (mask(CPU_VID.1) << CPU_VID.0)
    | (mask(NB_PSTATE.1) << NB_PSTATE.0)
    | (mask(IDD_VALUE.1) << IDD_VALUE.0)
    | (mask(IDD_DIV.1) << IDD_DIV.0)
    | (mask(PSTATE_EN.1) << PSTATE_EN.0);

/// Divisors applied to `IddValue` by `IddDiv`: amps = value / divisor
pub const IDD_DIVISORS: [f64; 4] = [1.0, 10.0, 100.0, 1000.0];

/// P-state Definition Register layout
///
/// ## Register Format
///
/// | Bits   | Field      | Description                              |
/// |--------|------------|------------------------------------------|
/// | 0-5    | cpu_fid    | Core frequency ID                        |
/// | 6-8    | cpu_did    | Core divisor ID (power of two)           |
/// | 9-15   | cpu_vid    | Core voltage ID                          |
/// | 16-21  | reserved   |                                          |
/// | 22     | nb_pstate  | Associated northbridge P-state           |
/// | 23-31  | reserved   |                                          |
/// | 32-39  | idd_value  | Current value                            |
/// | 40-41  | idd_div    | Current divisor (1, 1/10, 1/100, 1/1000) |
/// | 42-62  | reserved   |                                          |
/// | 63     | pstate_en  | P-state enabled                          |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PStateDef {
    /// Core frequency ID: COF = 100 MHz * (cpu_fid + 16) / 2^cpu_did
    pub cpu_fid: u8,

    /// Core divisor ID
    pub cpu_did: u8,

    /// Core voltage ID, larger values mean lower voltage
    pub cpu_vid: u8,

    /// Northbridge P-state used while the core is in this P-state
    pub nb_pstate: u8,

    /// Expected maximum current, scaled by `idd_div`
    pub idd_value: u8,

    /// Current divisor selector
    pub idd_div: u8,

    /// P-state enabled
    pub pstate_en: bool,

    /// Reserved bits as read from hardware (field bits always clear)
    pub reserved: u64,
}

impl RegisterLayout for PStateDef {
    type Raw = u64;

    fn to_raw(&self) -> u64 {
        (self.reserved & !FIELD_BITS)
            | place(self.cpu_fid.into(), CPU_FID.0, CPU_FID.1)
            | place(self.cpu_did.into(), CPU_DID.0, CPU_DID.1)
            | place(self.cpu_vid.into(), CPU_VID.0, CPU_VID.1)
            | place(self.nb_pstate.into(), NB_PSTATE.0, NB_PSTATE.1)
            | place(self.idd_value.into(), IDD_VALUE.0, IDD_VALUE.1)
            | place(self.idd_div.into(), IDD_DIV.0, IDD_DIV.1)
            | place(self.pstate_en.into(), PSTATE_EN.0, PSTATE_EN.1)
    }

    fn from_raw(value: u64) -> Self {
        Self {
            cpu_fid: field(value, CPU_FID.0, CPU_FID.1) as u8,
            cpu_did: field(value, CPU_DID.0, CPU_DID.1) as u8,
            cpu_vid: field(value, CPU_VID.0, CPU_VID.1) as u8,
            nb_pstate: field(value, NB_PSTATE.0, NB_PSTATE.1) as u8,
            idd_value: field(value, IDD_VALUE.0, IDD_VALUE.1) as u8,
            idd_div: field(value, IDD_DIV.0, IDD_DIV.1) as u8,
            pstate_en: field(value, PSTATE_EN.0, PSTATE_EN.1) != 0,
            reserved: value & !FIELD_BITS,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if u64::from(self.cpu_fid) > mask(CPU_FID.1) {
            return Err("CpuFid must be <= 63 (6 bits)");
        }
        if u64::from(self.cpu_did) > mask(CPU_DID.1) {
            return Err("CpuDid must be <= 7 (3 bits)");
        }
        if u64::from(self.cpu_vid) > mask(CPU_VID.1) {
            return Err("CpuVid must be <= 127 (7 bits)");
        }
        if u64::from(self.nb_pstate) > mask(NB_PSTATE.1) {
            return Err("NbPstate must be 0 or 1 (1 bit)");
        }
        if u64::from(self.idd_div) > mask(IDD_DIV.1) {
            return Err("IddDiv must be <= 3 (2 bits)");
        }
        if self.reserved & FIELD_BITS != 0 {
            return Err("Reserved bits overlap P-state fields");
        }
        Ok(())
    }
}

impl PStateDef {
    /// Core current operating frequency in MHz
    pub fn core_clock_mhz(&self) -> u32 {
        let fid = u32::from(self.cpu_fid) & 0x3F;
        let did = u32::from(self.cpu_did) & 0x7;
        (100 * (fid + 16)) >> did
    }

    /// Core supply voltage in millivolts
    pub fn voltage_mv(&self) -> f64 {
        vid_to_millivolts(self.cpu_vid)
    }

    /// Expected current draw in amps
    pub fn current_amps(&self) -> f64 {
        f64::from(self.idd_value) / IDD_DIVISORS[usize::from(self.idd_div) & 0x3]
    }

    /// Power dissipation in milliwatts (mV * A)
    pub fn power_mw(&self) -> f64 {
        self.voltage_mv() * self.current_amps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pstate_round_trip_raw() {
        for raw in [
            0u64,
            u64::MAX,
            0x8000_0189_0040_2C10,
            0x1234_5678_9ABC_DEF0,
            0x7FFF_FC00_FF80_0000,
        ] {
            assert_eq!(PStateDef::from_raw(raw).to_raw(), raw, "raw 0x{raw:016X}");
        }
    }

    #[test]
    fn test_pstate_round_trip_layout() {
        let def = PStateDef {
            cpu_fid: 22,
            cpu_did: 1,
            cpu_vid: 40,
            nb_pstate: 1,
            idd_value: 200,
            idd_div: 2,
            pstate_en: true,
            reserved: 0x0000_0400_0001_0000,
        };

        assert!(def.validate().is_ok());
        assert_eq!(PStateDef::from_raw(def.to_raw()), def);
    }

    #[test]
    fn test_pstate_field_positions() {
        let def = PStateDef::from_raw(0x8000_0189_0040_2C10);

        assert_eq!(def.cpu_fid, 0x10);
        assert_eq!(def.cpu_did, 0);
        assert_eq!(def.cpu_vid, 0x16);
        assert_eq!(def.nb_pstate, 1);
        assert_eq!(def.idd_value, 0x89);
        assert_eq!(def.idd_div, 1);
        assert!(def.pstate_en);
        assert_eq!(def.reserved, 0);
    }

    #[test]
    fn test_pstate_all_ones_keeps_reserved() {
        let def = PStateDef::from_raw(u64::MAX);

        assert_eq!(def.cpu_fid, 63);
        assert_eq!(def.cpu_did, 7);
        assert_eq!(def.cpu_vid, 127);
        assert_eq!(def.idd_value, 255);
        assert_eq!(def.idd_div, 3);
        assert_eq!(def.reserved, !FIELD_BITS);
    }

    #[test]
    fn test_pstate_validate_rejects_wide_fields() {
        let def = PStateDef {
            cpu_fid: 64,
            ..Default::default()
        };
        assert!(def.validate().is_err());

        let def = PStateDef {
            reserved: 1,
            ..Default::default()
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_core_clock() {
        let def = PStateDef {
            cpu_fid: 16,
            cpu_did: 0,
            ..Default::default()
        };
        assert_eq!(def.core_clock_mhz(), 3200);

        let def = PStateDef {
            cpu_fid: 0,
            cpu_did: 3,
            ..Default::default()
        };
        assert_eq!(def.core_clock_mhz(), 200);
    }

    #[test]
    fn test_current_and_power() {
        let def = PStateDef {
            cpu_vid: 0,
            idd_value: 100,
            idd_div: 1,
            ..Default::default()
        };

        assert_eq!(def.voltage_mv(), 1550.0);
        assert_eq!(def.current_amps(), 10.0);
        assert_eq!(def.power_mw(), 15500.0);

        let off = PStateDef {
            cpu_vid: 124,
            ..def
        };
        assert_eq!(off.power_mw(), 0.0);
    }

    #[test]
    fn test_current_divisor_resolution() {
        let amps: Vec<f64> = (0..4)
            .map(|idd_div| {
                PStateDef {
                    idd_value: 5,
                    idd_div,
                    ..Default::default()
                }
                .current_amps()
            })
            .collect();

        assert_eq!(amps, vec![5.0, 0.5, 0.05, 0.005]);
    }
}
