//! Northbridge P-state registers (D18F5x160 / D18F5x164)

use super::vid_to_millivolts;
use crate::register::{field, mask, place, RegisterLayout};

const NB_PSTATE_EN: (u32, u32) = (0, 1);
const NB_FID: (u32, u32) = (1, 5);
const NB_DID: (u32, u32) = (7, 1);
const NB_VID: (u32, u32) = (10, 7);

const FIELD_BITS: u64 = (mask(NB_PSTATE_EN.1) << NB_PSTATE_EN.0)
    | (mask(NB_FID.1) << NB_FID.0)
    | (mask(NB_DID.1) << NB_DID.0)
    | (mask(NB_VID.1) << NB_VID.0);

/// Northbridge P-state Register layout
///
/// ## Register Format
///
/// | Bits   | Field        | Description                        |
/// |--------|--------------|------------------------------------|
/// | 0      | nb_pstate_en | Northbridge P-state enabled        |
/// | 1-5    | nb_fid       | Northbridge frequency ID           |
/// | 6      | reserved     |                                    |
/// | 7      | nb_did       | Northbridge divisor ID             |
/// | 8-9    | reserved     |                                    |
/// | 10-16  | nb_vid       | Northbridge voltage ID             |
/// | 17-31  | reserved     |                                    |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NbPStateDef {
    /// Northbridge P-state enabled
    pub nb_pstate_en: bool,

    /// Northbridge frequency ID: NCLK = 200 MHz * (nb_fid + 4) / 2^nb_did
    pub nb_fid: u8,

    /// Northbridge divisor ID
    pub nb_did: u8,

    /// Northbridge voltage ID
    pub nb_vid: u8,

    /// Reserved bits as read from hardware
    pub reserved: u32,
}

impl RegisterLayout for NbPStateDef {
    type Raw = u32;

    fn to_raw(&self) -> u32 {
        let value = (u64::from(self.reserved) & !FIELD_BITS)
            | place(self.nb_pstate_en.into(), NB_PSTATE_EN.0, NB_PSTATE_EN.1)
            | place(self.nb_fid.into(), NB_FID.0, NB_FID.1)
            | place(self.nb_did.into(), NB_DID.0, NB_DID.1)
            | place(self.nb_vid.into(), NB_VID.0, NB_VID.1);
        value as u32
    }

    fn from_raw(value: u32) -> Self {
        let raw = u64::from(value);
        Self {
            nb_pstate_en: field(raw, NB_PSTATE_EN.0, NB_PSTATE_EN.1) != 0,
            nb_fid: field(raw, NB_FID.0, NB_FID.1) as u8,
            nb_did: field(raw, NB_DID.0, NB_DID.1) as u8,
            nb_vid: field(raw, NB_VID.0, NB_VID.1) as u8,
            reserved: (raw & !FIELD_BITS) as u32,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if u64::from(self.nb_fid) > mask(NB_FID.1) {
            return Err("NbFid must be <= 31 (5 bits)");
        }
        if u64::from(self.nb_did) > mask(NB_DID.1) {
            return Err("NbDid must be 0 or 1 (1 bit)");
        }
        if u64::from(self.nb_vid) > mask(NB_VID.1) {
            return Err("NbVid must be <= 127 (7 bits)");
        }
        if u64::from(self.reserved) & FIELD_BITS != 0 {
            return Err("Reserved bits overlap northbridge P-state fields");
        }
        Ok(())
    }
}

impl NbPStateDef {
    /// Northbridge clock in MHz
    pub fn nb_clock_mhz(&self) -> u32 {
        let fid = u32::from(self.nb_fid) & 0x1F;
        let did = u32::from(self.nb_did) & 0x1;
        (200 * (fid + 4)) >> did
    }

    /// Northbridge supply voltage in millivolts
    pub fn voltage_mv(&self) -> f64 {
        vid_to_millivolts(self.nb_vid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nb_pstate_round_trip_raw() {
        for raw in [0u32, u32::MAX, 0x0000_B82D, 0xA5A5_5A5A] {
            assert_eq!(NbPStateDef::from_raw(raw).to_raw(), raw, "raw 0x{raw:08X}");
        }
    }

    #[test]
    fn test_nb_pstate_field_positions() {
        // NbVid 46, NbDid 0, NbFid 22, enabled
        let raw = (46 << 10) | (22 << 1) | 1;
        let def = NbPStateDef::from_raw(raw);

        assert!(def.nb_pstate_en);
        assert_eq!(def.nb_fid, 22);
        assert_eq!(def.nb_did, 0);
        assert_eq!(def.nb_vid, 46);
        assert_eq!(def.reserved, 0);
        assert_eq!(NbPStateDef::from_raw(def.to_raw()), def);
    }

    #[test]
    fn test_nb_pstate_reserved_bits() {
        let def = NbPStateDef::from_raw(u32::MAX);
        assert_eq!(def.reserved, !(FIELD_BITS as u32));
        assert_eq!(def.reserved & (1 << 6), 1 << 6);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_nb_clock_and_voltage() {
        let def = NbPStateDef {
            nb_fid: 22,
            nb_did: 0,
            nb_vid: 46,
            ..Default::default()
        };
        assert_eq!(def.nb_clock_mhz(), 5200);
        assert_eq!(def.voltage_mv(), 975.0);

        let halved = NbPStateDef { nb_did: 1, ..def };
        assert_eq!(halved.nb_clock_mhz(), 2600);
    }
}
