//! COF/VID Status register (MSRC001_0071)
//!
//! Read-only snapshot of the current operating point together with the
//! voltage and frequency limits the platform enforces.

use crate::register::{field, mask, place, RegisterLayout};

const CUR_CPU_FID: (u32, u32) = (0, 6);
const CUR_CPU_DID: (u32, u32) = (6, 3);
const CUR_CPU_VID: (u32, u32) = (9, 7);
const CUR_PSTATE: (u32, u32) = (16, 3);
const NB_PSTATE_DIS: (u32, u32) = (23, 1);
const CUR_NB_VID: (u32, u32) = (25, 7);
const STARTUP_PSTATE: (u32, u32) = (32, 3);
const MAX_VID: (u32, u32) = (35, 7);
const MIN_VID: (u32, u32) = (42, 7);
const MAX_CPU_COF: (u32, u32) = (49, 6);
const CUR_PSTATE_LIMIT: (u32, u32) = (56, 3);
const MAX_NB_COF: (u32, u32) = (59, 5);

const FIELDS: [(u32, u32); 12] = [
    CUR_CPU_FID,
    CUR_CPU_DID,
    CUR_CPU_VID,
    CUR_PSTATE,
    NB_PSTATE_DIS,
    CUR_NB_VID,
    STARTUP_PSTATE,
    MAX_VID,
    MIN_VID,
    MAX_CPU_COF,
    CUR_PSTATE_LIMIT,
    MAX_NB_COF,
];

const fn field_bits() -> u64 {
    let mut bits = 0;
    let mut i = 0;
    while i < FIELDS.len() {
        bits |= mask(FIELDS[i].1) << FIELDS[i].0;
        i += 1;
    }
    bits
}

const FIELD_BITS: u64 = field_bits();

/// COF/VID Status Register layout
///
/// ## Register Format
///
/// | Bits   | Field            | Description                          |
/// |--------|------------------|--------------------------------------|
/// | 0-5    | cur_cpu_fid      | Current core frequency ID            |
/// | 6-8    | cur_cpu_did      | Current core divisor ID              |
/// | 9-15   | cur_cpu_vid      | Current core voltage ID              |
/// | 16-18  | cur_pstate       | Current P-state                      |
/// | 19-22  | reserved         |                                      |
/// | 23     | nb_pstate_dis    | Northbridge P-states disabled        |
/// | 24     | reserved         |                                      |
/// | 25-31  | cur_nb_vid       | Current northbridge voltage ID       |
/// | 32-34  | startup_pstate   | P-state after reset                  |
/// | 35-41  | max_vid          | Highest voltage (lowest VID) allowed |
/// | 42-48  | min_vid          | Lowest voltage (highest VID) allowed |
/// | 49-54  | max_cpu_cof      | Maximum core COF / 100 MHz           |
/// | 55     | reserved         |                                      |
/// | 56-58  | cur_pstate_limit | Current P-state limit                |
/// | 59-63  | max_nb_cof       | Maximum northbridge COF / 200 MHz    |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CofVidStatus {
    pub cur_cpu_fid: u8,
    pub cur_cpu_did: u8,
    pub cur_cpu_vid: u8,
    pub cur_pstate: u8,
    pub nb_pstate_dis: bool,
    pub cur_nb_vid: u8,
    pub startup_pstate: u8,

    /// Lowest VID (highest voltage) the platform accepts, 0 if not enforced
    pub max_vid: u8,

    /// Highest VID (lowest voltage) the platform accepts, 0 if not enforced
    pub min_vid: u8,

    pub max_cpu_cof: u8,
    pub cur_pstate_limit: u8,
    pub max_nb_cof: u8,

    /// Reserved bits as read from hardware
    pub reserved: u64,
}

impl RegisterLayout for CofVidStatus {
    type Raw = u64;

    fn to_raw(&self) -> u64 {
        (self.reserved & !FIELD_BITS)
            | place(self.cur_cpu_fid.into(), CUR_CPU_FID.0, CUR_CPU_FID.1)
            | place(self.cur_cpu_did.into(), CUR_CPU_DID.0, CUR_CPU_DID.1)
            | place(self.cur_cpu_vid.into(), CUR_CPU_VID.0, CUR_CPU_VID.1)
            | place(self.cur_pstate.into(), CUR_PSTATE.0, CUR_PSTATE.1)
            | place(self.nb_pstate_dis.into(), NB_PSTATE_DIS.0, NB_PSTATE_DIS.1)
            | place(self.cur_nb_vid.into(), CUR_NB_VID.0, CUR_NB_VID.1)
            | place(self.startup_pstate.into(), STARTUP_PSTATE.0, STARTUP_PSTATE.1)
            | place(self.max_vid.into(), MAX_VID.0, MAX_VID.1)
            | place(self.min_vid.into(), MIN_VID.0, MIN_VID.1)
            | place(self.max_cpu_cof.into(), MAX_CPU_COF.0, MAX_CPU_COF.1)
            | place(self.cur_pstate_limit.into(), CUR_PSTATE_LIMIT.0, CUR_PSTATE_LIMIT.1)
            | place(self.max_nb_cof.into(), MAX_NB_COF.0, MAX_NB_COF.1)
    }

    fn from_raw(value: u64) -> Self {
        Self {
            cur_cpu_fid: field(value, CUR_CPU_FID.0, CUR_CPU_FID.1) as u8,
            cur_cpu_did: field(value, CUR_CPU_DID.0, CUR_CPU_DID.1) as u8,
            cur_cpu_vid: field(value, CUR_CPU_VID.0, CUR_CPU_VID.1) as u8,
            cur_pstate: field(value, CUR_PSTATE.0, CUR_PSTATE.1) as u8,
            nb_pstate_dis: field(value, NB_PSTATE_DIS.0, NB_PSTATE_DIS.1) != 0,
            cur_nb_vid: field(value, CUR_NB_VID.0, CUR_NB_VID.1) as u8,
            startup_pstate: field(value, STARTUP_PSTATE.0, STARTUP_PSTATE.1) as u8,
            max_vid: field(value, MAX_VID.0, MAX_VID.1) as u8,
            min_vid: field(value, MIN_VID.0, MIN_VID.1) as u8,
            max_cpu_cof: field(value, MAX_CPU_COF.0, MAX_CPU_COF.1) as u8,
            cur_pstate_limit: field(value, CUR_PSTATE_LIMIT.0, CUR_PSTATE_LIMIT.1) as u8,
            max_nb_cof: field(value, MAX_NB_COF.0, MAX_NB_COF.1) as u8,
            reserved: value & !FIELD_BITS,
        }
    }
}

impl CofVidStatus {
    /// Maximum core clock in MHz, `None` if the platform does not report one
    pub fn max_cpu_clock_mhz(&self) -> Option<u32> {
        (self.max_cpu_cof != 0).then(|| u32::from(self.max_cpu_cof) * 100)
    }

    /// Maximum northbridge clock in MHz, `None` if not reported
    pub fn max_nb_clock_mhz(&self) -> Option<u32> {
        (self.max_nb_cof != 0).then(|| u32::from(self.max_nb_cof) * 200)
    }
}
