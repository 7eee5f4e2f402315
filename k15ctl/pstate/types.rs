use k15ctl_raw::current_arch::nb::NbPStateDef;
use k15ctl_raw::current_arch::pstate::PStateDef;
use k15ctl_raw::current_arch::{NB_PSTATE_NUM, PSTATE_NUM};
use k15ctl_raw::{Register, RegisterLayout};

use crate::config::PlatformConfig;
use crate::error::{K15Error, Result, Warning};

/// A P-state slot as named by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PStateSelection {
    pub index: u8,
    pub boosted: bool,
}

impl PStateSelection {
    pub fn ordinary(index: u8) -> Self {
        Self {
            index,
            boosted: false,
        }
    }

    pub fn boosted(index: u8) -> Self {
        Self {
            index,
            boosted: true,
        }
    }

    /// Combine `--p` and `--bp`; naming both is rejected
    pub fn from_args(pstate: Option<u8>, boosted: Option<u8>) -> Result<Option<Self>> {
        match (pstate, boosted) {
            (Some(_), Some(_)) => Err(K15Error::ConflictingSelection),
            (Some(index), None) => Ok(Some(Self::ordinary(index))),
            (None, Some(index)) => Ok(Some(Self::boosted(index))),
            (None, None) => Ok(None),
        }
    }

    /// Position in the eight-entry P-state table (MSR offset from the base)
    pub fn slot(&self, platform: &PlatformConfig) -> Result<usize> {
        let index = usize::from(self.index);
        let boosted = usize::from(platform.boosted_states);

        if self.boosted {
            if index >= boosted {
                return Err(K15Error::InvalidSlot(format!(
                    "Boosted P-State {index} does not exist ({boosted} boosted states)"
                )));
            }
            Ok(index)
        } else {
            if index + boosted >= PSTATE_NUM {
                return Err(K15Error::InvalidSlot(format!(
                    "P-State {index} does not exist ({} ordinary states)",
                    platform.ordinary_states()
                )));
            }
            Ok(index + boosted)
        }
    }
}

/// How a table row is labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLabel {
    Boosted(u8),
    Ordinary(u8),
    Northbridge(u8),
}

impl SlotLabel {
    /// Label of absolute P-state table position `slot`
    pub fn for_slot(slot: usize, platform: &PlatformConfig) -> Self {
        let boosted = usize::from(platform.boosted_states);
        if slot < boosted {
            SlotLabel::Boosted(slot as u8)
        } else {
            SlotLabel::Ordinary((slot - boosted) as u8)
        }
    }
}

impl std::fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotLabel::Boosted(n) => write!(f, "Boosted P-State {n}"),
            SlotLabel::Ordinary(n) => write!(f, "P-State {n}"),
            SlotLabel::Northbridge(n) => write!(f, "NB P-State {n}"),
        }
    }
}

/// Sparse per-core P-state update: `None` leaves a field unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuOverrides {
    pub cpu_fid: Option<u8>,
    pub cpu_did: Option<u8>,
    pub cpu_vid: Option<u8>,
    pub nb_pstate: Option<u8>,
    pub pstate_en: Option<bool>,
    /// Target power dissipation in mW, resolved by the power solver
    pub power_mw: Option<f64>,
}

impl CpuOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite every present field except power dissipation
    ///
    /// Values are truncated to their field width exactly as the register
    /// would store them; reserved bits are untouched.
    pub fn apply(&self, def: PStateDef) -> PStateDef {
        let updated = PStateDef {
            cpu_fid: self.cpu_fid.unwrap_or(def.cpu_fid),
            cpu_did: self.cpu_did.unwrap_or(def.cpu_did),
            cpu_vid: self.cpu_vid.unwrap_or(def.cpu_vid),
            nb_pstate: self.nb_pstate.unwrap_or(def.nb_pstate),
            pstate_en: self.pstate_en.unwrap_or(def.pstate_en),
            ..def
        };
        PStateDef::from_raw(updated.to_raw())
    }
}

/// Sparse northbridge P-state update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NbOverrides {
    pub nb_fid: Option<u8>,
    pub nb_did: Option<u8>,
    pub nb_vid: Option<u8>,
    pub nb_pstate_en: Option<bool>,
}

impl NbOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, def: NbPStateDef) -> NbPStateDef {
        let updated = NbPStateDef {
            nb_fid: self.nb_fid.unwrap_or(def.nb_fid),
            nb_did: self.nb_did.unwrap_or(def.nb_did),
            nb_vid: self.nb_vid.unwrap_or(def.nb_vid),
            nb_pstate_en: self.nb_pstate_en.unwrap_or(def.nb_pstate_en),
            ..def
        };
        NbPStateDef::from_raw(updated.to_raw())
    }
}

/// Derived figures of a core P-state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PStateQuantities {
    pub core_clock_mhz: u32,
    pub voltage_mv: f64,
    pub current_amps: f64,
    pub power_mw: f64,
}

impl From<&PStateDef> for PStateQuantities {
    fn from(def: &PStateDef) -> Self {
        Self {
            core_clock_mhz: def.core_clock_mhz(),
            voltage_mv: def.voltage_mv(),
            current_amps: def.current_amps(),
            power_mw: def.power_mw(),
        }
    }
}

/// Derived figures of a northbridge P-state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NbQuantities {
    pub nb_clock_mhz: u32,
    pub voltage_mv: f64,
}

impl From<&NbPStateDef> for NbQuantities {
    fn from(def: &NbPStateDef) -> Self {
        Self {
            nb_clock_mhz: def.nb_clock_mhz(),
            voltage_mv: def.voltage_mv(),
        }
    }
}

/// One row of a core's P-state table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuSlotReport {
    pub label: SlotLabel,
    pub register: Register<PStateDef>,
    pub quantities: PStateQuantities,
}

impl CpuSlotReport {
    pub fn new(label: SlotLabel, register: Register<PStateDef>) -> Self {
        Self {
            label,
            quantities: PStateQuantities::from(&register.layout),
            register,
        }
    }
}

/// One row of a northbridge's P-state table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NbSlotReport {
    pub label: SlotLabel,
    pub register: Register<NbPStateDef>,
    pub quantities: NbQuantities,
}

impl NbSlotReport {
    pub fn new(slot: u8, register: Register<NbPStateDef>) -> Self {
        Self {
            label: SlotLabel::Northbridge(slot),
            quantities: NbQuantities::from(&register.layout),
            register,
        }
    }
}

/// Result of a core P-state update, previewed or committed
#[derive(Debug, Clone, PartialEq)]
pub struct CpuUpdate {
    pub core: u32,
    /// Absolute position in the P-state table
    pub slot: usize,
    pub original: Register<PStateDef>,
    pub candidate: CpuSlotReport,
    pub warnings: Vec<Warning>,
    pub committed: bool,
}

/// Result of a northbridge P-state update, previewed or committed
#[derive(Debug, Clone, PartialEq)]
pub struct NbUpdate {
    pub node: u32,
    pub slot: u8,
    pub original: Register<NbPStateDef>,
    pub candidate: NbSlotReport,
    pub committed: bool,
}

/// Number of northbridge P-state slots as `u8`
pub const NB_SLOTS: u8 = NB_PSTATE_NUM as u8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_conflict() {
        assert!(matches!(
            PStateSelection::from_args(Some(0), Some(1)),
            Err(K15Error::ConflictingSelection)
        ));
        assert_eq!(
            PStateSelection::from_args(Some(2), None).unwrap(),
            Some(PStateSelection::ordinary(2))
        );
        assert_eq!(
            PStateSelection::from_args(None, Some(1)).unwrap(),
            Some(PStateSelection::boosted(1))
        );
        assert_eq!(PStateSelection::from_args(None, None).unwrap(), None);
    }

    #[test]
    fn test_selection_slot_offsets() {
        let platform = PlatformConfig::new(2, 0, 0);

        assert_eq!(PStateSelection::boosted(0).slot(&platform).unwrap(), 0);
        assert_eq!(PStateSelection::boosted(1).slot(&platform).unwrap(), 1);
        assert_eq!(PStateSelection::ordinary(0).slot(&platform).unwrap(), 2);
        assert_eq!(PStateSelection::ordinary(5).slot(&platform).unwrap(), 7);

        assert!(PStateSelection::boosted(2).slot(&platform).is_err());
        assert!(PStateSelection::ordinary(6).slot(&platform).is_err());
    }

    #[test]
    fn test_selection_without_boost() {
        let platform = PlatformConfig::new(0, 0, 0);

        assert!(PStateSelection::boosted(0).slot(&platform).is_err());
        assert_eq!(PStateSelection::ordinary(7).slot(&platform).unwrap(), 7);
    }

    #[test]
    fn test_slot_labels() {
        let platform = PlatformConfig::new(1, 0, 0);

        assert_eq!(SlotLabel::for_slot(0, &platform), SlotLabel::Boosted(0));
        assert_eq!(SlotLabel::for_slot(1, &platform), SlotLabel::Ordinary(0));
        assert_eq!(SlotLabel::for_slot(7, &platform).to_string(), "P-State 6");
        assert_eq!(SlotLabel::Boosted(0).to_string(), "Boosted P-State 0");
        assert_eq!(SlotLabel::Northbridge(1).to_string(), "NB P-State 1");
    }

    #[test]
    fn test_cpu_override_only_fid() {
        let raw = 0xA5A5_0189_5A40_2C10_u64;
        let def = PStateDef::from_raw(raw);
        let overrides = CpuOverrides {
            cpu_fid: Some(22),
            ..Default::default()
        };

        let updated = overrides.apply(def);

        assert_eq!(updated.cpu_fid, 22);
        assert_eq!(PStateDef { cpu_fid: def.cpu_fid, ..updated }, def);
        assert_eq!(updated.to_raw() & !0x3F, raw & !0x3F);
    }

    #[test]
    fn test_cpu_override_empty_is_identity() {
        let def = PStateDef::from_raw(0x8000_0000_0040_2C10);
        assert!(CpuOverrides::default().is_empty());
        assert_eq!(CpuOverrides::default().apply(def), def);
    }

    #[test]
    fn test_cpu_override_truncates_to_field_width() {
        let def = PStateDef::default();
        let overrides = CpuOverrides {
            cpu_did: Some(9),
            nb_pstate: Some(3),
            ..Default::default()
        };

        let updated = overrides.apply(def);
        assert_eq!(updated.cpu_did, 1);
        assert_eq!(updated.nb_pstate, 1);
        assert_eq!(updated.reserved, 0);
    }

    #[test]
    fn test_nb_override() {
        let def = NbPStateDef::from_raw(0xFFFF_0000);
        let overrides = NbOverrides {
            nb_vid: Some(46),
            nb_pstate_en: Some(true),
            ..Default::default()
        };

        let updated = overrides.apply(def);
        assert_eq!(updated.nb_vid, 46);
        assert!(updated.nb_pstate_en);
        assert_eq!(updated.nb_fid, def.nb_fid);
        assert_eq!(updated.reserved, def.reserved);
    }

    #[test]
    fn test_quantities_from_def() {
        let def = PStateDef {
            cpu_fid: 16,
            cpu_vid: 0,
            idd_value: 100,
            idd_div: 1,
            ..Default::default()
        };
        let q = PStateQuantities::from(&def);

        assert_eq!(q.core_clock_mhz, 3200);
        assert_eq!(q.voltage_mv, 1550.0);
        assert_eq!(q.current_amps, 10.0);
        assert_eq!(q.power_mw, 15500.0);
    }
}
