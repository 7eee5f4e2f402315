use k15ctl_raw::current_arch::nb::NbPStateDef;
use k15ctl_raw::current_arch::pci::{FUNC_NB_PSTATE, NB_PSTATES};
use k15ctl_raw::current_arch::pstate::PStateDef;
use k15ctl_raw::current_arch::{msr, PSTATE_NUM};

use crate::common::{Device, RegisterTransport};
use crate::config::PlatformConfig;
use crate::error::{K15Error, Result};
use crate::pstate::clamp::clamp_cpu_vid;
use crate::pstate::solver::solve_power_target;
use crate::pstate::types::{
    CpuOverrides, CpuSlotReport, CpuUpdate, NbOverrides, NbSlotReport, NbUpdate,
    PStateSelection, SlotLabel, NB_SLOTS,
};

/// Reads, previews and rewrites P-state tables through a register transport
///
/// Every call is a fresh decode-modify-encode cycle; nothing read from a
/// register is kept between calls.
pub struct PStateController<T: RegisterTransport> {
    transport: T,
    platform: PlatformConfig,
}

impl<T: RegisterTransport> PStateController<T> {
    pub fn new(transport: T, platform: PlatformConfig) -> Self {
        Self {
            transport,
            platform,
        }
    }

    /// Build a controller with platform limits read from the hardware
    pub fn detect(transport: T) -> Result<Self> {
        let platform = PlatformConfig::detect(&transport)?;
        Ok(Self::new(transport, platform))
    }

    pub fn platform(&self) -> &PlatformConfig {
        &self.platform
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn pstate_address(slot: usize) -> u64 {
        msr::PSTATE_DEF_BASE + slot as u64
    }

    fn nb_address(slot: u8) -> Result<u64> {
        NB_PSTATES.get(usize::from(slot)).copied().ok_or_else(|| {
            K15Error::InvalidSlot(format!(
                "NB P-State {slot} does not exist ({NB_SLOTS} northbridge states)"
            ))
        })
    }

    /// All eight P-state slots of `core`, boosted slots first
    pub fn inspect(&self, core: u32) -> Result<Vec<CpuSlotReport>> {
        (0..PSTATE_NUM)
            .map(|slot| -> Result<CpuSlotReport> {
                let register = self
                    .transport
                    .read_register::<PStateDef>(Device::Core(core), Self::pstate_address(slot))?;
                Ok(CpuSlotReport::new(
                    SlotLabel::for_slot(slot, &self.platform),
                    register,
                ))
            })
            .collect()
    }

    /// Both northbridge P-state slots of `node`
    pub fn inspect_nb(&self, node: u32) -> Result<Vec<NbSlotReport>> {
        let device = Device::northbridge(node, FUNC_NB_PSTATE)?;

        (0..NB_SLOTS)
            .map(|slot| -> Result<NbSlotReport> {
                let register = self
                    .transport
                    .read_register::<NbPStateDef>(device, Self::nb_address(slot)?)?;
                Ok(NbSlotReport::new(slot, register))
            })
            .collect()
    }

    /// Apply `overrides` to one P-state of `core`
    ///
    /// The requested VID is clamped to the platform limits before it is
    /// applied, and a power target is solved against the resulting VID. With
    /// `dry_run` the candidate is returned without touching the register.
    pub fn apply_cpu_update(
        &mut self,
        core: u32,
        selection: PStateSelection,
        overrides: &CpuOverrides,
        dry_run: bool,
    ) -> Result<CpuUpdate> {
        let slot = selection.slot(&self.platform)?;
        let device = Device::Core(core);
        let original = self
            .transport
            .read_register::<PStateDef>(device, Self::pstate_address(slot))?;

        let mut warnings = Vec::new();
        let mut overrides = *overrides;

        if let Some(requested) = overrides.cpu_vid {
            let (vid, warning) = clamp_cpu_vid(requested, &self.platform);
            overrides.cpu_vid = Some(vid);
            warnings.extend(warning);
        }

        let mut candidate = overrides.apply(original.layout);

        if let Some(target_mw) = overrides.power_mw {
            let matched = solve_power_target(&candidate, target_mw);
            candidate = matched.apply(candidate);
            warnings.extend(matched.warning(target_mw));
        }

        let register = original.with_layout(candidate);
        let label = SlotLabel::for_slot(slot, &self.platform);

        for warning in &warnings {
            tracing::debug!("CPU{core} {label}: {warning}");
        }

        if dry_run {
            tracing::debug!("CPU{core} {label}: dry run, not writing 0x{:016x}", register.to_raw());
        } else {
            self.transport.write_register(device, &register)?;
            tracing::info!(
                "CPU{core} {label}: wrote 0x{:016x} (was 0x{:016x})",
                register.to_raw(),
                original.to_raw()
            );
        }

        Ok(CpuUpdate {
            core,
            slot,
            original,
            candidate: CpuSlotReport::new(label, register),
            warnings,
            committed: !dry_run,
        })
    }

    /// Apply `overrides` to northbridge P-state `slot` of `node`
    pub fn apply_nb_update(
        &mut self,
        node: u32,
        slot: u8,
        overrides: &NbOverrides,
        dry_run: bool,
    ) -> Result<NbUpdate> {
        let address = Self::nb_address(slot)?;
        let device = Device::northbridge(node, FUNC_NB_PSTATE)?;
        let original = self.transport.read_register::<NbPStateDef>(device, address)?;

        let register = original.with_layout(overrides.apply(original.layout));

        if dry_run {
            tracing::debug!("NB{node} P-State {slot}: dry run, not writing 0x{:08x}", register.to_raw());
        } else {
            self.transport.write_register(device, &register)?;
            tracing::info!(
                "NB{node} P-State {slot}: wrote 0x{:08x} (was 0x{:08x})",
                register.to_raw(),
                original.to_raw()
            );
        }

        Ok(NbUpdate {
            node,
            slot,
            original,
            candidate: NbSlotReport::new(slot, register),
            committed: !dry_run,
        })
    }
}
