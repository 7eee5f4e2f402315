use std::path::PathBuf;

use k15ctl_raw::current_arch::{cofvid::CofVidStatus, cpb::CpbControl, msr, pci};
use k15ctl_raw::current_arch::{MAX_BOOST_STATES, PSTATE_NUM};
use k15ctl_raw::msr::MSR_DEVICE_ROOT;
use k15ctl_raw::pci::PCI_DEVICE_ROOT;

use crate::common::{Device, RegisterTransport};
use crate::error::{K15Error, Result};

/// Environment variable overriding the MSR device root
pub const MSR_ROOT_ENV: &str = "K15CTL_MSR_ROOT";

/// Environment variable overriding the PCI configuration space root
pub const PCI_ROOT_ENV: &str = "K15CTL_PCI_ROOT";

/// Where the hardware transport finds its device nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub msr_root: PathBuf,
    pub pci_root: PathBuf,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            msr_root: PathBuf::from(MSR_DEVICE_ROOT),
            pci_root: PathBuf::from(PCI_DEVICE_ROOT),
        }
    }
}

impl TransportConfig {
    /// Default roots, overridden by `K15CTL_MSR_ROOT` / `K15CTL_PCI_ROOT`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(root) = std::env::var_os(MSR_ROOT_ENV) {
            tracing::info!("Using MSR root {:?} from {}", root, MSR_ROOT_ENV);
            config.msr_root = PathBuf::from(root);
        }
        if let Some(root) = std::env::var_os(PCI_ROOT_ENV) {
            tracing::info!("Using PCI root {:?} from {}", root, PCI_ROOT_ENV);
            config.pci_root = PathBuf::from(root);
        }

        config
    }
}

/// Platform limits read once per run and passed into every operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Number of boosted P-states at the top of the P-state table
    pub boosted_states: u8,
    /// Highest VID (lowest voltage) accepted, 0 if not enforced
    pub min_vid: u8,
    /// Lowest VID (highest voltage) accepted, 0 if not enforced
    pub max_vid: u8,
}

impl PlatformConfig {
    pub fn new(boosted_states: u8, min_vid: u8, max_vid: u8) -> Self {
        Self {
            boosted_states: boosted_states.min(MAX_BOOST_STATES),
            min_vid,
            max_vid,
        }
    }

    pub fn from_registers(status: &CofVidStatus, cpb: &CpbControl) -> Self {
        Self::new(cpb.num_boost_states, status.min_vid, status.max_vid)
    }

    /// Read COF/VID status from core 0 and CPB control from node 0
    pub fn detect<T: RegisterTransport>(transport: &T) -> Result<Self> {
        let status = transport
            .read_register::<CofVidStatus>(Device::Core(0), msr::COFVID_STATUS)?
            .layout;
        let cpb = transport
            .read_register::<CpbControl>(
                Device::northbridge(0, pci::FUNC_MISC)?,
                pci::CPB_CTRL,
            )?
            .layout;

        let config = Self::from_registers(&status, &cpb);
        tracing::info!(
            "Platform: {} boosted P-states, minVid {}, maxVid {}",
            config.boosted_states,
            config.min_vid,
            config.max_vid
        );

        Ok(config)
    }

    /// Number of ordinary (non-boosted) P-states
    pub fn ordinary_states(&self) -> u8 {
        PSTATE_NUM as u8 - self.boosted_states
    }
}

/// Largest number of indices a single range expression may expand to
pub const MAX_RANGE_SPAN: u32 = 4096;

/// Parse range expressions like ["0-3", "5", "8,10"] into a sorted list
///
/// Supports single values, inclusive ranges, comma-separated lists and any
/// mix of them. Duplicates are removed.
pub fn parse_range_list(inputs: &[String]) -> Result<Vec<u32>> {
    let mut result = Vec::new();

    for input in inputs {
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((start, end)) = part.split_once('-') {
                let start = parse_index(start)?;
                let end = parse_index(end)?;
                if start > end {
                    return Err(K15Error::ParseError(format!(
                        "Range {part} is reversed"
                    )));
                }
                if end - start >= MAX_RANGE_SPAN {
                    return Err(K15Error::ParseError(format!(
                        "Range {part} spans more than {MAX_RANGE_SPAN} entries"
                    )));
                }
                result.extend(start..=end);
            } else {
                result.push(parse_index(part)?);
            }
        }
    }

    result.sort_unstable();
    result.dedup();

    if result.is_empty() {
        return Err(K15Error::ParseError("Empty selection".to_string()));
    }

    Ok(result)
}

fn parse_index(s: &str) -> Result<u32> {
    s.trim()
        .parse::<u32>()
        .map_err(|e| K15Error::ParseError(format!("Invalid index '{}': {e}", s.trim())))
}
