use std::io;
use thiserror::Error;

use k15ctl_raw::{MsrError, PciError};

/// Fatal errors: any of these aborts the run
#[derive(Error, Debug)]
pub enum K15Error {
    #[error("MSR operation failed: {0}")]
    MsrError(#[from] MsrError),

    #[error("PCI operation failed: {0}")]
    PciError(#[from] PciError),

    #[error("Specify boosted P-State or P-State. NOT both.")]
    ConflictingSelection,

    #[error("Invalid P-state slot: {0}")]
    InvalidSlot(String),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[error("Invalid register layout: {0}")]
    InvalidLayout(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, K15Error>;

/// Non-fatal conditions, reported per device/slot while processing continues
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("Could not set power dissipation {target_mw:.2} mW. Set nearest value {achieved_mw:.2} mW")]
    ApproximationOnly { target_mw: f64, achieved_mw: f64 },

    #[error("CpuVid {requested} is out of range. Using {bound} {applied}")]
    OutOfRangeVoltage {
        requested: u8,
        applied: u8,
        bound: VidBound,
    },
}

/// Which platform voltage limit a clamped VID was pulled back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VidBound {
    /// `MinVid`: lowest allowed voltage, highest allowed VID
    MinVid,
    /// `MaxVid`: highest allowed voltage, lowest allowed VID
    MaxVid,
}

impl std::fmt::Display for VidBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VidBound::MinVid => f.write_str("minVid"),
            VidBound::MaxVid => f.write_str("maxVid"),
        }
    }
}
