//! Positioned access to `/dev/cpu/<n>/msr`
//!
//! The MSR address doubles as the file offset, so each access is a single
//! 8-byte `pread`/`pwrite` and no seek state is shared between calls.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::{FileExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

/// Default location of the per-CPU MSR device nodes
pub const MSR_DEVICE_ROOT: &str = "/dev/cpu";

pub type Result<T> = std::result::Result<T, MsrError>;

#[derive(Debug, thiserror::Error)]
pub enum MsrError {
    #[error("Cannot open {} for CPU {cpu} (msr module loaded? running as root?): {source}", path.display())]
    OpenFailed {
        cpu: u32,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CPU {cpu}: reading MSR 0x{msr:08X} failed: {source}")]
    ReadFailed {
        cpu: u32,
        msr: u64,
        source: std::io::Error,
    },

    #[error("CPU {cpu}: writing MSR 0x{msr:08X} failed: {source}")]
    WriteFailed {
        cpu: u32,
        msr: u64,
        source: std::io::Error,
    },
}

fn device_path(root: &Path, cpu: u32) -> PathBuf {
    root.join(cpu.to_string()).join("msr")
}

/// Read MSR `msr` of logical CPU `cpu`
///
/// # Errors
///
/// Fails when the device node cannot be opened (missing `msr` module, no
/// CAP_SYS_RAWIO) or the processor rejects the address.
pub fn read_msr(cpu: u32, msr: u64) -> Result<u64> {
    read_msr_at(Path::new(MSR_DEVICE_ROOT), cpu, msr)
}

/// [`read_msr`] below an alternative device root
pub fn read_msr_at(root: &Path, cpu: u32, msr: u64) -> Result<u64> {
    let path = device_path(root, cpu);
    let file = File::open(&path).map_err(|source| MsrError::OpenFailed { cpu, path, source })?;

    let mut bytes = [0u8; 8];
    file.read_exact_at(&mut bytes, msr)
        .map_err(|source| MsrError::ReadFailed { cpu, msr, source })?;

    Ok(u64::from_le_bytes(bytes))
}

/// Write `value` to MSR `msr` of logical CPU `cpu`
///
/// A bad P-state definition can hang the machine; callers go through
/// `RegisterLayout::validate()` first.
pub fn write_msr(cpu: u32, msr: u64, value: u64) -> Result<()> {
    write_msr_at(Path::new(MSR_DEVICE_ROOT), cpu, msr, value)
}

/// [`write_msr`] below an alternative device root
pub fn write_msr_at(root: &Path, cpu: u32, msr: u64, value: u64) -> Result<()> {
    let path = device_path(root, cpu);
    let file = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(&path)
        .map_err(|source| MsrError::OpenFailed { cpu, path, source })?;

    file.write_all_at(&value.to_le_bytes(), msr)
        .map_err(|source| MsrError::WriteFailed { cpu, msr, source })
}
