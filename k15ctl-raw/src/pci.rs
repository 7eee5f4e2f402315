//! PCI configuration space read/write primitives
//!
//! Northbridge registers live in the configuration space of the
//! "processor function" devices at bus 0, device 0x18 + node. Linux exposes
//! that space as `/proc/bus/pci/<bus>/<device>.<function>`.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::{FileExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

/// Default location of the procfs PCI configuration space files
pub const PCI_DEVICE_ROOT: &str = "/proc/bus/pci";

pub type Result<T> = std::result::Result<T, PciError>;

/// Bus/device/function triple of a PCI configuration space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PciFunction {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciFunction {
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }

    /// Path of the configuration space file below `root`
    pub fn path(&self, root: &Path) -> PathBuf {
        root.join(format!("{:02x}", self.bus))
            .join(format!("{:02x}.{:x}", self.device, self.function))
    }
}

impl std::fmt::Display for PciFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}:{:02x}.{:x}", self.bus, self.device, self.function)
    }
}

/// Errors that can occur during PCI configuration space operations
#[derive(Debug, thiserror::Error)]
pub enum PciError {
    #[error("Failed to open PCI device {device}: {source}")]
    OpenFailed {
        device: PciFunction,
        source: std::io::Error,
    },

    #[error("Failed to read offset 0x{offset:X} of PCI device {device}: {source}")]
    ReadFailed {
        device: PciFunction,
        offset: u64,
        source: std::io::Error,
    },

    #[error("Failed to write offset 0x{offset:X} of PCI device {device}: {source}")]
    WriteFailed {
        device: PciFunction,
        offset: u64,
        source: std::io::Error,
    },

    #[error("Value 0x{value:X} does not fit the 32-bit register at offset 0x{offset:X} of PCI device {device}")]
    ValueTooWide {
        device: PciFunction,
        offset: u64,
        value: u64,
    },
}

/// Read a 32-bit dword from PCI configuration space
pub fn read_pci32(device: PciFunction, offset: u64) -> Result<u32> {
    read_pci32_at(Path::new(PCI_DEVICE_ROOT), device, offset)
}

/// Read a 32-bit dword from a configuration space file below `root`
pub fn read_pci32_at(root: &Path, device: PciFunction, offset: u64) -> Result<u32> {
    let file =
        File::open(device.path(root)).map_err(|e| PciError::OpenFailed { device, source: e })?;

    let mut buffer = [0u8; 4];
    file.read_exact_at(&mut buffer, offset)
        .map_err(|e| PciError::ReadFailed {
            device,
            offset,
            source: e,
        })?;

    Ok(u32::from_le_bytes(buffer))
}

/// Write a 32-bit dword to PCI configuration space
pub fn write_pci32(device: PciFunction, offset: u64, value: u32) -> Result<()> {
    write_pci32_at(Path::new(PCI_DEVICE_ROOT), device, offset, value)
}

/// Write a 32-bit dword to a configuration space file below `root`
pub fn write_pci32_at(root: &Path, device: PciFunction, offset: u64, value: u32) -> Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(device.path(root))
        .map_err(|e| PciError::OpenFailed { device, source: e })?;

    file.write_all_at(&value.to_le_bytes(), offset)
        .map_err(|e| PciError::WriteFailed {
            device,
            offset,
            source: e,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pci_path_format() {
        let f5 = PciFunction::new(0, 0x18, 5);
        assert_eq!(
            f5.path(Path::new(PCI_DEVICE_ROOT)),
            PathBuf::from("/proc/bus/pci/00/18.5")
        );
        assert_eq!(f5.to_string(), "00:18.5");

        let node3 = PciFunction::new(0, 0x1b, 4);
        assert_eq!(
            node3.path(Path::new("/tmp/pci")),
            PathBuf::from("/tmp/pci/00/1b.4")
        );
    }

    #[test]
    fn test_pci_write_then_read() {
        let root = std::env::temp_dir().join(format!("k15ctl-pci-rw-{}", std::process::id()));
        let device = PciFunction::new(0, 0x18, 5);
        std::fs::create_dir_all(root.join("00")).unwrap();
        std::fs::write(device.path(&root), vec![0u8; 0x200]).unwrap();

        write_pci32_at(&root, device, 0x164, 0xDEAD_BEEF).unwrap();
        assert_eq!(read_pci32_at(&root, device, 0x164).unwrap(), 0xDEAD_BEEF);
        assert_eq!(read_pci32_at(&root, device, 0x160).unwrap(), 0);

        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_pci_error_display() {
        let err = PciError::ValueTooWide {
            device: PciFunction::new(0, 0x18, 5),
            offset: 0x160,
            value: 0x1_0000_0000,
        };
        assert!(err.to_string().contains("does not fit"));
        assert!(err.to_string().contains("00:18.5"));
    }
}
