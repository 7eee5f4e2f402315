use k15ctl_raw::current_arch::pci::NODE0_DEVICE;
use k15ctl_raw::{msr, pci, PciError, PciFunction, RawValue, Register, RegisterLayout};

use crate::config::TransportConfig;
use crate::error::{K15Error, Result};

/// Highest northbridge node addressable on bus 0 (devices 0x18-0x1F)
pub const MAX_NB_NODE: u32 = 7;

/// Target of a register access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    /// MSR space of a logical CPU
    Core(u32),
    /// Configuration space of a PCI function
    Pci(PciFunction),
}

impl Device {
    /// Function `function` of northbridge node `node`
    pub fn northbridge(node: u32, function: u8) -> Result<Self> {
        if node > MAX_NB_NODE {
            return Err(K15Error::InvalidDevice(format!(
                "Northbridge {node} out of range (0-{MAX_NB_NODE})"
            )));
        }
        Ok(Device::Pci(PciFunction::new(
            0,
            NODE0_DEVICE + node as u8,
            function,
        )))
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Core(cpu) => write!(f, "CPU{cpu}"),
            Device::Pci(function) => write!(f, "PCI {function}"),
        }
    }
}

/// Blocking register read/write primitives
///
/// Values travel as `u64`; 32-bit registers are zero-extended on read and
/// must fit 32 bits on write.
pub trait RegisterTransport {
    fn read(&self, device: Device, address: u64) -> Result<u64>;

    fn write(&mut self, device: Device, address: u64, value: u64) -> Result<()>;

    /// Read and decode a typed register
    fn read_register<T: RegisterLayout>(&self, device: Device, address: u64) -> Result<Register<T>> {
        let value = self.read(device, address)?;
        let raw = <T::Raw as RawValue>::from_u64(value).ok_or_else(|| {
            K15Error::InvalidLayout("register value wider than its layout")
        })?;
        Ok(Register::from_raw(address, raw))
    }

    /// Validate, encode and write a typed register back to its address
    fn write_register<T: RegisterLayout>(&mut self, device: Device, register: &Register<T>) -> Result<()> {
        register.validate().map_err(K15Error::InvalidLayout)?;
        self.write(device, register.address, register.to_raw().into())
    }
}

/// Transport over `/dev/cpu/<n>/msr` and `/proc/bus/pci`
#[derive(Debug, Clone, Default)]
pub struct HardwareTransport {
    config: TransportConfig,
}

impl HardwareTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl RegisterTransport for HardwareTransport {
    fn read(&self, device: Device, address: u64) -> Result<u64> {
        let value = match device {
            Device::Core(cpu) => msr::read_msr_at(&self.config.msr_root, cpu, address)?,
            Device::Pci(function) => {
                u64::from(pci::read_pci32_at(&self.config.pci_root, function, address)?)
            }
        };

        tracing::debug!("{} read 0x{:08x} = 0x{:016x}", device, address, value);
        Ok(value)
    }

    fn write(&mut self, device: Device, address: u64, value: u64) -> Result<()> {
        tracing::debug!("{} write 0x{:08x} = 0x{:016x}", device, address, value);

        match device {
            Device::Core(cpu) => msr::write_msr_at(&self.config.msr_root, cpu, address, value)?,
            Device::Pci(function) => {
                let dword = u32::try_from(value).map_err(|_| PciError::ValueTooWide {
                    device: function,
                    offset: address,
                    value,
                })?;
                pci::write_pci32_at(&self.config.pci_root, function, address, dword)?
            }
        }

        Ok(())
    }
}
