//! In-memory register transport for tests

use std::cell::Cell;
use std::collections::HashMap;
use std::io;

use k15ctl_raw::{MsrError, PciError};

use super::{Device, RegisterTransport};
use crate::error::{K15Error, Result};

/// Register map that records every access
#[derive(Debug, Default)]
pub struct MockTransport {
    registers: HashMap<(Device, u64), u64>,
    writes: Vec<(Device, u64, u64)>,
    reads: Cell<usize>,
    fail_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every write fails with an I/O error
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn set(&mut self, device: Device, address: u64, value: u64) {
        self.registers.insert((device, address), value);
    }

    pub fn get(&self, device: Device, address: u64) -> Option<u64> {
        self.registers.get(&(device, address)).copied()
    }

    pub fn writes(&self) -> &[(Device, u64, u64)] {
        &self.writes
    }

    pub fn read_count(&self) -> usize {
        self.reads.get()
    }
}

fn io_failure(device: Device, address: u64, kind: io::ErrorKind, write: bool) -> K15Error {
    let source = io::Error::from(kind);
    match (device, write) {
        (Device::Core(cpu), false) => MsrError::ReadFailed {
            cpu,
            msr: address,
            source,
        }
        .into(),
        (Device::Core(cpu), true) => MsrError::WriteFailed {
            cpu,
            msr: address,
            source,
        }
        .into(),
        (Device::Pci(function), false) => PciError::ReadFailed {
            device: function,
            offset: address,
            source,
        }
        .into(),
        (Device::Pci(function), true) => PciError::WriteFailed {
            device: function,
            offset: address,
            source,
        }
        .into(),
    }
}

impl RegisterTransport for MockTransport {
    fn read(&self, device: Device, address: u64) -> Result<u64> {
        self.reads.set(self.reads.get() + 1);
        self.get(device, address)
            .ok_or_else(|| io_failure(device, address, io::ErrorKind::NotFound, false))
    }

    fn write(&mut self, device: Device, address: u64, value: u64) -> Result<()> {
        if self.fail_writes {
            return Err(io_failure(device, address, io::ErrorKind::PermissionDenied, true));
        }
        self.writes.push((device, address, value));
        self.registers.insert((device, address), value);
        Ok(())
    }
}
