//! Generic register abstractions for type-safe P-state programming

/// Raw storage width of a register (32-bit PCI config dwords or 64-bit MSRs)
pub trait RawValue: Copy + Eq + std::fmt::Debug + Into<u64> {
    /// Width of the register in bits
    const BITS: u32;

    /// Narrow a 64-bit transport value to this width, `None` if bits would be lost
    fn from_u64(value: u64) -> Option<Self>;
}

impl RawValue for u32 {
    const BITS: u32 = 32;

    fn from_u64(value: u64) -> Option<Self> {
        u32::try_from(value).ok()
    }
}

impl RawValue for u64 {
    const BITS: u32 = 64;

    fn from_u64(value: u64) -> Option<Self> {
        Some(value)
    }
}

/// Trait for register layouts that can be converted to/from raw register values
///
/// Implementations keep every bit they do not model in a reserved field, so
/// `from_raw(x).to_raw() == x` holds for every raw value `x`.
///
/// # Example
///
/// ```ignore
/// use k15ctl_raw::register::RegisterLayout;
///
/// #[derive(Debug, Default)]
/// struct MyControl {
///     enable: bool,
///     reserved: u32,
/// }
///
/// impl RegisterLayout for MyControl {
///     type Raw = u32;
///
///     fn to_raw(&self) -> u32 {
///         (self.reserved & !1) | u32::from(self.enable)
///     }
///
///     fn from_raw(value: u32) -> Self {
///         Self {
///             enable: (value & 1) != 0,
///             reserved: value & !1,
///         }
///     }
/// }
/// ```
pub trait RegisterLayout: Sized {
    /// Raw register width
    type Raw: RawValue;

    /// Convert this register layout to a raw register value
    fn to_raw(&self) -> Self::Raw;

    /// Parse a raw register value into this register layout
    fn from_raw(value: Self::Raw) -> Self;

    /// Validate that the field values fit their bit widths
    ///
    /// Returns `Ok(())` if valid, or an error message if invalid.
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

/// Extract `width` bits starting at `shift`
#[inline]
pub const fn field(value: u64, shift: u32, width: u32) -> u64 {
    (value >> shift) & mask(width)
}

/// Place the low `width` bits of `value` at `shift`
#[inline]
pub const fn place(value: u64, shift: u32, width: u32) -> u64 {
    (value & mask(width)) << shift
}

/// Low `width` bits set
#[inline]
pub const fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A hardware register with address and typed layout
///
/// The address is an MSR number for core registers and a configuration space
/// offset for northbridge registers.
///
/// # Example
///
/// ```ignore
/// use k15ctl_raw::register::Register;
/// use k15ctl_raw::current_arch::pstate::PStateDef;
///
/// let reg = Register::<PStateDef>::from_raw(0xC001_0064, 0x8000_0000_0000_0C10);
/// assert_eq!(reg.layout.cpu_fid, 0x10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register<T: RegisterLayout> {
    /// Register address
    pub address: u64,
    /// Typed register layout
    pub layout: T,
}

impl<T: RegisterLayout> Register<T> {
    /// Create a new register with the given address and layout
    pub fn new(address: u64, layout: T) -> Self {
        Self { address, layout }
    }

    /// Decode a register read from `address`
    pub fn from_raw(address: u64, value: T::Raw) -> Self {
        Self {
            address,
            layout: T::from_raw(value),
        }
    }

    /// Validate the register layout
    pub fn validate(&self) -> Result<(), &'static str> {
        self.layout.validate()
    }

    /// Get the raw value to write back for this register
    pub fn to_raw(&self) -> T::Raw {
        self.layout.to_raw()
    }

    /// Replace the layout while keeping the address
    pub fn with_layout(self, layout: T) -> Self {
        Self {
            address: self.address,
            layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_helpers() {
        assert_eq!(mask(0), 0);
        assert_eq!(mask(7), 0x7F);
        assert_eq!(mask(64), u64::MAX);
        assert_eq!(field(0xABCD, 4, 8), 0xBC);
        assert_eq!(place(0x1FF, 4, 8), 0xFF0);
    }

    #[test]
    fn test_raw_value_narrowing() {
        assert_eq!(<u32 as RawValue>::from_u64(0xFFFF_FFFF), Some(0xFFFF_FFFF));
        assert_eq!(<u32 as RawValue>::from_u64(0x1_0000_0000), None);
        assert_eq!(<u64 as RawValue>::from_u64(u64::MAX), Some(u64::MAX));
    }
}
