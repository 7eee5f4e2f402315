//! Core Performance Boost Control (D18F4x15C)

use crate::register::{field, mask, place, RegisterLayout};

const NUM_BOOST_STATES: (u32, u32) = (2, 2);

const FIELD_BITS: u64 = mask(NUM_BOOST_STATES.1) << NUM_BOOST_STATES.0;

/// Core Performance Boost Control layout
///
/// Only the boosted P-state count is modelled; everything else is carried
/// through as reserved.
///
/// | Bits   | Field            | Description                        |
/// |--------|------------------|------------------------------------|
/// | 2-3    | num_boost_states | Number of boosted P-states (0-3)   |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpbControl {
    /// Number of boosted P-states at the top of the P-state table
    pub num_boost_states: u8,

    /// Reserved bits as read from hardware
    pub reserved: u32,
}

impl RegisterLayout for CpbControl {
    type Raw = u32;

    fn to_raw(&self) -> u32 {
        let value = (u64::from(self.reserved) & !FIELD_BITS)
            | place(
                self.num_boost_states.into(),
                NUM_BOOST_STATES.0,
                NUM_BOOST_STATES.1,
            );
        value as u32
    }

    fn from_raw(value: u32) -> Self {
        let raw = u64::from(value);
        Self {
            num_boost_states: field(raw, NUM_BOOST_STATES.0, NUM_BOOST_STATES.1) as u8,
            reserved: (raw & !FIELD_BITS) as u32,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if u64::from(self.num_boost_states) > mask(NUM_BOOST_STATES.1) {
            return Err("NumBoostStates must be <= 3 (2 bits)");
        }
        Ok(())
    }
}
