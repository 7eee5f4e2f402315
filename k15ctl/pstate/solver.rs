//! Nearest-match search for a power dissipation target
//!
//! Power is not stored directly: it follows from the resolved VID and the
//! `(IddDiv, IddValue)` current encoding. The search walks IddDiv 0..=2 and
//! IddValue 0..=255 in that order and keeps the first point with the
//! smallest error, stopping early on an exact hit. IddDiv 3 is never
//! searched; whether that setting is usable still needs confirming against
//! the BKDG before adding it to the range.

use std::ops::RangeInclusive;

use k15ctl_raw::current_arch::pstate::PStateDef;

use crate::error::Warning;

/// Current divisor selectors visited by the search
pub const SEARCHED_IDD_DIVS: RangeInclusive<u8> = 0..=2;

/// Outcome of a power search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerMatch {
    pub idd_div: u8,
    pub idd_value: u8,
    /// Power dissipation the chosen encoding yields, in mW
    pub power_mw: f64,
    /// Whether `power_mw` equals the target exactly
    pub exact: bool,
}

impl PowerMatch {
    /// `def` with the matched current encoding
    pub fn apply(&self, def: PStateDef) -> PStateDef {
        PStateDef {
            idd_div: self.idd_div,
            idd_value: self.idd_value,
            ..def
        }
    }

    /// Warning to surface when only an approximation was found
    pub fn warning(&self, target_mw: f64) -> Option<Warning> {
        (!self.exact).then_some(Warning::ApproximationOnly {
            target_mw,
            achieved_mw: self.power_mw,
        })
    }
}

/// Find the current encoding whose power is closest to `target_mw`
///
/// `def` must already carry the final VID.
pub fn solve_power_target(def: &PStateDef, target_mw: f64) -> PowerMatch {
    let mut best: Option<PowerMatch> = None;

    for idd_div in SEARCHED_IDD_DIVS {
        for idd_value in 0..=u8::MAX {
            let power_mw = PStateDef {
                idd_div,
                idd_value,
                ..*def
            }
            .power_mw();

            if power_mw == target_mw {
                return PowerMatch {
                    idd_div,
                    idd_value,
                    power_mw,
                    exact: true,
                };
            }

            let improves = match best {
                None => true,
                Some(b) => (power_mw - target_mw).abs() < (b.power_mw - target_mw).abs(),
            };
            if improves {
                best = Some(PowerMatch {
                    idd_div,
                    idd_value,
                    power_mw,
                    exact: false,
                });
            }
        }
    }

    // The search range is never empty
    best.unwrap_or(PowerMatch {
        idd_div: 0,
        idd_value: 0,
        power_mw: 0.0,
        exact: false,
    })
}
