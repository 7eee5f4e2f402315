//! Platform voltage limits for requested core VIDs
//!
//! VIDs count downwards in voltage: `min_vid` is the largest VID (lowest
//! voltage) the platform accepts and `max_vid` the smallest. A limit of 0 is
//! not enforced.

use crate::config::PlatformConfig;
use crate::error::{VidBound, Warning};

/// Pull `requested` back inside the platform limits
///
/// Returns the VID to program and, when it differs from the request, the
/// warning describing the substitution.
pub fn clamp_cpu_vid(requested: u8, platform: &PlatformConfig) -> (u8, Option<Warning>) {
    let (applied, bound) = if platform.min_vid != 0 && requested > platform.min_vid {
        (platform.min_vid, VidBound::MinVid)
    } else if platform.max_vid != 0 && requested < platform.max_vid {
        (platform.max_vid, VidBound::MaxVid)
    } else {
        return (requested, None);
    };

    (
        applied,
        Some(Warning::OutOfRangeVoltage {
            requested,
            applied,
            bound,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_min_vid() {
        let platform = PlatformConfig::new(0, 40, 0);
        let (vid, warning) = clamp_cpu_vid(50, &platform);

        assert_eq!(vid, 40);
        assert_eq!(
            warning,
            Some(Warning::OutOfRangeVoltage {
                requested: 50,
                applied: 40,
                bound: VidBound::MinVid,
            })
        );
    }

    #[test]
    fn test_clamp_to_max_vid() {
        let platform = PlatformConfig::new(0, 0, 10);
        let (vid, warning) = clamp_cpu_vid(5, &platform);

        assert_eq!(vid, 10);
        assert!(matches!(
            warning,
            Some(Warning::OutOfRangeVoltage {
                bound: VidBound::MaxVid,
                ..
            })
        ));
    }

    #[test]
    fn test_unbounded_platform_never_clamps() {
        let platform = PlatformConfig::new(0, 0, 0);
        for requested in [0, 1, 63, 123, 124, 127] {
            assert_eq!(clamp_cpu_vid(requested, &platform), (requested, None));
        }
    }

    #[test]
    fn test_within_limits() {
        let platform = PlatformConfig::new(0, 40, 10);
        assert_eq!(clamp_cpu_vid(10, &platform), (10, None));
        assert_eq!(clamp_cpu_vid(25, &platform), (25, None));
        assert_eq!(clamp_cpu_vid(40, &platform), (40, None));
        assert_eq!(clamp_cpu_vid(41, &platform).0, 40);
        assert_eq!(clamp_cpu_vid(9, &platform).0, 10);
    }
}
