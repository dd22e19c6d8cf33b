//! # Calibration
//! Turns raw ADC counts into the battery voltage in tenths of a volt.
//!
//! The battery is measured through a resistor divider: the ADC pin sits across
//! `r_in`, with `r_big` between the pin and the battery terminal.

use crate::config::{ADC_REFERENCE_MILLIVOLTS, DIVIDER_R_BIG_OHMS, DIVIDER_R_IN_OHMS};
use crate::voltage_alarm::Tenths;

/// Largest count of the 12 bit ADC.
pub const ADC_FULL_SCALE: u32 = 4095;

/// Averages the non-zero samples. A zero count is a failed conversion, so a
/// batch of zeros yields `None`.
#[allow(clippy::cast_possible_truncation)]
pub fn average_nonzero(samples: &[u16]) -> Option<u16> {
    let (sum, count) = samples
        .iter()
        .filter(|&&sample| sample != 0)
        .fold((0u32, 0u32), |(sum, count), &sample| (sum + u32::from(sample), count + 1));
    if count == 0 {
        None
    } else {
        Some((sum / count) as u16)
    }
}

/// The resistor divider in front of the ADC.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divider {
    /// Resistor the ADC pin measures across
    pub r_in_ohms: u32,
    /// Resistor between the pin and the battery
    pub r_big_ohms: u32,
    /// ADC reference voltage
    pub reference_millivolts: u32,
}

impl Default for Divider {
    fn default() -> Self {
        Self::from_config()
    }
}

impl Divider {
    /// The divider described in `config/controller.json`.
    pub const fn from_config() -> Self {
        Self {
            r_in_ohms: DIVIDER_R_IN_OHMS,
            r_big_ohms: DIVIDER_R_BIG_OHMS,
            reference_millivolts: ADC_REFERENCE_MILLIVOLTS,
        }
    }

    /// Battery voltage in millivolts for an averaged ADC count.
    pub fn millivolts(&self, count: u16) -> u32 {
        let numerator = u64::from(count)
            * u64::from(self.reference_millivolts)
            * (u64::from(self.r_big_ohms) + u64::from(self.r_in_ohms));
        let denominator = u64::from(ADC_FULL_SCALE) * u64::from(self.r_in_ohms.max(1));
        u32::try_from(numerator / denominator).unwrap_or(u32::MAX)
    }

    /// Battery voltage truncated to tenths of a volt, saturating at 99.9 V.
    pub fn tenths(&self, count: u16) -> Tenths {
        let tenths = self.millivolts(count) / 100;
        Tenths::saturating(u16::try_from(tenths).unwrap_or(u16::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_samples_are_skipped() {
        assert_eq!(average_nonzero(&[0, 100, 0, 300, 0]), Some(200));
        assert_eq!(average_nonzero(&[0, 0, 0]), None);
        assert_eq!(average_nonzero(&[]), None);
        assert_eq!(average_nonzero(&[4095; 5]), Some(4095));
    }

    #[test]
    fn counts_scale_through_the_divider() {
        let divider = Divider {
            r_in_ohms: 2_200,
            r_big_ohms: 10_000,
            reference_millivolts: 3_300,
        };
        assert_eq!(divider.tenths(0), Tenths::ZERO);
        // full scale: 3.3 V * 12200 / 2200 = 18.3 V
        assert_eq!(divider.millivolts(4095), 18_300);
        assert_eq!(divider.tenths(4095), Tenths::new(183).unwrap());
        // 2.27 V at the pin, 12.588 V at the battery
        assert_eq!(divider.tenths(2817), Tenths::new(125).unwrap());
    }

    #[test]
    fn readings_saturate() {
        let divider = Divider {
            r_in_ohms: 1,
            r_big_ohms: 1_000,
            reference_millivolts: 3_300,
        };
        assert_eq!(divider.tenths(4095), Tenths::MAX);
    }
}
