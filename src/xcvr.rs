///! Transceiver PLL divider search
///!
///! Every legal divider is a (value, DRP encoding) pair. The search walks
///! the tables outer to inner, M, D then the feedback dividers, and the
///! first combination that hits the lane rate exactly wins.

use log::{debug, warn};

use crate::{ constants::*, errors::* };


/// Divider value and its DRP encoding
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Divider {
    pub value: u32,
    pub code: u16,
}

const fn div(value: u32, code: u16) -> Divider {
    Divider { value, code }
}

/// CPLL feedback divider N1 (FBDIV_45)
pub const CPLL_N1: [Divider; 2] = [div(5, 1), div(4, 0)];
/// CPLL feedback divider N2 (FBDIV)
pub const CPLL_N2: [Divider; 5] = [div(5, 3), div(4, 2), div(3, 1), div(2, 0), div(1, 16)];
/// CPLL output divider
pub const CPLL_D: [Divider; 4] = [div(1, 0), div(2, 1), div(4, 2), div(8, 3)];
/// CPLL reference divider
pub const CPLL_M: [Divider; 2] = [div(1, 16), div(2, 0)];

/// QPLL feedback divider
pub const QPLL_N: [Divider; 8] = [
    div(16, 32), div(20, 48), div(32, 96), div(40, 128),
    div(64, 224), div(66, 320), div(80, 288), div(100, 368),
];
/// QPLL output divider
pub const QPLL_D: [Divider; 5] = [div(1, 0), div(2, 1), div(4, 2), div(8, 3), div(16, 4)];
/// QPLL reference divider
pub const QPLL_M: [Divider; 4] = [div(1, 16), div(2, 0), div(3, 1), div(4, 2)];

/// N value that needs the 66/64 feedback ratio
const QPLL_N_FRACTIONAL_RATIO: u32 = 66;


/// Channel PLL settings
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct CpllSettings {
    pub m: Divider,
    pub d: Divider,
    pub n1: Divider,
    pub n2: Divider,
}

impl CpllSettings {
    /// Lane rate these dividers produce from `refclk_khz`
    pub fn lane_rate_khz(self: &Self, refclk_khz: u32) -> u32 {
        cpll_lane_rate(refclk_khz, self.m.value, self.d.value, self.n1.value, self.n2.value)
    }
}

/// Quad PLL settings
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct QpllSettings {
    pub m: Divider,
    pub d: Divider,
    pub n: Divider,
    /// 0 for N = 66, 1 otherwise
    pub fb_div_ratio: u8,
    /// VCO in the 5.93 to 8.0 GHz band
    pub low_band: bool,
}

impl QpllSettings {
    /// Lane rate these dividers produce from `refclk_khz`
    pub fn lane_rate_khz(self: &Self, refclk_khz: u32) -> u32 {
        qpll_lane_rate(refclk_khz, self.m.value, self.d.value, self.n.value)
    }
}


/// Find CPLL dividers for a lane rate, all frequencies in kHz.
pub fn calc_cpll_settings(refclk_khz: u32, lane_rate_khz: u32) -> Result<CpllSettings, Error> {
    let refclk = refclk_khz as u64;
    let lane_rate = lane_rate_khz as u64;

    for m in CPLL_M.iter() {
        for d in CPLL_D.iter() {
            for n1 in CPLL_N1.iter() {
                for n2 in CPLL_N2.iter() {
                    let pll = refclk * n1.value as u64 * n2.value as u64 / m.value as u64;

                    if pll > CPLL_VCO_MAX_KHZ as u64 || pll < CPLL_VCO_MIN_KHZ as u64 {
                        continue;
                    }

                    if pll * 2 / d.value as u64 == lane_rate {
                        debug!("CPLL: M {}, D {}, N1 {}, N2 {}", m.value, d.value, n1.value, n2.value);
                        return Ok(CpllSettings { m: *m, d: *d, n1: *n1, n2: *n2 });
                    }
                }
            }
        }
    }

    warn!("CPLL: Failed to find matching dividers for {} kHz rate", lane_rate_khz);
    Err(Error::NoDividerSolution)
}

/// Find QPLL dividers for a lane rate, all frequencies in kHz.
///
/// The VCO has two disjoint bands, a candidate outside both is skipped.
pub fn calc_qpll_settings(refclk_khz: u32, lane_rate_khz: u32) -> Result<QpllSettings, Error> {
    let refclk = refclk_khz as u64;
    let lane_rate = lane_rate_khz as u64;

    let low = QPLL_LOW_BAND_MIN_KHZ as u64 ..= QPLL_LOW_BAND_MAX_KHZ as u64;
    let high = QPLL_HIGH_BAND_MIN_KHZ as u64 ..= QPLL_HIGH_BAND_MAX_KHZ as u64;

    for m in QPLL_M.iter() {
        for d in QPLL_D.iter() {
            for n in QPLL_N.iter() {
                let vco = refclk * n.value as u64 / m.value as u64;
                let out = vco / 2;

                let low_band = if low.contains(&vco) {
                    true
                } else if high.contains(&vco) {
                    false
                } else {
                    continue;
                };

                if out * 2 / d.value as u64 == lane_rate {
                    let fb_div_ratio = if n.value == QPLL_N_FRACTIONAL_RATIO { 0 } else { 1 };
                    debug!("QPLL: M {}, D {}, N {}, ratio {}, lowband {}",
                        m.value, d.value, n.value, fb_div_ratio, low_band);
                    return Ok(QpllSettings { m: *m, d: *d, n: *n, fb_div_ratio, low_band });
                }
            }
        }
    }

    warn!("QPLL: Failed to find matching dividers for {} kHz rate", lane_rate_khz);
    Err(Error::NoDividerSolution)
}


/// Lane rate of a CPLL, kHz, 0 if M or D is 0
pub fn cpll_lane_rate(refclk_khz: u32, m: u32, d: u32, n1: u32, n2: u32) -> u32 {
    if m == 0 || d == 0 {
        return 0;
    }
    let num = refclk_khz as u64 * n1 as u64 * n2 as u64 * 2;
    div_round_closest(num, m as u64 * d as u64) as u32
}

/// Lane rate of a QPLL, kHz, 0 if M or D is 0
///
/// The VCO is halved before the output, the DDR output doubles it back.
pub fn qpll_lane_rate(refclk_khz: u32, m: u32, d: u32, n: u32) -> u32 {
    if m == 0 || d == 0 {
        return 0;
    }
    let num = refclk_khz as u64 * n as u64;
    div_round_closest(num, m as u64 * d as u64) as u32
}

fn div_round_closest(n: u64, d: u64) -> u64 {
    (n + d / 2) / d
}

/// Output divider value to its register encoding
pub fn out_div_to_code(out_div: u32) -> u8 {
    match out_div {
        1 => 0,
        2 => 1,
        4 => 2,
        8 => 3,
        _ => 4,
    }
}


/// Which transceiver PLL drives the lanes
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum XcvrPll {
    Cpll,
    Qpll,
}

/// Solved dividers for either PLL
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum PllSettings {
    Cpll(CpllSettings),
    Qpll(QpllSettings),
}

impl PllSettings {
    pub fn lane_rate_khz(self: &Self, refclk_khz: u32) -> u32 {
        match self {
            PllSettings::Cpll(s) => s.lane_rate_khz(refclk_khz),
            PllSettings::Qpll(s) => s.lane_rate_khz(refclk_khz),
        }
    }

    /// Output divider, the same field exists on both PLLs
    pub fn out_div(self: &Self) -> Divider {
        match self {
            PllSettings::Cpll(s) => s.d,
            PllSettings::Qpll(s) => s.d,
        }
    }
}

impl XcvrPll {
    /// Solve for `lane_rate_khz` with the dividers of this PLL.
    /// On failure nothing has been configured, the caller may retry with another rate.
    pub fn solve(self: &Self, refclk_khz: u32, lane_rate_khz: u32) -> Result<PllSettings, Error> {
        match self {
            XcvrPll::Cpll => calc_cpll_settings(refclk_khz, lane_rate_khz).map(PllSettings::Cpll),
            XcvrPll::Qpll => calc_qpll_settings(refclk_khz, lane_rate_khz).map(PllSettings::Qpll),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpll_first_match() {
        // M 1, D 1: N1 5 with N2 5, 4 or 3 overshoots the VCO band
        let s = calc_cpll_settings(245_760, 4_915_200).unwrap();
        assert_eq!(s.m, div(1, 16));
        assert_eq!(s.d, div(1, 0));
        assert_eq!(s.n1, div(5, 1));
        assert_eq!(s.n2, div(2, 0));
        assert_eq!(s.lane_rate_khz(245_760), 4_915_200);
    }

    #[test]
    fn cpll_uses_output_divider() {
        let s = calc_cpll_settings(245_760, 1_228_800).unwrap();
        assert_eq!(s.d.value, 4);
        assert_eq!(s.lane_rate_khz(245_760), 1_228_800);
    }

    #[test]
    fn cpll_no_solution() {
        assert_eq!(calc_cpll_settings(245_760, 1), Err(Error::NoDividerSolution));
        assert_eq!(calc_cpll_settings(245_760, 4_915_201), Err(Error::NoDividerSolution));
    }

    #[test]
    fn qpll_high_band() {
        let s = calc_qpll_settings(245_760, 9_830_400).unwrap();
        assert_eq!(s.m.value, 1);
        assert_eq!(s.d.value, 1);
        assert_eq!(s.n, div(40, 128));
        assert_eq!(s.fb_div_ratio, 1);
        assert!(!s.low_band);
    }

    #[test]
    fn qpll_low_band_fractional_ratio() {
        // 64 × 100 MHz is low band too but gives 6.4 Gbps
        let s = calc_qpll_settings(100_000, 6_600_000).unwrap();
        assert_eq!(s.n, div(66, 320));
        assert_eq!(s.fb_div_ratio, 0);
        assert!(s.low_band);
        assert_eq!(s.lane_rate_khz(100_000), 6_600_000);
    }

    #[test]
    fn qpll_skips_the_gap_between_bands() {
        // 9 GHz VCO falls between the bands, every path to 9 Gbps goes through it
        assert_eq!(calc_qpll_settings(90_000, 9_000_000), Err(Error::NoDividerSolution));
    }

    #[test]
    fn dispatch() {
        let s = XcvrPll::Qpll.solve(245_760, 9_830_400).unwrap();
        assert!(matches!(s, PllSettings::Qpll(_)));
        assert_eq!(s.lane_rate_khz(245_760), 9_830_400);

        let s = XcvrPll::Cpll.solve(245_760, 4_915_200).unwrap();
        assert_eq!(s.out_div().code, 0);
        assert_eq!(XcvrPll::Cpll.solve(245_760, 7), Err(Error::NoDividerSolution));
    }

    #[test]
    fn read_back() {
        assert_eq!(cpll_lane_rate(245_760, 1, 1, 5, 2), 4_915_200);
        assert_eq!(cpll_lane_rate(100_000, 3, 1, 1, 1), 66_667);
        assert_eq!(qpll_lane_rate(245_760, 1, 1, 40), 9_830_400);
        assert_eq!(cpll_lane_rate(245_760, 0, 1, 5, 2), 0);
        assert_eq!(qpll_lane_rate(245_760, 1, 0, 40), 0);
    }

    #[test]
    fn out_div_codes() {
        assert_eq!(out_div_to_code(1), 0);
        assert_eq!(out_div_to_code(8), 3);
        assert_eq!(out_div_to_code(16), 4);
        assert_eq!(out_div_to_code(3), 4);
    }
}
