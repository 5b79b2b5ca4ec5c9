///! Frequency calculations

use log::debug;

use crate::{ config::*, constants::*, errors::*, register::* };


/// Fractional-N divider values for one output frequency.
///
/// VCO = f PFD × (INT + (FRAC1 + FRAC2 / MOD2) / MOD1)
///
/// where MOD1 is fixed at 2^24 and MOD2 is at most 16383
/// (2^28 - 1 with the R13 extension).
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct FracNParams {
    pub integer: u32,
    pub frac1: u32,
    pub frac2: u32,
    pub mod2: u32,
    /// RF output divider, 2^rf_div_sel
    pub rf_div_sel: u8,
}

impl FracNParams {

    /// 8/9 prescaler once INT is high enough for it
    pub fn prescaler(self: &Self) -> Prescaler {
        if self.integer >= INT_PRESCALER_89_MIN { Prescaler::P89 } else { Prescaler::P45 }
    }

    /// Store the divider values into the register image.
    pub fn set(self: &Self, rs: RegisterSet, extended_modulus: bool) -> RegisterSet {
        let rs = rs
            .set(Int(self.integer as u16))
            .set(self.prescaler())
            .set(Frac1(self.frac1))
            .set(Frac2Lsb((self.frac2 & 0x3FFF) as u16))
            .set(Mod2Lsb((self.mod2 & 0x3FFF) as u16))
            .set(RfDividerSelect(self.rf_div_sel));

        if extended_modulus {
            rs.set(Frac2Msb((self.frac2 >> 14) as u16))
              .set(Mod2Msb((self.mod2 >> 14) as u16))
        } else {
            rs
        }
    }

    /// Read the divider values back from a register image
    pub fn from_registers(rs: &RegisterSet, extended_modulus: bool) -> Self {
        let int: Int = rs.get();
        let frac1: Frac1 = rs.get();
        let frac2: Frac2Lsb = rs.get();
        let mod2: Mod2Lsb = rs.get();
        let rfdiv: RfDividerSelect = rs.get();

        let (frac2_msb, mod2_msb) = if extended_modulus {
            let f: Frac2Msb = rs.get();
            let m: Mod2Msb = rs.get();
            (f.0 as u32, m.0 as u32)
        } else {
            (0, 0)
        };

        FracNParams {
            integer: int.0 as u32,
            frac1: frac1.0,
            frac2: (frac2_msb << 14) | frac2.0 as u32,
            mod2: (mod2_msb << 14) | mod2.0 as u32,
            rf_div_sel: rfdiv.0,
        }
    }
}


/// Split a VCO frequency into INT, FRAC1 and the reduced FRAC2 / MOD2 pair.
pub fn fract_n_compute(vco: u64, pfd: u32, max_modulus2: u32) -> (u32, u32, u32, u32) {
    let pfd = pfd as u64;

    let mut integer = vco / pfd;
    let rem = (vco % pfd) * MODULUS1;
    let mut frac1 = rem / pfd;
    let mut frac2 = rem % pfd;
    let mut mod2 = pfd;

    while mod2 > max_modulus2 as u64 {
        mod2 >>= 1;
        frac2 >>= 1;
    }

    // shifting can round FRAC2 up to MOD2, carry into FRAC1
    if frac2 >= mod2 {
        frac2 = 0;
        frac1 += 1;
        if frac1 == MODULUS1 {
            frac1 = 0;
            integer += 1;
        }
    }

    let g = gcd(frac2, mod2);
    (integer as u32, frac1 as u32, (frac2 / g) as u32, (mod2 / g) as u32)
}

/// Greatest common divisor, gcd(0, b) == b
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Bleed current code for a given charge pump current and INT:
/// ceil(400 × I_CP / (INT × 375)), 1 to 255
pub fn bleed_current(cp_current_ua: u32, integer: u32) -> u8 {
    let den = (integer * 375).max(1);
    div_ceil(400 * cp_current_ua, den).max(1).min(255) as u8
}


/// FRAC-N frequency settings
#[derive(Debug,Copy,Clone)]
pub struct FracN {
    pub variant: Variant,
    /// Phase Frequency Detector' frequency, Hz
    pub pfd: u32,
}

impl FracN {

    pub fn new(variant: Variant, pfd: u32) -> Self {
        FracN { variant, pfd }
    }

    /// Divider values for the requested output frequency.
    /// Out of band requests are rejected, never clamped.
    pub fn compute(
        self: &Self,
        channel: Channel,
        f_out_hz: u64,
    ) -> Result<FracNParams, Error> {
        let v = self.variant;

        let (vco, rf_div_sel) = match channel {
            Channel::RfOutA => {
                (if !(v.out_min() ..= v.out_max()).contains(&f_out_hz) { Err(Error::InvalidOutputFrequency) } else { Ok(())} )?;

                let mut vcof = f_out_hz;
                let mut rf_div_sel = 0;
                while vcof < v.vco_min() { vcof <<= 1; rf_div_sel += 1; }
                (vcof, rf_div_sel)
            }
            Channel::RfOutB => {
                let (min, max) = v.outb_range().ok_or(Error::InvalidChannel)?;
                (if !(min ..= max).contains(&f_out_hz) { Err(Error::InvalidOutputFrequency) } else { Ok(())} )?;

                (f_out_hz >> 1, 0)
            }
        };

        let (integer, frac1, frac2, mod2) = fract_n_compute(vco, self.pfd, v.max_modulus2());

        debug!("f {} Hz: VCO {} Hz, INT {}, FRAC1 {}, FRAC2 {}, MOD2 {}, RF div {}",
            f_out_hz, vco, integer, frac1, frac2, mod2, 1u32 << rf_div_sel);

        Ok(FracNParams { integer, frac1, frac2, mod2, rf_div_sel })
    }

    /// Actual output frequency for a set of divider values, rounded to the nearest Hz at the VCO.
    pub fn f_out_hz(self: &Self, channel: Channel, p: &FracNParams) -> u64 {
        let pfd = self.pfd as u64;

        let mut val = (p.integer as u64 * MODULUS1 + p.frac1 as u64) * pfd;
        val += p.frac2 as u64 * pfd / (p.mod2 as u64).max(1);
        val += MODULUS1 / 2;
        let vco = val / MODULUS1;

        match channel {
            Channel::RfOutA => vco >> p.rf_div_sel,
            Channel::RfOutB => vco << 1,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const PFD: u32 = 61_440_000;

    #[test]
    fn integer_boundary() {
        // 3.44064 GHz is exactly 56 × 61.44 MHz
        let (int, f1, f2, m2) = fract_n_compute(3_440_640_000, PFD, MAX_MODULUS2);
        assert_eq!((int, f1, f2, m2), (56, 0, 0, 1));
    }

    #[test]
    fn fraction_splits() {
        let (int, f1, f2, m2) = fract_n_compute(3_500_000_000, PFD, MAX_MODULUS2);
        assert_eq!(int, 56);
        // 59_360_000 / 61_440_000 of a step
        assert_eq!(f1, ((59_360_000u64 << 24) / PFD as u64) as u32);
        assert!(f2 < m2);
        assert!(m2 <= MAX_MODULUS2);
        assert_eq!(gcd(f2 as u64, m2 as u64), 1);
    }

    #[test]
    fn extended_modulus_keeps_full_resolution() {
        let pfd = 122_880_000;
        let vco = 3_500_000_001;
        let (_, _, f2, m2) = fract_n_compute(vco, pfd, MAX_MODULUS2_EXT);

        let rem = ((vco % pfd as u64) << 24) % pfd as u64;
        let g = gcd(rem, pfd as u64);
        assert_eq!(f2 as u64, rem / g);
        assert_eq!(m2 as u64, pfd as u64 / g);
    }

    #[test]
    fn divider_doubles_until_vco_band() {
        let fracn = FracN::new(Variant::Adf5355, PFD);
        let p = fracn.compute(Channel::RfOutA, 100_000_000).unwrap();
        // 100 MHz × 64 = 6.4 GHz, × 32 = 3.2 GHz is below the band
        assert_eq!(p.rf_div_sel, 6);
        assert_eq!(fracn.f_out_hz(Channel::RfOutA, &p), 100_000_000);

        let p = fracn.compute(Channel::RfOutA, 3_400_000_000).unwrap();
        assert_eq!(p.rf_div_sel, 0);
    }

    #[test]
    fn prescaler_threshold() {
        let mut p = FracNParams { integer: 74, frac1: 0, frac2: 0, mod2: 1, rf_div_sel: 0 };
        assert_eq!(p.prescaler(), Prescaler::P45);
        p.integer = 75;
        assert_eq!(p.prescaler(), Prescaler::P89);
    }

    #[test]
    fn out_of_band_is_rejected() {
        let fracn = FracN::new(Variant::Adf5355, PFD);
        assert_eq!(fracn.compute(Channel::RfOutA, 53_124_999), Err(Error::InvalidOutputFrequency));
        assert_eq!(fracn.compute(Channel::RfOutA, 6_800_000_001), Err(Error::InvalidOutputFrequency));
        assert_eq!(fracn.compute(Channel::RfOutB, 6_799_999_999), Err(Error::InvalidOutputFrequency));
        assert_eq!(fracn.compute(Channel::RfOutB, 13_600_000_001), Err(Error::InvalidOutputFrequency));

        let fracn = FracN::new(Variant::Adf4355, PFD);
        assert_eq!(fracn.compute(Channel::RfOutB, 8_000_000_000), Err(Error::InvalidChannel));
    }

    #[test]
    fn doubled_output_halves_the_vco() {
        let fracn = FracN::new(Variant::Adf5355, PFD);
        let p = fracn.compute(Channel::RfOutB, 10_000_000_000).unwrap();
        assert_eq!(p.rf_div_sel, 0);
        assert_eq!(fracn.f_out_hz(Channel::RfOutB, &p), 10_000_000_000);
    }

    #[test]
    fn registers_round_trip_params() {
        let fracn = FracN::new(Variant::Adf5356, 122_880_000);
        let p = fracn.compute(Channel::RfOutA, 2_400_000_123).unwrap();
        let rs = p.set(RegisterSet::default(), true);
        assert_eq!(FracNParams::from_registers(&rs, true), p);
    }

    #[test]
    fn bleed_current_clamps() {
        assert_eq!(bleed_current(945, 56), 18);
        assert_eq!(bleed_current(0, 56), 1);
        assert_eq!(bleed_current(5040, 23), 234);
        assert_eq!(bleed_current(100_000, 23), 255);
    }
}
