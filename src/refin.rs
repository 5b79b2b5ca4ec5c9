///! Input reference config
///! RefIn / Doubler / R counter / Divider

use log::debug;

use crate::{ constants::*, errors::* };


/// Input reference frequency config
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct RefIn {
    /// Input frequency
    pub f: u32,
    /// R counter value
    pub r: u16,
    /// True if 2X doubler is enabled
    pub doubler: bool,
    /// True if 2X divider is enabled
    pub divider: bool,
}

impl RefIn {

    /// Configure reference input frequency with a fixed R counter
    pub fn new(
        f: u32,
        r: u16,
        doubler: bool,
        divider: bool,
    ) -> Result<Self, Error> {
        (if !(REF_IN_FREQ_MIN ..= REF_IN_FREQ_MAX).contains(&f) { Err(Error::InvalidReferenceFrequency) } else { Ok(())} )?;
        (if !(1 ..= R_COUNTER_MAX).contains(&r) { Err(Error::InvalidReferenceFrequency) } else { Ok(())} )?;

        Ok(RefIn { f, r, doubler, divider })
    }

    /// Pick the smallest R counter value that brings the PFD at or below
    /// `max_pfd`, i.e. the highest PFD frequency the part accepts.
    pub fn maximize_pfd(
        f: u32,
        doubler: bool,
        divider: bool,
        max_pfd: u32,
    ) -> Result<Self, Error> {
        let mut res = RefIn::new(f, 1, doubler, divider)?;
        while res.f_pfd() > max_pfd {
            res.r += 1;
            if res.r > R_COUNTER_MAX {
                return Err(Error::InvalidReferenceFrequency);
            }
        }

        debug!("REFin {} Hz, R {}, PFD {} Hz", f, res.r, res.f_pfd());
        Ok(res)
    }

    /// Phase Frequency Detector' frequency
    /// f PFD = REF IN × [(1 + D)/(R × (1 + T))]
    /// where:
    /// REF IN is the reference frequency input.
    /// D is the REF IN doubler bit (0 or 1).
    /// R is the reference division factor (1 to 1023).
    /// T is the reference divide-by-2 bit (0 or 1).
    pub fn f_pfd(self: &Self) -> u32 {
        let f = self.f as u64 * (1 + self.doubler as u64);
        (f / self.r as u64 / (1 + self.divider as u64)) as u32
    }
}
