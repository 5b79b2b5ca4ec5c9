//! Register write ordering
//!
//! R0 is always written last, a write to R0 latches the double buffered
//! values and kicks off the VCO band auto calibration. The settle step
//! always sits right before that final R0 write.

use crate::register::*;

/// Longest plan: 13 registers plus R0, or the 9 step frequency update
pub const MAX_STEPS: usize = NUM_REGS + 2;

/// Registers the frequency update sequence rewrites
const INCREMENTAL_SET: [u8; 6] = [0, 1, 2, 4, 10, 13];


/// One bus operation
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Step {
    /// Write a register word, address in the low 4 bits
    Write(u32),
    /// Wait for the ADC conversion before the final R0 write, us
    Settle(u32),
}

impl Step {
    /// Register address of a write
    pub fn addr(self: &Self) -> Option<u8> {
        match self {
            Step::Write(w) => Some((w & ADDR_MASK) as u8),
            Step::Settle(_) => None,
        }
    }
}


/// Whether a plan pushes everything or just the frequency registers
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum SyncKind {
    Full,
    Incremental,
}


/// Ordered list of bus operations
#[derive(Debug,Copy,Clone)]
pub struct Sequence {
    pub kind: SyncKind,
    steps: [Step; MAX_STEPS],
    len: usize,
}

impl Sequence {

    fn empty(kind: SyncKind) -> Self {
        Sequence { kind, steps: [Step::Settle(0); MAX_STEPS], len: 0 }
    }

    fn push(self: &mut Self, s: Step) {
        self.steps[self.len] = s;
        self.len += 1;
    }

    pub fn steps(self: &Self) -> &[Step] {
        &self.steps[..self.len]
    }

    /// Every register, highest address first, settle, then R0.
    pub fn full(rs: &RegisterSet, num_regs: u8, settle_us: u32) -> Self {
        let mut seq = Sequence::empty(SyncKind::Full);
        for addr in (1..num_regs).rev() {
            seq.push(Step::Write(rs.word(addr)));
        }
        seq.push(Step::Settle(settle_us));
        seq.push(Step::Write(rs.r0.word()));
        seq
    }

    /// Frequency update:
    /// R13, R10, R4 (counter reset), R2, R1, R0 (no autocal),
    /// R4 (counter reset off), settle, R0 (autocal).
    pub fn incremental(rs: &RegisterSet, extended_modulus: bool, settle_us: u32) -> Self {
        let mut seq = Sequence::empty(SyncKind::Incremental);
        if extended_modulus {
            seq.push(Step::Write(rs.r13.word()));
        }
        seq.push(Step::Write(rs.r10.word()));
        seq.push(Step::Write(rs.r4.set(CounterReset::Enabled).word()));
        seq.push(Step::Write(rs.r2.word()));
        seq.push(Step::Write(rs.r1.word()));
        seq.push(Step::Write(rs.r0.set(Autocal::Disabled).word()));
        seq.push(Step::Write(rs.r4.set(CounterReset::Disabled).word()));
        seq.push(Step::Settle(settle_us));
        seq.push(Step::Write(rs.r0.set(Autocal::Enabled).word()));
        seq
    }

    /// Pick the plan for the current image.
    ///
    /// `hw` holds the last word written to each address. The frequency
    /// update only covers R0, R1, R2, R4, R10 and R13, anything else that
    /// moved (RF divider select or bleed current in R6, for instance)
    /// needs the full write.
    pub fn plan(
        rs: &RegisterSet,
        hw: &[u32; NUM_REGS],
        all_synced: bool,
        num_regs: u8,
        settle_us: u32,
    ) -> Self {
        if all_synced && !needs_full_sync(rs, hw, num_regs) {
            Sequence::incremental(rs, num_regs as usize == NUM_REGS, settle_us)
        } else {
            Sequence::full(rs, num_regs, settle_us)
        }
    }
}

/// True if a register outside the frequency update set differs from hardware
pub fn needs_full_sync(rs: &RegisterSet, hw: &[u32; NUM_REGS], num_regs: u8) -> bool {
    let words = rs.to_words();
    (0..num_regs)
        .filter(|a| !INCREMENTAL_SET.contains(a))
        .any(|a| words[a as usize] != hw[a as usize])
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Step;
    type IntoIter = core::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps().iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(seq: &Sequence) -> ([u8; MAX_STEPS], usize) {
        let mut out = [0xFF; MAX_STEPS];
        for (i, s) in seq.steps().iter().enumerate() {
            out[i] = s.addr().unwrap_or(0xFF);
        }
        (out, seq.steps().len())
    }

    #[test]
    fn full_is_descending_and_ends_on_r0() {
        let rs = RegisterSet::default();
        let seq = Sequence::full(&rs, 13, 160);
        let (a, n) = addrs(&seq);
        assert_eq!(n, 14);
        assert_eq!(&a[..n], &[12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0xFF, 0]);
        assert_eq!(seq.steps()[12], Step::Settle(160));

        let seq = Sequence::full(&rs, 14, 160);
        assert_eq!(seq.steps()[0].addr(), Some(13));
        assert_eq!(seq.steps().len(), 15);
    }

    #[test]
    fn incremental_order() {
        let rs = RegisterSet::default().set(Autocal::Enabled);
        let seq = Sequence::incremental(&rs, false, 160);
        let (a, n) = addrs(&seq);
        assert_eq!(&a[..n], &[10, 4, 2, 1, 0, 4, 0xFF, 0]);

        let steps = seq.steps();
        assert_eq!(steps[1], Step::Write(rs.r4.set(CounterReset::Enabled).word()));
        assert_eq!(steps[4], Step::Write(0));
        assert_eq!(steps[5], Step::Write(rs.r4.word()));
        assert_eq!(steps[6], Step::Settle(160));
        assert_eq!(steps[7], Step::Write(1 << 21));

        let seq = Sequence::incremental(&rs, true, 160);
        assert_eq!(seq.steps()[0].addr(), Some(13));
    }

    #[test]
    fn plan_falls_back_to_full() {
        let rs = RegisterSet::default().set(RfDividerSelect(2));
        let mut hw = rs.to_words();

        assert_eq!(Sequence::plan(&rs, &hw, false, 13, 1).kind, SyncKind::Full);
        assert_eq!(Sequence::plan(&rs, &hw, true, 13, 1).kind, SyncKind::Incremental);

        // new INT only, still incremental
        let rs2 = rs.set(Int(100));
        assert_eq!(Sequence::plan(&rs2, &hw, true, 13, 1).kind, SyncKind::Incremental);

        // R6 moved
        let rs3 = rs.set(RfDividerSelect(3));
        assert_eq!(Sequence::plan(&rs3, &hw, true, 13, 1).kind, SyncKind::Full);

        // R13 is outside the 13 register parts, stale values there do not matter
        hw[13] = 0xDEAD;
        assert_eq!(Sequence::plan(&rs, &hw, true, 13, 1).kind, SyncKind::Incremental);
    }
}
