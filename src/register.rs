//! ADF5355 family registers
//!
//! Every register is a 32-bit word, the low 4 bits (DB3:DB0) carry the
//! register address. Bit fields are typed, one type per field, tied to the
//! register they live in via a marker type.

use core::marker::PhantomData;

/// Number of register slots, R0..R13 (R13 only exists on ADF5356 / ADF4356)
pub const NUM_REGS: usize = 14;

/// Control bits mask
pub const ADDR_MASK: u32 = 0xF;

/// Register number marker types
macro_rules! gen_register_marker {
    ($r:ident, $n:tt) => {
        /// Register marker
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub struct $r {}

        impl Addr for $r { const ADDR: u8 = $n; }

        impl Default for Reg<$r> { #[inline] fn default() -> Self { Reg::from_word($n) } }
    }
}

/// Register address, 0 to 13
pub trait Addr {
    const ADDR: u8;
}

gen_register_marker!(R0, 0);
gen_register_marker!(R1, 1);
gen_register_marker!(R2, 2);
gen_register_marker!(R3, 3);
gen_register_marker!(R4, 4);
gen_register_marker!(R5, 5);
gen_register_marker!(R6, 6);
gen_register_marker!(R7, 7);
gen_register_marker!(R8, 8);
gen_register_marker!(R9, 9);
gen_register_marker!(R10, 10);
gen_register_marker!(R11, 11);
gen_register_marker!(R12, 12);
gen_register_marker!(R13, 13);


/// Single config register
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Reg<R> {
    /// Config register word
    pub w: u32,
    phantom: PhantomData<R>,
}

/// Bit operations on 32bit words
impl<R> Reg<R> {
    /// Wraps a raw word, control bits are not touched
    #[inline]
    pub fn from_word(w: u32) -> Self {
        Reg { w, phantom: PhantomData }
    }

    #[inline]
    pub fn get<F>(self: &Self) -> F
    where F: Sized + BitField<R> + From<u32>
    {
        F::from(
            (self.w >> F::offset()) & F::mask()
        )
    }

    #[inline]
    pub fn set<F>(mut self: Self, f: F) -> Self
    where F: Sized + BitField<R>,
          u32: From<F>,
    {
        let fbits = (u32::from(f) & F::mask()) << F::offset();
        let rbits = self.w & (! ( F::mask() << F::offset() ));
        self.w = rbits | fbits;
        self
    }
}

impl<R: Addr> Reg<R> {
    /// Word as it goes out on the wire, address in the control bits
    #[inline]
    pub fn word(self: &Self) -> u32 {
        (self.w & !ADDR_MASK) | R::ADDR as u32
    }
}


/// Full set of config registers.
///
/// After power-up the part requires all registers to be written, highest
/// address first, R0 last. A write to R0 latches the double buffered
/// fields and starts the VCO band auto-calibration.
#[derive(Debug,Copy,Clone,Default,PartialEq,Eq)]
pub struct RegisterSet {
    pub r0: Reg<R0>,
    pub r1: Reg<R1>,
    pub r2: Reg<R2>,
    pub r3: Reg<R3>,
    pub r4: Reg<R4>,
    pub r5: Reg<R5>,
    pub r6: Reg<R6>,
    pub r7: Reg<R7>,
    pub r8: Reg<R8>,
    pub r9: Reg<R9>,
    pub r10: Reg<R10>,
    pub r11: Reg<R11>,
    pub r12: Reg<R12>,
    pub r13: Reg<R13>,
}

/// Type-indexed register access
pub trait RIdx<R> {
    fn r(self: &Self) -> Reg<R>;
    fn update_r<F>(self: Self, f: F) -> Self where F: FnOnce(Reg<R>) -> Reg<R>;
}

macro_rules! gen_register_index {
    ($r:ident, $f:tt) => {
        impl RIdx<$r> for RegisterSet {
            #[inline]
            fn r(self: &Self) -> Reg<$r> { self.$f }
            #[inline]
            fn update_r<F>(mut self: Self, f: F) -> Self where F: FnOnce(Reg<$r>) -> Reg<$r> {
                self.$f = f(self.$f);
                self
            }
        }
    }
}

gen_register_index!(R0, r0);
gen_register_index!(R1, r1);
gen_register_index!(R2, r2);
gen_register_index!(R3, r3);
gen_register_index!(R4, r4);
gen_register_index!(R5, r5);
gen_register_index!(R6, r6);
gen_register_index!(R7, r7);
gen_register_index!(R8, r8);
gen_register_index!(R9, r9);
gen_register_index!(R10, r10);
gen_register_index!(R11, r11);
gen_register_index!(R12, r12);
gen_register_index!(R13, r13);


impl RegisterSet {

    /// Register values in device format, index == address.
    #[inline]
    pub fn to_words(self: &Self) -> [u32; NUM_REGS] {
        [
            self.r0.word(), self.r1.word(), self.r2.word(), self.r3.word(),
            self.r4.word(), self.r5.word(), self.r6.word(), self.r7.word(),
            self.r8.word(), self.r9.word(), self.r10.word(), self.r11.word(),
            self.r12.word(), self.r13.word(),
        ]
    }

    /// Wire word of the register at `addr`
    #[inline]
    pub fn word(self: &Self, addr: u8) -> u32 {
        self.to_words()[addr as usize]
    }

    /// Get register bitfield value
    #[inline]
    pub fn get<F,R>(self: &Self) -> F
    where F: Sized + BitField<R> + From<u32>,
          Self: RIdx<R>
    {
        <Self as RIdx<R>>::r(self).get()
    }

    /// Update register bitfield
    #[inline]
    pub fn set<F,R>(self: Self, f: F) -> Self
    where F: Sized + BitField<R>,
          u32: From<F>,
          Self: RIdx<R>
    {
        <Self as RIdx<R>>::update_r(self, |r| r.set(f))
    }
}



/// Bit operations on 32bit words
pub trait BitField<R> {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;

    #[inline]
    fn mask() -> u32 {
        !(0xFFFFFFFFu32 << Self::num_bits())
    }
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
	($r:ty, $n:ident, $nb:tt, $off:tt) => {
        impl BitField<$r> for $n {
            #[inline] fn num_bits() -> u8 { $nb }
            #[inline] fn offset() -> u8 { $off }
        }
    }
}

/// Small bitfield-encoded numbes boilerplate
macro_rules! gen_bitfield_struct {
	($(#[$meta:meta])*, $r:ty, $n:ident, $v:ty, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub struct $n(pub $v);

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u32> for $n { #[inline] fn from(x: u32) -> Self { $n(x as $v) } }
        impl From<$n> for u32 { #[inline] fn from(x: $n) -> u32 { x.0 as u32 } }
	};
}

/// Enumerated bitfield, every bit pattern of the field must be listed
macro_rules! gen_bitfield_enum {
	($(#[$meta:meta])*, $r:ty, $n:ident, $nb:tt, $off:tt, { $($(#[$vmeta:meta])* $v:ident = $val:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub enum $n {
            $($(#[$vmeta])* $v = $val),+
        }

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u32> for $n {
            #[inline]
            fn from(x: u32) -> Self {
                match x & <$n as BitField<$r>>::mask() {
                    $($val => $n::$v,)+
                    _ => unreachable!(),
                }
            }
        }
        impl From<$n> for u32 { #[inline] fn from(x: $n) -> u32 { x as u32 } }
    }
}

/// Single bit on/off switch
macro_rules! gen_bitfield_flag {
	($(#[$meta:meta])*, $r:ty, $n:ident, $off:tt) => {
        gen_bitfield_enum!($(#[$meta])*, $r, $n, 1, $off, { Disabled = 0, Enabled = 1 });

        impl From<bool> for $n {
            #[inline]
            fn from(on: bool) -> Self { if on { $n::Enabled } else { $n::Disabled } }
        }
    }
}


// Register 0

gen_bitfield_struct!(
    /// The 16 INT bits (Bits[DB19:DB4]) set the INT value, which
    /// determines the integer part of the feedback division factor.
    /// All integer values from 23 to 32,767 are allowed for the 4/5
    /// prescaler. For the 8/9 prescaler, the minimum integer value is 75.
    , R0, Int, u16, 16, 4
);

gen_bitfield_enum!(
    /// The dual-modulus prescaler (P/P + 1), along with the INT,
    /// FRAC, and MOD values, determines the overall division
    /// ratio from the VCO output to the PFD input. The PR1 bit
    /// (DB20) in Register 0 sets the prescaler value.
    ,R0, Prescaler, 1, 20, {
        /// Prescaler = 4/5: INT N MIN = 23
        P45 = 0,
        /// Prescaler = 8/9: INT N MIN = 75
        P89 = 1,
    }
);

gen_bitfield_flag!(
    /// Write Register 0 with DB21 = 1 to enable VCO auto calibration.
    /// Disabling auto calibration is only useful to load R0 without
    /// starting a band selection, as done by the frequency update sequence.
    , R0, Autocal, 21
);


// Register 1

gen_bitfield_struct!(
    /// The 24 FRAC1 bits (Bits[DB27:DB4]) set the numerator of the
    /// fraction that is input to the Σ-Δ modulator. FRAC1 values from
    /// 0 to (MOD1 − 1) are allowed, MOD1 is fixed at 2^24.
    , R1, Frac1, u32, 24, 4
);


// Register 2

gen_bitfield_struct!(
    /// The 14 LSBs of the auxiliary fractional value (FRAC2)
    , R2, Frac2Lsb, u16, 14, 18
);

gen_bitfield_struct!(
    /// The 14 LSBs of the auxiliary modulus value (MOD2)
    , R2, Mod2Lsb, u16, 14, 4
);


// Register 3

gen_bitfield_flag!(
    /// Setting DB30 enables the SD load reset on R0 writes
    , R3, SdLoadReset, 30
);

gen_bitfield_flag!(
    /// Phase resync, requires the R12 clock divider to be programmed
    , R3, PhaseResync, 29
);

gen_bitfield_flag!(
    /// Phase adjust, the phase word is added on every R0 write
    , R3, PhaseAdjust, 28
);

gen_bitfield_struct!(
    /// 24-bit phase word, output phase = 360° × PHASE / 2^24
    , R3, Phase, u32, 24, 4
);


// Register 4

gen_bitfield_enum!(
    /// The on-chip multiplexer is controlled by Bits[DB29:DB27].
    ,R4, Muxout, 3, 27, {
        ThreeStateOut = 0,
        Dvdd = 1,
        Dgnd = 2,
        RDivOut = 3,
        NDivOut = 4,
        AnalogLock = 5,
        DigitalLock = 6,
        Reserved = 7,
    }
);

gen_bitfield_flag!(
    /// Setting DB26 multiplies REFin by 2 before the R counter.
    , R4, RefDoubler, 26
);

gen_bitfield_flag!(
    /// Setting DB25 inserts a divide-by-2 toggle flip-flop between the R counter and the PFD.
    , R4, Rdiv2, 25
);

gen_bitfield_struct!(
    /// The 10-bit R counter (Bits[DB24:DB15]) divides REFin down
    /// to produce the PFD reference clock. Ratios from 1 to 1023.
    , R4, R, u16, 10, 15
);

gen_bitfield_flag!(
    /// DB14 enables double buffering of the RF divider select bits in R6.
    /// Buffered values load on the next R0 write.
    , R4, DoubleBuffer, 14
);

gen_bitfield_struct!(
    /// Charge Pump Current Setting
    /// Bits[DB13:DB10], 0.31 mA per step, code 0 is 0.31 mA, code 15 is 5 mA.
    , R4, ChargePumpCurrent, u8, 4, 10
);

gen_bitfield_enum!(
    /// DB9 selects single ended or differential REFin.
    ,R4, RefMode, 1, 9, {
        SingleEnded = 0,
        Differential = 1,
    }
);

gen_bitfield_enum!(
    /// DB8 sets MUXOUT logic levels.
    ,R4, MuxLogic, 1, 8, {
        V1_8 = 0,
        V3_3 = 1,
    }
);

gen_bitfield_enum!(
    /// DB7 sets the phase detector polarity. Positive for passive or
    /// noninverting active loop filters.
    ,R4, PhaseDetectorPolarity, 1, 7, {
        Negative = 0,
        Positive = 1,
    }
);

gen_bitfield_flag!(
    /// Software power-down, the part retains register contents.
    , R4, PowerDown, 6
);

gen_bitfield_flag!(
    /// Puts the charge pump into three-state mode.
    , R4, ChargePumpThreeState, 5
);

gen_bitfield_flag!(
    /// Holds the RF synthesizer N and R counters in reset.
    , R4, CounterReset, 4
);


// Register 6

gen_bitfield_enum!(
    /// DB31 sets the bleed current polarity (ADF5356 / ADF4356 only).
    ,R6, BleedPolarity, 1, 31, {
        Negative = 0,
        Positive = 1,
    }
);

gen_bitfield_flag!(
    /// Gated bleed, bleed current only flows once the part is locked
    , R6, GatedBleed, 30
);

gen_bitfield_flag!(
    /// Negative bleed current, recommended for fractional-N operation
    , R6, NegativeBleed, 29
);

gen_bitfield_enum!(
    /// DB24 selects the feedback from the VCO output to the N counter.
    ,R6, FeedbackSelect, 1, 24, {
        Divided = 0,
        Fundamental = 1,
    }
);

gen_bitfield_struct!(
    /// RF Divider Select
    /// Bits[DB23:DB21] select the RF output divider, 1 to 64.
    , R6, RfDividerSelect, u8, 3, 21
);

gen_bitfield_struct!(
    /// Charge pump bleed current, Bits[DB20:DB13], 3.75 uA per step.
    , R6, BleedCurrent, u8, 8, 13
);

gen_bitfield_flag!(
    /// Mute the RF outputs until lock detect goes high
    , R6, MuteTillLockDetect, 11
);

gen_bitfield_flag!(
    /// RFoutB power down (ADF5355 / ADF5356), set to turn the doubled output off
    , R6, RfOutBPowerDown, 10
);

gen_bitfield_flag!(
    /// RFoutB enable (ADF4355 / ADF4356)
    , R6, AuxOutputEnable, 9
);

gen_bitfield_struct!(
    /// RFoutB power (ADF4355 / ADF4356), −4 dBm to +5 dBm in 3 dB steps
    , R6, AuxOutputPower, u8, 2, 7
);

gen_bitfield_flag!(
    /// RFoutA enable
    , R6, RfOutputEnable, 6
);

gen_bitfield_struct!(
    /// RFoutA power, −4 dBm to +5 dBm in 3 dB steps
    , R6, OutputPower, u8, 2, 4
);


// Register 7

gen_bitfield_flag!(
    /// LE synchronized to the falling edge of REFin
    , R7, LeSync, 25
);

gen_bitfield_struct!(
    /// Lock detect cycle count, 1024 << n PFD cycles
    , R7, LdCycleCount, u8, 2, 8
);

gen_bitfield_flag!(
    /// Loss of lock mode, for applications where REFin may be removed
    , R7, LolMode, 7
);

gen_bitfield_struct!(
    /// Fractional-N lock detect precision, 5 ns to 12 ns window
    , R7, FracNLdPrecision, u8, 2, 5
);

gen_bitfield_enum!(
    /// DB4 selects the lock detect mode.
    ,R7, LdMode, 1, 4, {
        FracN = 0,
        IntN = 1,
    }
);


// Register 9

gen_bitfield_struct!(
    /// VCO band division, the band select clock is PFD / VCO_BAND_DIV
    , R9, VcoBandDiv, u8, 8, 24
);

gen_bitfield_struct!(
    /// Timeout, shared by the ALC and synthesizer lock waits
    , R9, Timeout, u16, 10, 14
);

gen_bitfield_struct!(
    /// ALC wait, in units of Timeout
    , R9, AlcTimeout, u8, 5, 9
);

gen_bitfield_struct!(
    /// Synthesizer lock timeout, in units of Timeout
    , R9, SynthLockTimeout, u8, 5, 4
);


// Register 10

gen_bitfield_struct!(
    /// ADC clock divider, ADC clock = PFD / (4 × div + 2)
    , R10, AdcClockDiv, u8, 8, 6
);

gen_bitfield_flag!(
    /// Start an ADC conversion on every R10 write
    , R10, AdcConversion, 5
);

gen_bitfield_flag!(
    /// Powers up the ADC used for VCO temperature compensation
    , R10, AdcEnable, 4
);


// Register 12

gen_bitfield_struct!(
    /// Phase resync clock divider (ADF5355 / ADF4355)
    , R12, ResyncClockDiv, u16, 16, 16
);

gen_bitfield_struct!(
    /// Phase resync clock divider, 20 bit wide (ADF5356 / ADF4356)
    , R12, ResyncClockDivExt, u32, 20, 12
);


// Register 13, 28-bit MOD2 / FRAC2 parts only

gen_bitfield_struct!(
    /// The 14 MSBs of FRAC2
    , R13, Frac2Msb, u16, 14, 18
);

gen_bitfield_struct!(
    /// The 14 MSBs of MOD2
    , R13, Mod2Msb, u16, 14, 4
);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_does_not_touch_neighbours() {
        let rs = RegisterSet::default()
            .set(Int(0xFFFF))
            .set(Prescaler::P89)
            .set(Autocal::Enabled);
        assert_eq!(rs.r0.word(), 0x003F_FFF0);

        let rs = rs.set(Int(100));
        let int: Int = rs.get();
        let pr: Prescaler = rs.get();
        assert_eq!(int, Int(100));
        assert_eq!(pr, Prescaler::P89);
    }

    #[test]
    fn address_lands_in_control_bits() {
        let words = RegisterSet::default().to_words();
        for (i, w) in words.iter().enumerate() {
            assert_eq!(*w, i as u32);
        }

        // stray low bits in the image never leak into the address
        let r6 = Reg::<R6>::from_word(0x1400_000F);
        assert_eq!(r6.word(), 0x1400_0006);
    }

    #[test]
    fn r4_layout() {
        let rs = RegisterSet::default()
            .set(Muxout::DigitalLock)
            .set(RefDoubler::Disabled)
            .set(Rdiv2::Disabled)
            .set(R(2))
            .set(DoubleBuffer::Enabled)
            .set(ChargePumpCurrent(2))
            .set(MuxLogic::V3_3)
            .set(PhaseDetectorPolarity::Positive);
        assert_eq!(rs.r4.word(), 0x3001_4984);
    }

    #[test]
    fn enum_decodes_every_pattern() {
        for x in 0..8u32 {
            let m = Muxout::from(x);
            assert_eq!(u32::from(m), x);
        }
        assert_eq!(CounterReset::from(true), CounterReset::Enabled);
    }
}
