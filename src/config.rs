///! Device configuration: chip variants, init parameters, static register fields

use crate::{ constants::*, register::*, refin::* };


/// Chip variants sharing the ADF5355 register layout.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
#[allow(non_camel_case_types)]
pub enum Variant {
    Adf5355,
    Adf4355,
    Adf4355_2,
    Adf4355_3,
    Adf4356,
    Adf5356,
}

impl Variant {
    /// Minimum fundamental VCO frequency
    pub fn vco_min(self: Self) -> u64 {
        match self {
            Variant::Adf4355_3 => VCO_FREQ_MIN_4355_3,
            _ => VCO_FREQ_MIN,
        }
    }

    /// Maximum fundamental VCO frequency
    pub fn vco_max(self: Self) -> u64 {
        match self {
            Variant::Adf4355_3 => VCO_FREQ_MAX_4355_3,
            _ => VCO_FREQ_MAX,
        }
    }

    /// RFoutA lower bound, minimum VCO through the divide-by-64
    pub fn out_min(self: Self) -> u64 {
        self.vco_min() >> RF_DIVIDER_MAX_SELECT
    }

    /// RFoutA upper bound
    pub fn out_max(self: Self) -> u64 {
        match self {
            Variant::Adf4355_2 => OUT_FREQ_MAX_4355_2,
            v => v.vco_max(),
        }
    }

    /// RFoutB (doubled VCO) band, only on the parts with a doubler output
    pub fn outb_range(self: Self) -> Option<(u64, u64)> {
        if self.has_doubled_output() {
            Some((self.vco_min() * 2, self.vco_max() * 2))
        } else {
            None
        }
    }

    /// ADF5355 / ADF5356 have RFoutB fed from a VCO doubler
    pub fn has_doubled_output(self: Self) -> bool {
        matches!(self, Variant::Adf5355 | Variant::Adf5356)
    }

    /// Logical output channels: RFoutA, plus the doubled RFoutB where present
    pub fn num_channels(self: Self) -> u8 {
        if self.has_doubled_output() { 2 } else { 1 }
    }

    /// 28-bit MOD2 / FRAC2 split over R2 and R13
    pub fn has_extended_modulus(self: Self) -> bool {
        matches!(self, Variant::Adf4356 | Variant::Adf5356)
    }

    /// Registers present on the part, R0 up to R12 or R13
    pub fn num_regs(self: Self) -> u8 {
        if self.has_extended_modulus() { 14 } else { 13 }
    }

    pub fn max_modulus2(self: Self) -> u32 {
        if self.has_extended_modulus() { MAX_MODULUS2_EXT } else { MAX_MODULUS2 }
    }

    pub fn max_pfd(self: Self) -> u32 {
        if self.has_extended_modulus() { PFD_FREQ_MAX_HIGH } else { PFD_FREQ_MAX }
    }

    /// Band select clock target, VCO_BAND_DIV = ceil(PFD / this)
    fn vco_band_clock(self: Self) -> u32 {
        if self.has_extended_modulus() { 1_600_000 } else { 2_400_000 }
    }
}


/// Logical output channel
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Channel {
    /// RFoutA, VCO through the output divider
    RfOutA,
    /// RFoutB, doubled VCO (ADF5355 / ADF5356)
    RfOutB,
}

impl Channel {
    #[inline]
    pub fn index(self: Self) -> u8 {
        match self {
            Channel::RfOutA => 0,
            Channel::RfOutB => 1,
        }
    }
}

impl core::convert::TryFrom<u8> for Channel {
    type Error = crate::errors::Error;

    fn try_from(i: u8) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(Channel::RfOutA),
            1 => Ok(Channel::RfOutB),
            _ => Err(crate::errors::Error::InvalidChannel),
        }
    }
}


/// Init parameters.
#[derive(Debug,Copy,Clone)]
pub struct Config {
    pub variant: Variant,

    /// REFin frequency, Hz
    pub ref_in_hz: u32,
    pub ref_doubler: bool,
    pub ref_div2: bool,
    pub ref_mode: RefMode,

    /// Startup frequency and the channel it applies to
    pub freq_hz: u64,
    pub channel: Channel,

    /// Charge pump current the loop filter is designed for, uA
    pub cp_current_ua: u32,
    pub cp_negative_bleed: bool,
    pub cp_gated_bleed: bool,
    pub cp_bleed_polarity: BleedPolarity,
    pub pd_polarity: PhaseDetectorPolarity,

    pub muxout: Muxout,
    pub mux_logic: MuxLogic,

    pub outa_enable: bool,
    /// 0 (−4 dBm) to 3 (+5 dBm)
    pub outa_power: u8,
    pub outb_enable: bool,
    /// ADF4355 / ADF4356 only
    pub outb_power: u8,
    pub mute_till_lock: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            variant: Variant::Adf5355,
            ref_in_hz: 122_880_000,
            ref_doubler: false,
            ref_div2: false,
            ref_mode: RefMode::SingleEnded,
            freq_hz: 2_500_000_000,
            channel: Channel::RfOutA,
            cp_current_ua: 900,
            cp_negative_bleed: true,
            cp_gated_bleed: false,
            cp_bleed_polarity: BleedPolarity::Negative,
            pd_polarity: PhaseDetectorPolarity::Positive,
            muxout: Muxout::DigitalLock,
            mux_logic: MuxLogic::V3_3,
            outa_enable: true,
            outa_power: 3,
            outb_enable: false,
            outb_power: 0,
            mute_till_lock: false,
        }
    }
}


// Datasheet recommended values, reserved bits included
const R5_DEFAULT: u32 = 0x0080_0025;
const R6_DEFAULT: u32 = 0x1400_0006;
const R7_DEFAULT: u32 = 0x0400_0007;
const R8_DEFAULT: u32 = 0x102D_0428;
const R8_DEFAULT_EXT: u32 = 0x1559_6568;
const R10_DEFAULT: u32 = 0x00C0_000A;
const R11_DEFAULT: u32 = 0x0061_300B;
const R11_DEFAULT_EXT: u32 = 0x0061_200B;
const R12_DEFAULT: u32 = 0x0000_041C;
const R12_DEFAULT_EXT: u32 = 0x0000_05FC;

/// Charge pump current code: round((I − 315) / 315), clamped to 4 bits
pub fn cp_current_code(cp_current_ua: u32) -> u8 {
    let step = CP_CURRENT_STEP_UA;
    let code = (cp_current_ua.saturating_sub(step) + step / 2) / step;
    code.min(15) as u8
}

/// Actual charge pump current for a code, uA
pub fn cp_current_ua(code: u8) -> u32 {
    (code as u32 + 1) * CP_CURRENT_STEP_UA
}

/// ADC clock divider, keeps the ADC clock at or below 100 kHz
pub fn adc_clock_div(pfd: u32) -> u8 {
    let div = (pfd / 100_000).saturating_sub(2);
    div_ceil(div, 4).max(1).min(255) as u8
}

/// Settling delay: 16 ADC clock cycles, rounded up to the next microsecond
pub fn settle_us(pfd: u32, adc_div: u8) -> u32 {
    let adc_clk = pfd / (4 * adc_div as u32 + 2);
    div_ceil(16_000_000, adc_clk.max(1))
}

/// Lock detect / ALC timeouts for R9
pub fn timeouts(pfd: u32) -> (u16, u8, u8) {
    let timeout = div_ceil(pfd, 20_000 * 30).max(1).min(1023);
    let synth_lock = div_ceil(pfd * 2, 100_000 * timeout).min(31);
    let alc = div_ceil(pfd * 5, 100_000 * timeout).min(31);
    (timeout as u16, synth_lock as u8, alc as u8)
}

/// Integer division rounding up
#[inline]
pub fn div_ceil(n: u32, d: u32) -> u32 {
    (n + d - 1) / d
}

impl Config {

    /// Static part of the register image. INT / FRAC / MOD2 and the
    /// divider select are filled in by the frequency computation.
    pub fn register_set(self: &Self, refin: &RefIn) -> RegisterSet {
        let v = self.variant;
        let pfd = refin.f_pfd();
        let ext = v.has_extended_modulus();

        let mut rs = RegisterSet::default();
        rs.r5 = Reg::from_word(R5_DEFAULT);
        rs.r6 = Reg::from_word(R6_DEFAULT);
        rs.r7 = Reg::from_word(R7_DEFAULT);
        rs.r8 = Reg::from_word(if ext { R8_DEFAULT_EXT } else { R8_DEFAULT });
        rs.r10 = Reg::from_word(R10_DEFAULT);
        rs.r11 = Reg::from_word(if ext { R11_DEFAULT_EXT } else { R11_DEFAULT });
        rs.r12 = Reg::from_word(if ext { R12_DEFAULT_EXT } else { R12_DEFAULT });

        let rs = rs
            // FRAC-N, autocal on every R0 write
            .set(Autocal::Enabled)

            .set(SdLoadReset::Disabled)
            .set(PhaseResync::Disabled)
            .set(PhaseAdjust::Disabled)
            .set(Phase(0))

            .set(CounterReset::Disabled)
            .set(ChargePumpThreeState::Disabled)
            .set(PowerDown::Disabled)
            .set(self.pd_polarity)
            .set(self.mux_logic)
            .set(self.ref_mode)
            .set(ChargePumpCurrent(cp_current_code(self.cp_current_ua)))
            .set(DoubleBuffer::Enabled)
            .set(R(refin.r))
            .set(Rdiv2::from(refin.divider))
            .set(RefDoubler::from(refin.doubler))
            .set(self.muxout)

            .set(OutputPower(self.outa_power))
            .set(RfOutputEnable::from(self.outa_enable))
            .set(MuteTillLockDetect::from(self.mute_till_lock))
            .set(FeedbackSelect::Fundamental)
            .set(NegativeBleed::from(self.cp_negative_bleed))
            .set(GatedBleed::from(self.cp_gated_bleed));

        let rs = if v.has_doubled_output() {
            rs.set(RfOutBPowerDown::from(!self.outb_enable))
        } else {
            rs.set(AuxOutputPower(self.outb_power))
              .set(AuxOutputEnable::from(self.outb_enable))
        };

        let rs = if ext { rs.set(self.cp_bleed_polarity) } else { rs };

        let rs = rs
            .set(LdMode::FracN)
            .set(FracNLdPrecision(3))
            .set(LolMode::Disabled)
            .set(LdCycleCount(0))
            .set(LeSync::Enabled);

        let (timeout, synth_lock, alc) = timeouts(pfd);
        let rs = rs
            .set(Timeout(timeout))
            .set(SynthLockTimeout(synth_lock))
            .set(AlcTimeout(alc))
            .set(VcoBandDiv(div_ceil(pfd, v.vco_band_clock()).min(255) as u8));

        let rs = rs
            .set(AdcEnable::Enabled)
            .set(AdcConversion::Enabled)
            .set(AdcClockDiv(adc_clock_div(pfd)));

        if ext {
            rs.set(ResyncClockDivExt(1))
        } else {
            rs.set(ResyncClockDiv(1))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_pump_code_is_clamped() {
        assert_eq!(cp_current_code(0), 0);
        assert_eq!(cp_current_code(315), 0);
        assert_eq!(cp_current_code(900), 2);
        assert_eq!(cp_current_code(5040), 15);
        assert_eq!(cp_current_code(20_000), 15);
        assert_eq!(cp_current_ua(2), 945);
    }

    #[test]
    fn adc_and_settle_at_61_44mhz() {
        // 614 / 4 rounded up
        let div = adc_clock_div(61_440_000);
        assert_eq!(div, 153);
        // ADC clock 100065 Hz, 16 cycles is 159.9 us
        assert_eq!(settle_us(61_440_000, div), 160);
    }

    #[test]
    fn adc_div_floor_for_low_pfd() {
        assert_eq!(adc_clock_div(100_000), 1);
        assert_eq!(adc_clock_div(10_000), 1);
    }

    #[test]
    fn r9_timeouts() {
        let (t, s, a) = timeouts(61_440_000);
        assert_eq!(t, 103);
        assert_eq!(s, 12);
        assert_eq!(a, 30);
    }

    #[test]
    fn variant_bands() {
        assert_eq!(Variant::Adf5355.out_min(), 53_125_000);
        assert_eq!(Variant::Adf4355_3.out_min(), 51_562_500);
        assert_eq!(Variant::Adf4355_2.out_max(), 4_400_000_000);
        assert_eq!(Variant::Adf5355.outb_range(), Some((6_800_000_000, 13_600_000_000)));
        assert_eq!(Variant::Adf4356.outb_range(), None);
        assert_eq!(Variant::Adf5356.num_regs(), 14);
        assert_eq!(Variant::Adf4355.num_channels(), 1);
    }
}
