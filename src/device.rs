///! Device pins and the frequency facade

use core::convert::TryFrom;

use embedded_hal:: {
    digital::v2::OutputPin,
    blocking::{ delay::*, spi::*, },
};
use log::{debug, trace, warn};

use crate::config::*;
use crate::errors::*;
use crate::frequency::*;
use crate::refin::*;
use crate::register::*;
use crate::sequence::*;

/// ADF5355 family device.
///
/// Owns the bus and the pins for its whole life, the register image is
/// the single source of truth for what the part should be running.
pub struct Adf5355<CE, LE, SPI> {
    spi: SPI,
    pin_ce: CE,
    pin_le: LE,

    variant: Variant,
    refin: RefIn,
    fracn: FracN,
    cp_current_ua: u32,
    settle_us: u32,

    regs: RegisterSet,
    /// Last word written to each address
    hw: [u32; NUM_REGS],
    all_synced: bool,

    freq_req: u64,
    channel: Channel,
}


impl<CE, LE, SPI,> Adf5355<CE, LE, SPI,>
where CE: OutputPin,
      LE: OutputPin,
      SPI: Write<u8>,
{
    /// Creates and configures the device, then tunes to the startup frequency.
    ///
    /// `spi` - SPI device (`MOSI` => `DATA`, `CLK` => `CLK`, `CPHA` = 0)
    /// `pin_ce` - "chip enable" pin
    /// `pin_le` - "load enable" pin
    ///
    /// Picks the R counter that gets the highest PFD frequency the variant
    /// allows, derives charge pump, timeouts and ADC clock from it, then
    /// writes every register.
    pub fn init<Delay>(
        spi: SPI,
        pin_ce: CE,
        pin_le: LE,
        delay: &mut Delay,
        config: Config,
    ) -> Result<Self, Error>
    where Delay: DelayUs<u32>,
    {
        let variant = config.variant;
        let refin = RefIn::maximize_pfd(
            config.ref_in_hz,
            config.ref_doubler,
            config.ref_div2,
            variant.max_pfd(),
        )?;
        let pfd = refin.f_pfd();

        let cp_code = cp_current_code(config.cp_current_ua);
        let adc_div = adc_clock_div(pfd);

        let mut dev = Adf5355 {
            spi,
            pin_ce,
            pin_le,
            variant,
            refin,
            fracn: FracN::new(variant, pfd),
            cp_current_ua: cp_current_ua(cp_code),
            settle_us: settle_us(pfd, adc_div),
            regs: config.register_set(&refin),
            hw: [0; NUM_REGS],
            all_synced: false,
            freq_req: 0,
            channel: config.channel,
        };

        debug!("{:?}: PFD {} Hz, CP {} uA, settle {} us", variant, pfd, dev.cp_current_ua, dev.settle_us);

        // startup channel and frequency are checked before the pins move
        dev.stage_rate(config.channel.index(), config.freq_hz)?;

        dev.load_disable()?;
        dev.enable()?;
        dev.sync(delay, false)?;
        Ok(dev)
    }

    /// Tunes `channel` (0 = RFoutA, 1 = RFoutB) to `f_hz`.
    ///
    /// Validation happens before anything is touched, a rejected request
    /// leaves the device as it was. The first call after init pushes every
    /// register, later calls run the frequency update sequence. A retune
    /// that moves the RF divider select or the bleed current (both in R6)
    /// falls back to writing every register.
    pub fn set_rate<Delay>(
        self: &mut Self,
        delay: &mut Delay,
        channel: u8,
        f_hz: u64,
    ) -> Result<(), Error>
    where Delay: DelayUs<u32>,
    {
        self.stage_rate(channel, f_hz)?;
        self.sync(delay, false)
    }

    /// Validates the request and updates the register image, no bus access.
    fn stage_rate(self: &mut Self, channel: u8, f_hz: u64) -> Result<(), Error> {
        let ch = self.channel(channel)?;
        let params = self.fracn.compute(ch, f_hz).map_err(|e| {
            warn!("rejected {} Hz on channel {}: {}", f_hz, channel, e);
            e
        })?;

        self.regs = params
            .set(self.regs, self.variant.has_extended_modulus())
            .set(BleedCurrent(bleed_current(self.cp_current_ua, params.integer)));
        self.freq_req = f_hz;
        self.channel = ch;
        Ok(())
    }

    /// Actual frequency of `channel`, computed back from the register image.
    pub fn recalc_rate(self: &Self, channel: u8) -> Result<u64, Error> {
        let ch = self.channel(channel)?;
        let params = self.params();
        Ok(self.fracn.f_out_hz(ch, &params))
    }

    /// Returns `f_hz` as is.
    ///
    /// NOTE this does not look for the nearest frequency the modulus can
    /// hit, `recalc_rate` after `set_rate` gives the real value.
    pub fn round_rate(self: &Self, f_hz: u64) -> u64 {
        f_hz
    }

    /// Pushes the whole register image again.
    /// Use after a bus error left the part in an unknown state.
    pub fn resync<Delay>(self: &mut Self, delay: &mut Delay) -> Result<(), Error>
    where Delay: DelayUs<u32>,
    {
        self.sync(delay, true)
    }

    /// Turns one RF output on or off, only R6 is written.
    pub fn set_output_enabled<Delay>(
        self: &mut Self,
        delay: &mut Delay,
        channel: u8,
        enabled: bool,
    ) -> Result<(), Error>
    where Delay: DelayUs<u32>,
    {
        self.regs = match self.channel(channel)? {
            Channel::RfOutA => self.regs.set(RfOutputEnable::from(enabled)),
            Channel::RfOutB => self.regs.set(RfOutBPowerDown::from(!enabled)),
        };
        let w = self.regs.r6.word();
        self.write_tracked(delay, w)
    }

    /// Software power-down through R4, register contents are retained.
    pub fn power_down<Delay>(self: &mut Self, delay: &mut Delay, down: bool) -> Result<(), Error>
    where Delay: DelayUs<u32>,
    {
        self.regs = self.regs.set(PowerDown::from(down));
        let w = self.regs.r4.word();
        self.write_tracked(delay, w)
    }

    /// Powers down the device and hands the bus and pins back.
    pub fn release(mut self: Self) -> Result<(SPI, CE, LE), Error> {
        self.disable()?;
        Ok((self.spi, self.pin_ce, self.pin_le))
    }

    pub fn variant(self: &Self) -> Variant { self.variant }

    pub fn refin(self: &Self) -> &RefIn { &self.refin }

    /// Phase Frequency Detector' frequency, Hz
    pub fn pfd(self: &Self) -> u32 { self.fracn.pfd }

    /// Delay before the final R0 write, us
    pub fn settle_us(self: &Self) -> u32 { self.settle_us }

    /// Effective charge pump current, uA
    pub fn cp_current_ua(self: &Self) -> u32 { self.cp_current_ua }

    /// In-memory register image
    pub fn registers(self: &Self) -> &RegisterSet { &self.regs }

    /// True once the full register image has been written
    pub fn all_synced(self: &Self) -> bool { self.all_synced }

    /// Last requested frequency and its channel
    pub fn requested(self: &Self) -> (u64, Channel) { (self.freq_req, self.channel) }

    /// Current divider values
    pub fn params(self: &Self) -> FracNParams {
        FracNParams::from_registers(&self.regs, self.variant.has_extended_modulus())
    }

    fn channel(self: &Self, channel: u8) -> Result<Channel, Error> {
        if channel >= self.variant.num_channels() {
            return Err(Error::InvalidChannel);
        }
        Channel::try_from(channel)
    }

    /// Runs the full or the frequency update write sequence.
    /// A failed write aborts the sequence, nothing is rolled back.
    fn sync<Delay>(self: &mut Self, delay: &mut Delay, force_full: bool) -> Result<(), Error>
    where Delay: DelayUs<u32>,
    {
        let num_regs = self.variant.num_regs();
        let seq = if force_full {
            Sequence::full(&self.regs, num_regs, self.settle_us)
        } else {
            Sequence::plan(&self.regs, &self.hw, self.all_synced, num_regs, self.settle_us)
        };

        debug!("{:?} sync, {} steps", seq.kind, seq.steps().len());

        for step in &seq {
            match *step {
                Step::Write(w) => self.write_tracked(delay, w)?,
                Step::Settle(us) => delay.delay_us(us),
            }
        }

        if seq.kind == SyncKind::Full {
            self.all_synced = true;
        }
        Ok(())
    }

    fn write_tracked<Delay>(self: &mut Self, delay: &mut Delay, w: u32) -> Result<(), Error>
    where Delay: DelayUs<u32>,
    {
        self.write_register(delay, w)?;
        self.hw[(w & ADDR_MASK) as usize] = w;
        Ok(())
    }

    /// Data is clocked into the 32-bit shift register
    /// on each rising edge of CLK. The data is clocked in MSB first.
    ///
    /// Blocking implementation.
    ///
    /// Data is transferred from the shift register to one of fourteen latches
    /// on the rising edge of LE. The destination latch is determined by
    /// the state of the four control bits (C4, C3, C2, and C1) in the shift
    /// register.
    #[inline(always)]
    pub fn write_register<Delay>(self: &mut Self, delay: &mut Delay, w: u32) -> Result<(), Error>
    where Delay: DelayUs<u32>,
    {
        trace!("R{} <= {:#010x}", w & ADDR_MASK, w);

        self.spi.write(&w.to_be_bytes()).map_err(|_| Error::Spi)?;

        delay.delay_us(5);
        self.load_enable()?;
        delay.delay_us(10);
        self.load_disable()?;
        delay.delay_us(5);

        Ok(())
    }

    /// Powers up the device, depending on the status of the power-down bits.
    #[inline(always)]
    pub fn enable(self: &mut Self) -> Result<(), Error> {
        self.pin_ce.set_high().map_err(|_| Error::Pin)
    }

    /// Powers down the device and puts the charge pump into three-state mode.
    #[inline(always)]
    pub fn disable(self: &mut Self) -> Result<(), Error> {
        self.pin_ce.set_low().map_err(|_| Error::Pin)
    }

    /// When LE goes high, the data stored in the 32-bit shift register is
    /// loaded into the register that is selected by the four control bits.
    #[inline(always)]
    fn load_enable(self: &mut Self) -> Result<(), Error> {
        self.pin_le.set_high().map_err(|_| Error::Pin)
    }

    /// Disable register load from shift register
    #[inline(always)]
    fn load_disable(self: &mut Self) -> Result<(), Error> {
        self.pin_le.set_low().map_err(|_| Error::Pin)
    }
}
