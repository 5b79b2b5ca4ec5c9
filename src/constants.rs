//! Constants

/// Minimum allowed REFin frequency
pub const REF_IN_FREQ_MIN: u32 = 10_000_000;

/// Maximum allowed REFin frequency
pub const REF_IN_FREQ_MAX: u32 = 600_000_000;

/// Max Phase Detector Frequency, ADF5355 / ADF4355 family
pub const PFD_FREQ_MAX: u32 = 75_000_000;

/// Max Phase Detector Frequency, ADF5356 / ADF4356
pub const PFD_FREQ_MAX_HIGH: u32 = 125_000_000;

/// The 10-bit R counter allows division ratios from 1 to 1023
pub const R_COUNTER_MAX: u16 = 1023;

/// FRAC1 modulus, fixed at 2^24
pub const MODULUS1: u64 = 1 << 24;

/// MOD2 upper bound, largest value the 14-bit MOD2 field holds
pub const MAX_MODULUS2: u32 = (1 << 14) - 1;

/// MOD2 upper bound on parts with the extended (28-bit) MOD2 in R13
pub const MAX_MODULUS2_EXT: u32 = (1 << 28) - 1;

/// The prescaler limits the INT value as follows:
/// Prescaler = 4/5: N MIN = 23
/// Prescaler = 8/9: N MIN = 75
/// INT values at or above this use the 8/9 prescaler.
pub const INT_PRESCALER_89_MIN: u32 = 75;

/// Fundamental VCO band, ADF5355 / ADF4355 / ADF4356 / ADF5356
pub const VCO_FREQ_MIN: u64 = 3_400_000_000;
pub const VCO_FREQ_MAX: u64 = 6_800_000_000;

/// Fundamental VCO band, ADF4355-3
pub const VCO_FREQ_MIN_4355_3: u64 = 3_300_000_000;
pub const VCO_FREQ_MAX_4355_3: u64 = 6_600_000_000;

/// ADF4355-2 RFoutA tops out below the VCO maximum
pub const OUT_FREQ_MAX_4355_2: u64 = 4_400_000_000;

/// The RF output divider goes up to divide-by-64
pub const RF_DIVIDER_MAX_SELECT: u8 = 6;

/// Charge pump current step, uA
pub const CP_CURRENT_STEP_UA: u32 = 315;

/// CPLL VCO band, kHz
pub const CPLL_VCO_MIN_KHZ: u32 = 1_600_000;
pub const CPLL_VCO_MAX_KHZ: u32 = 3_300_000;

/// QPLL low band VCO, kHz
pub const QPLL_LOW_BAND_MIN_KHZ: u32 = 5_930_000;
pub const QPLL_LOW_BAND_MAX_KHZ: u32 = 8_000_000;

/// QPLL high band VCO, kHz
pub const QPLL_HIGH_BAND_MIN_KHZ: u32 = 9_800_000;
pub const QPLL_HIGH_BAND_MAX_KHZ: u32 = 12_500_000;
