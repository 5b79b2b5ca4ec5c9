//! Driver errors

use core::fmt;

/// Errors returned by the driver and the divider solvers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// REFin outside of the supported range, or no R counter value reaches a legal PFD
    InvalidReferenceFrequency,
    /// Requested output frequency outside of the channel band
    InvalidOutputFrequency,
    /// Channel index not present on this variant
    InvalidChannel,
    /// No combination of the legal transceiver dividers reproduces the lane rate
    NoDividerSolution,
    /// SPI write failed
    Spi,
    /// CE / LE pin failure
    Pin,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidReferenceFrequency => "invalid reference frequency",
            Error::InvalidOutputFrequency => "invalid output frequency",
            Error::InvalidChannel => "invalid channel",
            Error::NoDividerSolution => "no matching dividers for the requested rate",
            Error::Spi => "SPI transfer failed",
            Error::Pin => "pin access failed",
        };
        f.write_str(msg)
    }
}
