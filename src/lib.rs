#![cfg_attr(not(test), no_std)]

///! (ADF5355)[https://www.analog.com/en/products/adf5355.html] family driver.
///!
///! Also covers ADF4355, ADF4355-2, ADF4355-3, ADF4356 and ADF5356, plus the
///! JESD204 transceiver CPLL/QPLL divider search these synthesizers usually
///! end up clocking.

pub mod constants;
pub mod register;
pub mod errors;
pub mod config;
pub mod refin;
pub mod frequency;
pub mod sequence;
pub mod device;
pub mod xcvr;

pub use config::{Channel, Config, Variant};
pub use device::Adf5355;
pub use errors::Error;
