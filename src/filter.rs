//! Acceptance mask and filter banks.
//!
//! Two masks and six filters gate the receive buffers: mask 0 with filters
//! 0-1 covers RXB0, mask 1 with filters 2-5 covers RXB1. The identifier
//! variant passed to [`crate::can::Controller::set_filter`] doubles as the
//! filter's standard/extended applicability (the EXIDE bit); masks have no
//! such bit and apply to whichever frames their filters admit.
//!
//! The register banks behind these types are writable in configuration
//! mode only and read as zero in every other mode.

use crate::can::RxBuffer;
use crate::message::encode_id;
use crate::registers::{RXM0SIDH, RXM1SIDH};
use embedded_can::Id;

/// Acceptance mask selector
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RxMask {
    Mask0,
    Mask1,
}

impl RxMask {
    pub const ALL: [RxMask; 2] = [RxMask::Mask0, RxMask::Mask1];

    /// Receive buffer this mask applies to
    pub fn rx_buffer(self) -> RxBuffer {
        match self {
            Self::Mask0 => RxBuffer::B0,
            Self::Mask1 => RxBuffer::B1,
        }
    }

    pub(crate) fn sidh_address(self) -> u8 {
        match self {
            Self::Mask0 => RXM0SIDH,
            Self::Mask1 => RXM1SIDH,
        }
    }

    /// {SIDH, SIDL, EID8, EID0} image of a mask value. Bit 3 of SIDL is
    /// unimplemented in the mask bank, so EXIDE is never emitted.
    pub(crate) fn registers(value: Id) -> [u8; 4] {
        let mut registers = encode_id(value);
        registers.set_exide(false);
        registers.into_bytes()
    }
}

/// Acceptance filter selector
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RxFilter {
    F0,
    F1,
    F2,
    F3,
    F4,
    F5,
}

impl RxFilter {
    pub const ALL: [RxFilter; 6] = [
        RxFilter::F0,
        RxFilter::F1,
        RxFilter::F2,
        RxFilter::F3,
        RxFilter::F4,
        RxFilter::F5,
    ];

    /// Receive buffer this filter applies to
    pub fn rx_buffer(self) -> RxBuffer {
        match self {
            Self::F0 | Self::F1 => RxBuffer::B0,
            _ => RxBuffer::B1,
        }
    }

    /// SIDH address of the filter's register quartet. The bank is not
    /// contiguous: CANSTAT/CANCTRL sit between filters 2 and 3.
    pub(crate) fn sidh_address(self) -> u8 {
        match self {
            Self::F0 => 0x00,
            Self::F1 => 0x04,
            Self::F2 => 0x08,
            Self::F3 => 0x10,
            Self::F4 => 0x14,
            Self::F5 => 0x18,
        }
    }

    /// {SIDH, SIDL, EID8, EID0} image of a filter value. An extended
    /// identifier sets EXIDE, restricting the filter to extended frames;
    /// a standard identifier leaves it clear.
    pub(crate) fn registers(value: Id) -> [u8; 4] {
        encode_id(value).into_bytes()
    }
}
