use crate::config::CanBaudRate;
use crate::registers::{DlcReg, IdRegisters};
use embedded_can::{ExtendedId, Id, StandardId};
use log::debug;

pub const STANDARD_IDENTIFIER_MASK: u16 = 0x7FF;
pub const EXTENDED_IDENTIFIER_MASK: u32 = 0x3FFFF;

/// Maximum payload of a classic CAN frame
pub const MAX_PAYLOAD: usize = 8;

/// The four frame kinds the controller distinguishes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameType {
    StandardData,
    ExtendedData,
    StandardRemote,
    ExtendedRemote,
}

impl FrameType {
    pub fn is_extended(self) -> bool {
        matches!(self, Self::ExtendedData | Self::ExtendedRemote)
    }

    pub fn is_remote(self) -> bool {
        matches!(self, Self::StandardRemote | Self::ExtendedRemote)
    }

    pub(crate) fn from_parts(extended: bool, remote: bool) -> Self {
        match (extended, remote) {
            (false, false) => Self::StandardData,
            (true, false) => Self::ExtendedData,
            (false, true) => Self::StandardRemote,
            (true, true) => Self::ExtendedRemote,
        }
    }
}

/// Errors constructing a transmit frame
#[derive(Debug, Eq, PartialEq)]
pub enum FrameError {
    /// Payload length or requested DLC exceeds the 8 bytes of classic CAN
    InvalidLength(usize),
}

/// A frame to be loaded into one of the transmit buffers
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxFrame {
    id: Id,
    dlc: u8,
    data: [u8; MAX_PAYLOAD],
    remote: bool,
}

impl TxFrame {
    /// Creates a data frame. The identifier variant selects between a
    /// standard and an extended frame.
    pub fn data(id: Id, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD {
            debug!("payload of {} bytes exceeds classic CAN maximum", payload.len());
            return Err(FrameError::InvalidLength(payload.len()));
        }

        let mut data = [0u8; MAX_PAYLOAD];
        data[..payload.len()].copy_from_slice(payload);

        Ok(Self {
            id,
            dlc: payload.len() as u8,
            data,
            remote: false,
        })
    }

    /// Creates a remote frame requesting `dlc` bytes from the node owning
    /// the identifier. Remote frames carry no payload.
    pub fn remote(id: Id, dlc: u8) -> Result<Self, FrameError> {
        if usize::from(dlc) > MAX_PAYLOAD {
            debug!("remote frame DLC {} exceeds classic CAN maximum", dlc);
            return Err(FrameError::InvalidLength(usize::from(dlc)));
        }

        Ok(Self {
            id,
            dlc,
            data: [0u8; MAX_PAYLOAD],
            remote: true,
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn dlc(&self) -> u8 {
        self.dlc
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Payload bytes covered by the DLC; empty for remote frames
    pub fn payload(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..usize::from(self.dlc)]
        }
    }

    pub fn frame_type(&self) -> FrameType {
        FrameType::from_parts(matches!(self.id, Id::Extended(_)), self.remote)
    }

    /// {SIDH, SIDL, EID8, EID0} image of the identifier
    pub(crate) fn id_registers(&self) -> [u8; 4] {
        encode_id(self.id).into_bytes()
    }

    /// TXBnDLC image: DLC in the low nibble, RTR for remote frames
    pub(crate) fn dlc_register(&self) -> u8 {
        DlcReg::new().with_rtr(self.remote).with_dlc(self.dlc).into_bytes()[0]
    }

    /// Worst-case on-bus duration of this frame in microseconds, assuming
    /// maximal bit stuffing. Used to block until a requested transmission
    /// has left the buffer.
    pub(crate) fn airtime_us(&self, baud_rate: CanBaudRate) -> u32 {
        let bit_us = 1_000_000 / baud_rate.bits_per_second();
        let data_bits = 8 * u32::from(self.dlc);

        let bits = match self.frame_type() {
            FrameType::StandardData => data_bits + 44 + (33 + data_bits) / 4,
            FrameType::ExtendedData => data_bits + 64 + (53 + data_bits) / 4,
            FrameType::StandardRemote => 50,
            FrameType::ExtendedRemote => 73,
        };

        bits * bit_us
    }
}

/// Whether a rollover from RXB0 into RXB1 occurred for the reported frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RolloverStatus {
    NotOccurred,
    Occurred,
}

/// A frame read back from one of the receive buffers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RxFrame {
    pub frame_type: FrameType,
    pub id: Id,
    /// Raw DLC nibble as reported by the controller
    pub dlc: u8,
    /// Data registers; only meaningful for data frames
    pub data: [u8; MAX_PAYLOAD],
    /// Index of the acceptance filter that accepted the frame
    pub filter_hit: u8,
    /// Only ever reported as `Occurred` on receive buffer 0
    pub rollover: RolloverStatus,
}

impl RxFrame {
    /// Data bytes covered by the DLC; empty for remote frames
    pub fn payload(&self) -> &[u8] {
        if self.frame_type.is_remote() {
            &[]
        } else {
            &self.data[..usize::from(self.dlc).min(MAX_PAYLOAD)]
        }
    }
}

/// Packs an identifier into the four-register layout. Extended identifiers
/// split into SID[10:0] = id[28:18] and EID[17:0], with EXIDE set.
pub(crate) fn encode_id(id: Id) -> IdRegisters {
    match id {
        Id::Standard(sid) => IdRegisters::new().with_sid(sid.as_raw()),
        Id::Extended(eid) => IdRegisters::new()
            .with_sid((eid.as_raw() >> 18) as u16 & STANDARD_IDENTIFIER_MASK)
            .with_eid(eid.as_raw() & EXTENDED_IDENTIFIER_MASK)
            .with_exide(true),
    }
}

/// Inverse of `encode_id`; the IDE bit selects the identifier width
pub(crate) fn decode_id(registers: IdRegisters) -> Id {
    if registers.exide() {
        let raw = (u32::from(registers.sid()) << 18) | registers.eid();
        Id::Extended(ExtendedId::new(raw).unwrap())
    } else {
        Id::Standard(StandardId::new(registers.sid()).unwrap())
    }
}
