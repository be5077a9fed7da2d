use crate::registers::TxbCtrl;

/// Operation modes of the controller, in REQOP encoding
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperationMode {
    /// Frames are transmitted and received on the bus
    Normal = 0b000,
    /// Internal oscillator halted, wake-up on bus activity
    Sleep = 0b001,
    /// Transmitted frames are routed back to the receive buffers without
    /// touching the bus
    Loopback = 0b010,
    /// Receive-only, no ACK or error frames are generated
    ListenOnly = 0b011,
    /// Reset default. The only mode in which the bit-timing, mask and
    /// filter registers are writable; entering it also clears the TEC and
    /// REC error counters.
    Configuration = 0b100,
}

/// Transmission state of a TX buffer, decoded from its TXBnCTRL register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TxState {
    /// Transmission requested and not yet completed
    Pending,
    /// Message lost arbitration while transmitting
    LostArbitration,
    /// A bus error occurred while transmitting
    BusError,
    /// Both a bus error and lost arbitration were recorded
    BusErrorAndLostArbitration,
    /// Transmission was aborted; clear ABAT before retrying
    Aborted,
    /// Message left the buffer successfully
    Success,
}

impl TxState {
    /// Maps a TXBnCTRL register value to the transmission state
    pub(crate) fn from_register(register: u8) -> Self {
        let control = TxbCtrl::from_bytes([register]);

        if control.abtf() {
            Self::Aborted
        } else if control.txreq() {
            match (control.txerr(), control.mloa()) {
                (true, true) => Self::BusErrorAndLostArbitration,
                (true, false) => Self::BusError,
                (false, true) => Self::LostArbitration,
                (false, false) => Self::Pending,
            }
        } else {
            Self::Success
        }
    }
}
