//! MCP2515 register map and register bitfields.
//!
//! Multi-byte banks (identifier quartets, TX/RX buffers) auto-increment on
//! the wire, so only each bank's first address is named here.

use modular_bitfield_msb::prelude::*;

pub(crate) const CANCTRL: u8 = 0x0F;
pub(crate) const TEC: u8 = 0x1C;
pub(crate) const RXM0SIDH: u8 = 0x20;
pub(crate) const RXM1SIDH: u8 = 0x24;
pub(crate) const CNF3: u8 = 0x28;
pub(crate) const CANINTE: u8 = 0x2B;
pub(crate) const CANINTF: u8 = 0x2C;
pub(crate) const EFLG: u8 = 0x2D;

/// RXM field value accepting any frame, masks and filters off
pub(crate) const RXM_ACCEPT_ANY: u8 = 0b11;

/// Operation control register (CANCTRL)
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct CanCtrl {
    pub reqop: B3,
    pub abat: bool,
    pub osm: bool,
    pub clken: bool,
    pub clkpre: B2,
}

/// Per-buffer transmit control register (TXBnCTRL)
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct TxbCtrl {
    #[skip]
    __: B1,
    pub abtf: bool,
    pub mloa: bool,
    pub txerr: bool,
    pub txreq: bool,
    #[skip]
    __: B1,
    pub txp: B2,
}

/// Receive buffer 0 control register. BUKT1 is a read-only copy of BUKT
/// maintained by the controller.
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct Rxb0Ctrl {
    #[skip]
    __: B1,
    pub rxm: B2,
    #[skip]
    __: B1,
    pub rxrtr: bool,
    pub bukt: bool,
    pub bukt1: bool,
    pub filhit0: bool,
}

/// Receive buffer 1 control register
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct Rxb1Ctrl {
    #[skip]
    __: B1,
    pub rxm: B2,
    #[skip]
    __: B1,
    pub rxrtr: bool,
    pub filhit: B3,
}

/// Bit-timing register 1: synchronization jump width and prescaler
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct Cnf1 {
    pub sjw: B2,
    pub brp: B6,
}

/// Bit-timing register 2: propagation segment and phase segment 1.
/// All timing tables set BTLMODE so PS2 is taken from CNF3.
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct Cnf2 {
    pub btlmode: bool,
    pub sam: bool,
    pub phseg1: B3,
    pub prseg: B3,
}

/// Bit-timing register 3: phase segment 2 and the wake-up filter
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct Cnf3 {
    pub sof: bool,
    pub wakfil: bool,
    #[skip]
    __: B3,
    pub phseg2: B3,
}

/// Interrupt bits, one layout shared by the enable (CANINTE) and the
/// flag (CANINTF) registers
#[bitfield]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub struct Interrupts {
    pub merr: bool,
    pub wake: bool,
    pub err: bool,
    pub tx2: bool,
    pub tx1: bool,
    pub tx0: bool,
    pub rx1: bool,
    pub rx0: bool,
}

/// Error flag register (EFLG)
#[bitfield]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub struct ErrorFlags {
    pub rx1ovr: bool,
    pub rx0ovr: bool,
    pub txbo: bool,
    pub txep: bool,
    pub rxep: bool,
    pub txwar: bool,
    pub rxwar: bool,
    pub ewarn: bool,
}

/// Data length code register (TXBnDLC/RXBnDLC). Bit 6 carries RTR on
/// transmit and reports RTR for extended frames on receive.
#[bitfield]
#[derive(Default)]
#[repr(u8)]
pub struct DlcReg {
    #[skip]
    __: B1,
    pub rtr: bool,
    #[skip]
    __: B2,
    pub dlc: B4,
}

/// The four-register identifier quartet {SIDH, SIDL, EID8, EID0} shared by
/// the TX buffers, RX buffers, acceptance masks and acceptance filters.
/// Bit 19 is EXIDE on the TX/filter side and IDE on the RX side; SRR is
/// only meaningful on received standard frames.
#[bitfield]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u32)]
pub struct IdRegisters {
    pub sid: B11,
    pub srr: bool,
    pub exide: bool,
    #[skip]
    __: B1,
    pub eid: B18,
}
