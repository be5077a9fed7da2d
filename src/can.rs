use crate::can::BusError::{CSError, TransferError};
use crate::config::{CanBaudRate, OneShotMode, Rollover, RxBufferMode, Settings};
use crate::filter::{RxFilter, RxMask};
use crate::message::{decode_id, FrameType, RolloverStatus, RxFrame, TxFrame, MAX_PAYLOAD};
use crate::registers::{
    CanCtrl, DlcReg, ErrorFlags, IdRegisters, Interrupts, Rxb0Ctrl, Rxb1Ctrl, TxbCtrl, CANCTRL, CANINTE, CANINTF,
    CNF3, EFLG, RXM_ACCEPT_ANY, TEC,
};
use crate::status::{OperationMode, TxState};
use embedded_can::Id;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use log::debug;

/// Crystal oscillator frequency of the controller board
const OSC_FREQ_HZ: u32 = 8_000_000;

/// Oscillator start-up time after reset: 128 oscillator periods
const OST_DELAY_US: u32 = 128_000_000 / OSC_FREQ_HZ;

/// Settling time after every SPI transaction; the controller does not
/// document a minimum inter-command gap
const SETTLE_DELAY_US: u32 = 50;

/// Composite BUKT|BUKT1|FILHIT0 value of RXB0CTRL at which a stored frame
/// actually landed in RXB1
const ROLLOVER_FILHIT: u8 = 0x06;

/// SPI instruction set. The buffer shortcut instructions (LOAD TX BUFFER,
/// RTS, READ RX BUFFER, READ STATUS, RX STATUS) are not issued by this
/// driver; all traffic goes through the four instructions below.
#[derive(Copy, Clone)]
enum Instruction {
    Write = 0x02,
    Read = 0x03,
    BitModify = 0x05,
    Reset = 0xC0,
}

/// General SPI errors
#[derive(Debug, PartialEq)]
pub enum BusError<B, CS> {
    /// Failed setting state of CS pin
    CSError(CS),

    /// SPI transfer failed
    TransferError(B),
}

/// Transmit buffer selector. `send` drives selected buffers in the fixed
/// order B0, B1, B2, overriding the TXP priorities of the controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TxBuffer {
    B0,
    B1,
    B2,
}

impl TxBuffer {
    pub const ALL: [TxBuffer; 3] = [TxBuffer::B0, TxBuffer::B1, TxBuffer::B2];

    fn ctrl_address(self) -> u8 {
        0x30 + 0x10 * self as u8
    }

    fn sidh_address(self) -> u8 {
        self.ctrl_address() + 1
    }

    fn data_address(self) -> u8 {
        self.ctrl_address() + 6
    }
}

/// Receive buffer selector
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RxBuffer {
    B0,
    B1,
}

impl RxBuffer {
    pub const ALL: [RxBuffer; 2] = [RxBuffer::B0, RxBuffer::B1];

    fn ctrl_address(self) -> u8 {
        0x60 + 0x10 * self as u8
    }

    fn data_address(self) -> u8 {
        self.ctrl_address() + 6
    }
}

/// Set of frames for one `send` call, at most one per transmit buffer
#[derive(Default, Clone, Debug)]
pub struct TxRequest {
    slots: [Option<TxFrame>; 3],
}

impl TxRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(mut self, buffer: TxBuffer, frame: TxFrame) -> Self {
        self.slots[buffer as usize] = Some(frame);
        self
    }

    pub fn frame(&self, buffer: TxBuffer) -> Option<&TxFrame> {
        self.slots[buffer as usize].as_ref()
    }
}

/// Driver for one MCP2515 chip.
///
/// The SPI bus and chip-select pin are owned exclusively for the lifetime
/// of the driver; a second chip needs its own bus/pin pair. The peripheral
/// must be configured by the host before handing it over: 8-bit words,
/// MSB first, clock idle low with sampling on the leading edge (mode 0),
/// at most 10 MHz.
pub struct Controller<B: Transfer<u8>, CS: OutputPin, D: DelayUs<u32>> {
    /// SPI bus
    bus: B,

    /// CS pin
    pin_cs: CS,

    /// Blocking microsecond delay of the host
    delay: D,

    /// Configuration committed at init
    settings: Settings,

    /// Mode last requested via CANCTRL
    mode: OperationMode,
}

impl<B: Transfer<u8>, CS: OutputPin, D: DelayUs<u32>> Controller<B, CS, D> {
    pub fn new(bus: B, pin_cs: CS, delay: D) -> Self {
        Self {
            bus,
            pin_cs,
            delay,
            settings: Settings::default(),
            mode: OperationMode::Configuration,
        }
    }

    /// Initializes the chip with the given settings: reset into
    /// configuration mode, program the bit timing, set up the receive
    /// buffer acceptance policy and rollover, then enter the requested
    /// operation mode.
    ///
    /// Masks and filters are left at their reset state; program them with
    /// [`Self::set_mask`]/[`Self::set_filter`] before leaving
    /// configuration mode.
    pub fn init(&mut self, settings: &Settings) -> Result<(), BusError<B::Error, CS::Error>> {
        self.settings = settings.clone();

        self.reset()?;
        self.set_baud_rate(self.settings.baud_rate)?;

        let mut rxb0_ctrl = Rxb0Ctrl::new();
        if settings.rxb0_mode == RxBufferMode::AcceptAny {
            rxb0_ctrl.set_rxm(RXM_ACCEPT_ANY);
        }
        if settings.rxb0_rollover == Rollover::Enabled {
            rxb0_ctrl.set_bukt(true);
        }
        let rxb0_ctrl = rxb0_ctrl.into_bytes()[0];
        if rxb0_ctrl != 0 {
            self.write_registers(RxBuffer::B0.ctrl_address(), &[rxb0_ctrl])?;
        }

        if settings.rxb1_mode == RxBufferMode::AcceptAny {
            let rxb1_ctrl = Rxb1Ctrl::new().with_rxm(RXM_ACCEPT_ANY);
            self.write_registers(RxBuffer::B1.ctrl_address(), &rxb1_ctrl.into_bytes())?;
        }

        self.set_operation_mode(settings.operation_mode)?;
        debug!("controller initialized at {:?}", settings.baud_rate);
        Ok(())
    }

    /// Resets the chip to its register defaults and leaves it in
    /// configuration mode. Blocks for the oscillator start-up time.
    pub fn reset(&mut self) -> Result<(), BusError<B::Error, CS::Error>> {
        self.pin_cs.set_low().map_err(CSError)?;
        let result = self
            .bus
            .transfer(&mut [Instruction::Reset as u8])
            .map(|_| ())
            .map_err(TransferError);
        self.pin_cs.set_high().map_err(CSError)?;
        result?;

        self.delay.delay_us(SETTLE_DELAY_US);
        self.delay.delay_us(OST_DELAY_US);

        self.mode = OperationMode::Configuration;
        Ok(())
    }

    /// Programs the bit timing for the given nominal rate, composed with
    /// the handle's sample-point and wake-up-filter selections. The
    /// handle's configured rate is not touched; transmission waits keep
    /// using the rate committed at `init`.
    ///
    /// The CNF registers are writable in configuration mode only; in any
    /// other mode the write has no effect.
    pub fn set_baud_rate(&mut self, baud_rate: CanBaudRate) -> Result<(), BusError<B::Error, CS::Error>> {
        let cnf = baud_rate.as_cnf_registers(self.settings.sample_point, self.settings.wake_up_filter);
        self.write_registers(CNF3, &cnf)
    }

    /// Requests the given operation mode with a single CANCTRL write, also
    /// carrying the handle's one-shot selection.
    ///
    /// The mode change is not acknowledged back; the post-write settling
    /// delay covers the transition before the next SPI round-trip. A
    /// configuration/normal round-trip resets the TEC/REC error counters
    /// and restores the active-error state.
    pub fn set_operation_mode(&mut self, mode: OperationMode) -> Result<(), BusError<B::Error, CS::Error>> {
        let control = CanCtrl::new()
            .with_reqop(mode as u8)
            .with_osm(self.settings.one_shot == OneShotMode::NoReattempt);
        self.write_registers(CANCTRL, &control.into_bytes())?;

        self.mode = mode;
        Ok(())
    }

    /// Mode last requested through this handle
    pub fn operation_mode(&self) -> OperationMode {
        self.mode
    }

    /// Writes an acceptance mask value. Mask 0 gates RXB0, mask 1 gates
    /// RXB1. Durable in configuration mode only.
    pub fn set_mask(&mut self, mask: RxMask, value: Id) -> Result<(), BusError<B::Error, CS::Error>> {
        self.write_registers(mask.sidh_address(), &RxMask::registers(value))
    }

    /// Writes an acceptance filter value. An extended identifier restricts
    /// the filter to extended frames, a standard one to standard frames.
    /// Durable in configuration mode only.
    pub fn set_filter(&mut self, filter: RxFilter, value: Id) -> Result<(), BusError<B::Error, CS::Error>> {
        self.write_registers(filter.sidh_address(), &RxFilter::registers(value))
    }

    /// Transmits the selected frames, strictly in buffer order B0, B1, B2.
    /// Each frame is fully loaded, requested and waited on (worst-case
    /// airtime) before the next buffer is touched.
    pub fn send(&mut self, request: &TxRequest) -> Result<(), BusError<B::Error, CS::Error>> {
        for buffer in TxBuffer::ALL {
            if let Some(frame) = request.frame(buffer) {
                self.send_buffer(buffer, frame)?;
            }
        }
        Ok(())
    }

    /// Loads one frame into a transmit buffer, sets TXREQ and blocks for
    /// the worst-case on-bus time of the frame at the configured rate.
    pub fn send_buffer(&mut self, buffer: TxBuffer, frame: &TxFrame) -> Result<(), BusError<B::Error, CS::Error>> {
        let mut registers = [0u8; 5];
        registers[..4].copy_from_slice(&frame.id_registers());
        registers[4] = frame.dlc_register();
        self.write_registers(buffer.sidh_address(), &registers)?;

        let payload = frame.payload();
        if !payload.is_empty() {
            self.write_registers(buffer.data_address(), payload)?;
        }

        let txreq = TxbCtrl::new().with_txreq(true).into_bytes()[0];
        self.bit_modify(buffer.ctrl_address(), txreq, txreq)?;

        self.delay.delay_us(frame.airtime_us(self.settings.baud_rate));
        Ok(())
    }

    /// Reads the transmission state of a buffer from its TXBnCTRL register
    pub fn tx_status(&mut self, buffer: TxBuffer) -> Result<TxState, BusError<B::Error, CS::Error>> {
        let [control] = self.read_registers::<1>(buffer.ctrl_address())?;
        Ok(TxState::from_register(control))
    }

    /// Clears TXREQ of the selected buffers. A message already on the bus
    /// keeps transmitting; only pending requests are withdrawn.
    pub fn abort(&mut self, buffers: &[TxBuffer]) -> Result<(), BusError<B::Error, CS::Error>> {
        let txreq = TxbCtrl::new().with_txreq(true).into_bytes()[0];
        for buffer in buffers {
            self.bit_modify(buffer.ctrl_address(), txreq, 0)?;
        }
        Ok(())
    }

    /// Aborts all pending transmissions via ABAT, then clears ABAT so new
    /// requests are accepted again
    pub fn abort_all(&mut self) -> Result<(), BusError<B::Error, CS::Error>> {
        let abat = CanCtrl::new().with_abat(true).into_bytes()[0];
        self.bit_modify(CANCTRL, abat, abat)?;
        self.bit_modify(CANCTRL, abat, 0)
    }

    /// Reads out a receive buffer, whether or not a new frame has arrived;
    /// poll [`Self::interrupt_status`] for RX0/RX1 to learn about arrivals.
    ///
    /// On RXB0 with rollover enabled, a FILHIT value pointing at the RXB1
    /// filter bank means the frame body was stored in RXB1; the data bytes
    /// are fetched from there and the rollover status is reported. The
    /// RX-full interrupt flags are not cleared here.
    pub fn read(&mut self, buffer: RxBuffer) -> Result<RxFrame, BusError<B::Error, CS::Error>> {
        let header = self.read_registers::<6>(buffer.ctrl_address())?;

        let control = header[0];
        let id_registers = IdRegisters::from_bytes([header[1], header[2], header[3], header[4]]);
        let dlc_register = DlcReg::from_bytes([header[5]]);

        let extended = id_registers.exide();
        let remote = if extended {
            dlc_register.rtr()
        } else {
            id_registers.srr()
        };

        let filter_hit = match buffer {
            RxBuffer::B0 => control & 0b0000_0001,
            RxBuffer::B1 => control & 0b0000_0111,
        };

        let dlc = dlc_register.dlc();
        let mut data = [0u8; MAX_PAYLOAD];
        let mut rollover = RolloverStatus::NotOccurred;

        if !remote && dlc > 0 {
            let source = match buffer {
                RxBuffer::B0 if (control & 0b0000_0111) >= ROLLOVER_FILHIT => {
                    rollover = RolloverStatus::Occurred;
                    RxBuffer::B1
                }
                _ => buffer,
            };
            data = self.read_data(source.data_address(), usize::from(dlc).min(MAX_PAYLOAD))?;
        }

        Ok(RxFrame {
            frame_type: FrameType::from_parts(extended, remote),
            id: decode_id(id_registers),
            dlc,
            data,
            filter_hit,
            rollover,
        })
    }

    /// Writes the interrupt enable mask. Bits not set here are disabled.
    pub fn enable_interrupts(&mut self, enabled: Interrupts) -> Result<(), BusError<B::Error, CS::Error>> {
        self.write_registers(CANINTE, &enabled.into_bytes())
    }

    /// Reads the pending interrupt flags (CANINTF)
    pub fn interrupt_status(&mut self) -> Result<Interrupts, BusError<B::Error, CS::Error>> {
        let [flags] = self.read_registers::<1>(CANINTF)?;
        Ok(Interrupts::from_bytes([flags]))
    }

    /// Clears the selected interrupt flags; others are untouched
    pub fn clear_interrupts(&mut self, flags: Interrupts) -> Result<(), BusError<B::Error, CS::Error>> {
        self.bit_modify(CANINTF, flags.into_bytes()[0], 0)
    }

    /// Reads the error flag register (EFLG)
    pub fn error_status(&mut self) -> Result<ErrorFlags, BusError<B::Error, CS::Error>> {
        let [flags] = self.read_registers::<1>(EFLG)?;
        Ok(ErrorFlags::from_bytes([flags]))
    }

    /// Clears the selected error flags. Only RX0OVR and RX1OVR react; the
    /// error-passive, warning and bus-off flags follow the TEC/REC
    /// counters and ignore this write. A configuration/normal mode
    /// round-trip resets the counters instead.
    pub fn clear_errors(&mut self, flags: ErrorFlags) -> Result<(), BusError<B::Error, CS::Error>> {
        self.bit_modify(EFLG, flags.into_bytes()[0], 0)
    }

    /// Reads the transmit and receive error counters (TEC, REC)
    pub fn error_counters(&mut self) -> Result<(u8, u8), BusError<B::Error, CS::Error>> {
        let [tec, rec] = self.read_registers::<2>(TEC)?;
        Ok((tec, rec))
    }

    /// Writes `data` to consecutive registers starting at `address`; the
    /// controller auto-increments the address per byte
    fn write_registers(&mut self, address: u8, data: &[u8]) -> Result<(), BusError<B::Error, CS::Error>> {
        let mut buffer = [0u8; MAX_PAYLOAD];
        buffer[..data.len()].copy_from_slice(data);

        self.pin_cs.set_low().map_err(CSError)?;
        let mut result = self
            .bus
            .transfer(&mut [Instruction::Write as u8, address])
            .map(|_| ())
            .map_err(TransferError);
        if result.is_ok() {
            result = self
                .bus
                .transfer(&mut buffer[..data.len()])
                .map(|_| ())
                .map_err(TransferError);
        }
        self.pin_cs.set_high().map_err(CSError)?;
        result?;

        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(())
    }

    /// Reads `N` consecutive registers starting at `address`
    fn read_registers<const N: usize>(&mut self, address: u8) -> Result<[u8; N], BusError<B::Error, CS::Error>> {
        let mut buffer = [0u8; N];
        let mut values = [0u8; N];

        self.pin_cs.set_low().map_err(CSError)?;
        let mut result = self
            .bus
            .transfer(&mut [Instruction::Read as u8, address])
            .map(|_| ())
            .map_err(TransferError);
        if result.is_ok() {
            result = self
                .bus
                .transfer(&mut buffer)
                .map(|received| values.copy_from_slice(received))
                .map_err(TransferError);
        }
        self.pin_cs.set_high().map_err(CSError)?;
        result?;

        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(values)
    }

    /// Variable-length read of a buffer's data registers
    fn read_data(&mut self, address: u8, length: usize) -> Result<[u8; MAX_PAYLOAD], BusError<B::Error, CS::Error>> {
        let mut buffer = [0u8; MAX_PAYLOAD];
        let mut values = [0u8; MAX_PAYLOAD];

        self.pin_cs.set_low().map_err(CSError)?;
        let mut result = self
            .bus
            .transfer(&mut [Instruction::Read as u8, address])
            .map(|_| ())
            .map_err(TransferError);
        if result.is_ok() {
            result = self
                .bus
                .transfer(&mut buffer[..length])
                .map(|received| values[..length].copy_from_slice(received))
                .map_err(TransferError);
        }
        self.pin_cs.set_high().map_err(CSError)?;
        result?;

        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(values)
    }

    /// Sets or clears bits of a single register. Only the bit-modifiable
    /// registers (CTRL, CNF, interrupt and error flag registers) honor the
    /// mask; on any other register the controller forces it to 0xFF and
    /// the instruction degrades to a plain byte write.
    fn bit_modify(&mut self, address: u8, mask: u8, value: u8) -> Result<(), BusError<B::Error, CS::Error>> {
        self.pin_cs.set_low().map_err(CSError)?;
        let result = self
            .bus
            .transfer(&mut [Instruction::BitModify as u8, address, mask, value])
            .map(|_| ())
            .map_err(TransferError);
        self.pin_cs.set_high().map_err(CSError)?;
        result?;

        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(())
    }
}
