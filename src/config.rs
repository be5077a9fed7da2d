use crate::registers::{Cnf1, Cnf2, Cnf3};
use crate::status::OperationMode;

/// Entire per-chip configuration committed by `Controller::init`
#[derive(Clone, Debug)]
pub struct Settings {
    /// Nominal CAN bit rate
    pub baud_rate: CanBaudRate,

    /// Retransmission policy on arbitration loss or bus error
    pub one_shot: OneShotMode,

    /// How often the bus level is sampled per bit
    pub sample_point: SamplePoint,

    /// Wake-up filter for noisy buses while in sleep mode
    pub wake_up_filter: WakeUpFilter,

    /// Acceptance policy of receive buffer 0
    pub rxb0_mode: RxBufferMode,

    /// Acceptance policy of receive buffer 1
    pub rxb1_mode: RxBufferMode,

    /// Spill frames into RXB1 when RXB0 is full
    pub rxb0_rollover: Rollover,

    /// Operation mode entered at the end of `init`
    pub operation_mode: OperationMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            baud_rate: CanBaudRate::Kbps125,
            one_shot: OneShotMode::Reattempt,
            sample_point: SamplePoint::SampledOnce,
            wake_up_filter: WakeUpFilter::Disabled,
            rxb0_mode: RxBufferMode::FiltersOn,
            rxb1_mode: RxBufferMode::FiltersOn,
            rxb0_rollover: Rollover::Disabled,
            operation_mode: OperationMode::Normal,
        }
    }
}

/// Supported nominal bit rates for the 8 MHz controller oscillator.
///
/// 1 Mbit/s is left out: with this oscillator its sample point cannot be
/// placed inside the 60-70% window.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CanBaudRate {
    Kbps50,
    Kbps100,
    Kbps125,
    Kbps250,
    Kbps500,
}

/// Bit segment lengths in time quanta for one nominal rate
struct BitTiming {
    brp: u8,
    prop_seg: u8,
    phase_seg1: u8,
    phase_seg2: u8,
}

impl CanBaudRate {
    /// Nominal rate in bit/s
    pub fn bits_per_second(self) -> u32 {
        match self {
            Self::Kbps50 => 50_000,
            Self::Kbps100 => 100_000,
            Self::Kbps125 => 125_000,
            Self::Kbps250 => 250_000,
            Self::Kbps500 => 500_000,
        }
    }

    /// Precomputed segment lengths. With the sync segment of 1 TQ each
    /// rate divides 8 MHz / (2 * (BRP + 1)) exactly; sample points land at
    /// 62.5% (500/250/125 kbit/s) or 65% (100/50 kbit/s).
    fn bit_timing(self) -> BitTiming {
        match self {
            Self::Kbps500 => BitTiming {
                brp: 0,
                prop_seg: 2,
                phase_seg1: 2,
                phase_seg2: 3,
            },
            Self::Kbps250 => BitTiming {
                brp: 0,
                prop_seg: 4,
                phase_seg1: 5,
                phase_seg2: 6,
            },
            Self::Kbps125 => BitTiming {
                brp: 1,
                prop_seg: 3,
                phase_seg1: 6,
                phase_seg2: 6,
            },
            Self::Kbps100 => BitTiming {
                brp: 1,
                prop_seg: 6,
                phase_seg1: 6,
                phase_seg2: 7,
            },
            Self::Kbps50 => BitTiming {
                brp: 3,
                prop_seg: 6,
                phase_seg1: 6,
                phase_seg2: 7,
            },
        }
    }

    /// Encodes the bit timing as the {CNF3, CNF2, CNF1} burst written at
    /// the CNF3 address. SJW is 1 TQ for every supported rate.
    pub(crate) fn as_cnf_registers(self, sample_point: SamplePoint, wake_up_filter: WakeUpFilter) -> [u8; 3] {
        let timing = self.bit_timing();

        let cnf3 = Cnf3::new()
            .with_wakfil(wake_up_filter == WakeUpFilter::Enabled)
            .with_phseg2(timing.phase_seg2 - 1);
        let cnf2 = Cnf2::new()
            .with_btlmode(true)
            .with_sam(sample_point == SamplePoint::SampledThrice)
            .with_phseg1(timing.phase_seg1 - 1)
            .with_prseg(timing.prop_seg - 1);
        let cnf1 = Cnf1::new().with_sjw(0).with_brp(timing.brp);

        [cnf3.into_bytes()[0], cnf2.into_bytes()[0], cnf1.into_bytes()[0]]
    }
}

/// One-shot mode: whether failed transmissions are reattempted
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OneShotMode {
    /// Message is retransmitted until it succeeds
    Reattempt,
    /// Message is attempted exactly once
    NoReattempt,
}

/// Number of times the bus level is sampled at the sample point
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SamplePoint {
    SampledOnce,
    SampledThrice,
}

/// Low-pass wake-up filter on the RX line during sleep mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WakeUpFilter {
    Disabled,
    Enabled,
}

/// Acceptance policy of a receive buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RxBufferMode {
    /// Only frames matching the buffer's masks and filters are stored
    FiltersOn,
    /// Any valid frame is stored
    AcceptAny,
}

/// RXB0 overflow handling
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rollover {
    Disabled,
    /// A frame accepted while RXB0 is full is stored into RXB1 instead
    Enabled,
}
