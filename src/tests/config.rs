use crate::config::{CanBaudRate, RxBufferMode, SamplePoint, Settings, WakeUpFilter};
use crate::status::OperationMode;

#[test]
fn test_cnf_registers_all_rates() {
    let cases: [(CanBaudRate, [u8; 3]); 5] = [
        (CanBaudRate::Kbps500, [0x02, 0x89, 0x00]),
        (CanBaudRate::Kbps250, [0x05, 0xA3, 0x00]),
        (CanBaudRate::Kbps125, [0x05, 0xAA, 0x01]),
        (CanBaudRate::Kbps100, [0x06, 0xAD, 0x01]),
        (CanBaudRate::Kbps50, [0x06, 0xAD, 0x03]),
    ];

    for (rate, expected) in cases {
        assert_eq!(
            expected,
            rate.as_cnf_registers(SamplePoint::SampledOnce, WakeUpFilter::Disabled),
            "CNF mismatch at {:?}",
            rate
        );
    }
}

#[test]
fn test_cnf_registers_sample_point() {
    // SAM bit in CNF2
    let [_, cnf2, _] =
        CanBaudRate::Kbps125.as_cnf_registers(SamplePoint::SampledThrice, WakeUpFilter::Disabled);
    assert_eq!(0xEA, cnf2);
}

#[test]
fn test_cnf_registers_wake_up_filter() {
    // WAKFIL bit in CNF3
    let [cnf3, _, _] =
        CanBaudRate::Kbps500.as_cnf_registers(SamplePoint::SampledOnce, WakeUpFilter::Enabled);
    assert_eq!(0x42, cnf3);
}

#[test]
fn test_bits_per_second() {
    assert_eq!(50_000, CanBaudRate::Kbps50.bits_per_second());
    assert_eq!(100_000, CanBaudRate::Kbps100.bits_per_second());
    assert_eq!(125_000, CanBaudRate::Kbps125.bits_per_second());
    assert_eq!(250_000, CanBaudRate::Kbps250.bits_per_second());
    assert_eq!(500_000, CanBaudRate::Kbps500.bits_per_second());
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(CanBaudRate::Kbps125, settings.baud_rate);
    assert_eq!(RxBufferMode::FiltersOn, settings.rxb0_mode);
    assert_eq!(RxBufferMode::FiltersOn, settings.rxb1_mode);
    assert_eq!(OperationMode::Normal, settings.operation_mode);
}
