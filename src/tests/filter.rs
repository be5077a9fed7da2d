use crate::can::RxBuffer;
use crate::filter::{RxFilter, RxMask};
use embedded_can::{ExtendedId, Id, StandardId};

#[test]
fn test_filter_buffer_assignment() {
    assert_eq!(RxBuffer::B0, RxFilter::F0.rx_buffer());
    assert_eq!(RxBuffer::B0, RxFilter::F1.rx_buffer());
    assert_eq!(RxBuffer::B1, RxFilter::F2.rx_buffer());
    assert_eq!(RxBuffer::B1, RxFilter::F3.rx_buffer());
    assert_eq!(RxBuffer::B1, RxFilter::F4.rx_buffer());
    assert_eq!(RxBuffer::B1, RxFilter::F5.rx_buffer());

    assert_eq!(RxBuffer::B0, RxMask::Mask0.rx_buffer());
    assert_eq!(RxBuffer::B1, RxMask::Mask1.rx_buffer());
}

#[test]
fn test_filter_addresses_skip_control_block() {
    let addresses: Vec<u8> = RxFilter::ALL.iter().map(|f| f.sidh_address()).collect();

    // Filters 3-5 sit past the CANSTAT/CANCTRL block
    assert_eq!(vec![0x00, 0x04, 0x08, 0x10, 0x14, 0x18], addresses);
}

#[test]
fn test_filter_registers_standard() {
    let registers = RxFilter::registers(Id::Standard(StandardId::new(0x555).unwrap()));
    assert_eq!([0xAA, 0xA0, 0x00, 0x00], registers);
}

#[test]
fn test_filter_registers_extended_sets_exide() {
    let registers = RxFilter::registers(Id::Extended(ExtendedId::new(0x1D0C_AFC8).unwrap()));
    assert_eq!([0xE8, 0x68, 0xAF, 0xC8], registers);
}

#[test]
fn test_mask_registers_clear_exide() {
    // Same identifier as the extended filter case, but bit 3 of SIDL is
    // unimplemented in the mask bank
    let registers = RxMask::registers(Id::Extended(ExtendedId::new(0x1D0C_AFC8).unwrap()));
    assert_eq!([0xE8, 0x60, 0xAF, 0xC8], registers);
}

#[test]
fn test_mask_registers_standard() {
    let registers = RxMask::registers(Id::Standard(StandardId::new(0x7FF).unwrap()));
    assert_eq!([0xFF, 0xE0, 0x00, 0x00], registers);
}
