use crate::config::CanBaudRate;
use crate::message::{decode_id, encode_id, FrameError, FrameType, TxFrame};
use crate::registers::IdRegisters;
use embedded_can::{ExtendedId, Id, StandardId};

const STANDARD_ID: u16 = 0x555;
const EXTENDED_ID: u32 = 0x1D0C_AFC8; // SID 0x743, EID 0x0AFC8

#[test]
fn test_encode_standard_id() {
    let registers = encode_id(Id::Standard(StandardId::new(STANDARD_ID).unwrap()));

    assert_eq!([0xAA, 0xA0, 0x00, 0x00], registers.into_bytes());
    assert!(!registers.exide());
}

#[test]
fn test_encode_extended_id() {
    let registers = encode_id(Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap()));

    assert_eq!(0x743, registers.sid());
    assert_eq!(0x0AFC8, registers.eid());
    assert_eq!([0xE8, 0x68, 0xAF, 0xC8], registers.into_bytes());
}

#[test]
fn test_decode_standard_id() {
    let id = decode_id(IdRegisters::from_bytes([0xAA, 0xA0, 0x00, 0x00]));
    assert_eq!(Id::Standard(StandardId::new(STANDARD_ID).unwrap()), id);
}

#[test]
fn test_decode_extended_id() {
    let id = decode_id(IdRegisters::from_bytes([0xE8, 0x68, 0xAF, 0xC8]));
    assert_eq!(Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap()), id);
}

#[test]
fn test_id_round_trip() {
    let identifiers = [
        Id::Standard(StandardId::new(0x000).unwrap()),
        Id::Standard(StandardId::new(0x7FF).unwrap()),
        Id::Standard(StandardId::new(0x34D).unwrap()),
        Id::Extended(ExtendedId::new(0x0000_0000).unwrap()),
        Id::Extended(ExtendedId::new(0x1FFF_FFFF).unwrap()),
        Id::Extended(ExtendedId::new(0x34D).unwrap()),
        Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap()),
    ];

    for id in identifiers {
        assert_eq!(id, decode_id(encode_id(id)));
    }
}

#[test]
fn test_data_frame_payload_too_long() {
    let result = TxFrame::data(Id::Standard(StandardId::new(STANDARD_ID).unwrap()), &[0u8; 9]);
    assert_eq!(FrameError::InvalidLength(9), result.unwrap_err());
}

#[test]
fn test_remote_frame_dlc_too_large() {
    let result = TxFrame::remote(Id::Standard(StandardId::new(STANDARD_ID).unwrap()), 9);
    assert_eq!(FrameError::InvalidLength(9), result.unwrap_err());
}

#[test]
fn test_data_frame_accessors() {
    let frame = TxFrame::data(
        Id::Standard(StandardId::new(STANDARD_ID).unwrap()),
        &[0x0D, 0xD0],
    )
    .unwrap();

    assert_eq!(FrameType::StandardData, frame.frame_type());
    assert_eq!(2, frame.dlc());
    assert_eq!(&[0x0D, 0xD0], frame.payload());
    assert!(!frame.is_remote());
    assert_eq!(0x02, frame.dlc_register());
}

#[test]
fn test_remote_frame_sets_rtr() {
    let frame = TxFrame::remote(Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap()), 8).unwrap();

    assert_eq!(FrameType::ExtendedRemote, frame.frame_type());
    assert_eq!(8, frame.dlc());
    assert!(frame.payload().is_empty());
    assert_eq!(0x48, frame.dlc_register());
}

#[test]
fn test_frame_type_projections() {
    assert!(FrameType::ExtendedData.is_extended());
    assert!(FrameType::ExtendedRemote.is_extended());
    assert!(!FrameType::StandardData.is_extended());

    assert!(FrameType::StandardRemote.is_remote());
    assert!(FrameType::ExtendedRemote.is_remote());
    assert!(!FrameType::ExtendedData.is_remote());
}

#[test]
fn test_airtime_standard_data() {
    let standard_id = Id::Standard(StandardId::new(STANDARD_ID).unwrap());

    // 72 stuffed bits at 8 us/bit
    let frame = TxFrame::data(standard_id, &[0u8; 2]).unwrap();
    assert_eq!(576, frame.airtime_us(CanBaudRate::Kbps125));

    // 132 stuffed bits at 2 us/bit
    let frame = TxFrame::data(standard_id, &[0u8; 8]).unwrap();
    assert_eq!(264, frame.airtime_us(CanBaudRate::Kbps500));
}

#[test]
fn test_airtime_extended_data() {
    let extended_id = Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap());

    // 127 stuffed bits at 8 us/bit
    let frame = TxFrame::data(extended_id, &[0u8; 5]).unwrap();
    assert_eq!(1016, frame.airtime_us(CanBaudRate::Kbps125));

    // 77 stuffed bits at 20 us/bit
    let frame = TxFrame::data(extended_id, &[]).unwrap();
    assert_eq!(1540, frame.airtime_us(CanBaudRate::Kbps50));
}

#[test]
fn test_airtime_remote_frames_ignore_dlc() {
    let standard_id = Id::Standard(StandardId::new(STANDARD_ID).unwrap());
    let extended_id = Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap());

    let frame = TxFrame::remote(standard_id, 8).unwrap();
    assert_eq!(500, frame.airtime_us(CanBaudRate::Kbps100));
    let frame = TxFrame::remote(standard_id, 0).unwrap();
    assert_eq!(500, frame.airtime_us(CanBaudRate::Kbps100));

    let frame = TxFrame::remote(extended_id, 8).unwrap();
    assert_eq!(584, frame.airtime_us(CanBaudRate::Kbps125));
}
