use netdissect::transport::udp::UdpHeader;
use netdissect::*;

#[test]
fn read() {
    let data = [0x04, 0xd2, 0x16, 0x2e, 0x05, 0x4c, 0x09, 0xa3];
    let mut cursor = ByteCursor::new(&data);
    let header = UdpHeader::read(&mut cursor).unwrap();
    assert_eq!(1234, header.source_port);
    assert_eq!(5678, header.destination_port);
    assert_eq!(1356, header.length);
    assert_eq!(2467, header.checksum);
    assert_eq!(1348, header.payload_len());
    assert_eq!(UdpHeader::LEN, cursor.offset());
}

#[test]
fn read_unexpected_end() {
    for len in 0..UdpHeader::LEN {
        let data = vec![0u8; len];
        let mut cursor = ByteCursor::new(&data);
        assert_matches!(
            UdpHeader::read(&mut cursor),
            Err(DecodeError::UnexpectedEnd { .. })
        );
    }
}

#[test]
fn length_below_header_size_is_malformed() {
    let data = [0x04, 0xd2, 0x16, 0x2e, 0x00, 0x07, 0x00, 0x00];
    let mut cursor = ByteCursor::new(&data);
    assert_matches!(
        UdpHeader::read(&mut cursor),
        Err(DecodeError::MalformedHeader { offset: 0, .. })
    );
}

#[test]
fn record_fields() {
    let data = [0x04, 0xd2, 0x16, 0x2e, 0x00, 0x08, 0x09, 0xa3];
    let mut cursor = ByteCursor::new(&data);
    let record = UdpHeader::read(&mut cursor).unwrap().record();
    let names: Vec<&str> = record.names().collect();
    assert_eq!(vec!["srcport", "dstport", "len", "checksum"], names);
    assert_eq!(Some(1234), record.get("srcport").and_then(Value::as_int));
    assert_eq!(Some(5678), record.get("dstport").and_then(Value::as_int));
    assert_eq!(Some(8), record.get("len").and_then(Value::as_int));
    assert_eq!(Some(2467), record.get("checksum").and_then(Value::as_int));
}
