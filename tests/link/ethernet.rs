use netdissect::link::ethernet::EthernetHeader;
use netdissect::*;

#[test]
fn read() {
    let data = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //dst
        0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, //src
        0x08, 0x00, //type
    ];
    let mut cursor = ByteCursor::new(&data);
    let header = EthernetHeader::read(&mut cursor).unwrap();
    assert_eq!(MacAddr([0xff; 6]), header.destination);
    assert_eq!(MacAddr([0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]), header.source);
    assert_eq!(0x0800, header.ether_type);
    assert_eq!(EthernetHeader::LEN, cursor.offset());
}

#[test]
fn read_unexpected_end() {
    for len in 0..EthernetHeader::LEN {
        let data = vec![0u8; len];
        let mut cursor = ByteCursor::new(&data);
        assert_matches!(
            EthernetHeader::read(&mut cursor),
            Err(DecodeError::UnexpectedEnd { .. })
        );
    }
}

#[test]
fn record_fields() {
    let data = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0x08, 0x06,
    ];
    let mut cursor = ByteCursor::new(&data);
    let record = EthernetHeader::read(&mut cursor).unwrap().record();
    let names: Vec<&str> = record.names().collect();
    assert_eq!(vec!["dst", "src", "type"], names);
    assert_eq!(Some("ARP"), record.get("type").and_then(Value::as_text));
}

#[test]
fn record_unknown_ether_type() {
    let data = [
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x12, 0x34, //unregistered type
    ];
    let mut cursor = ByteCursor::new(&data);
    let record = EthernetHeader::read(&mut cursor).unwrap().record();
    assert_eq!(
        Some("Unknown [4660]"),
        record.get("type").and_then(Value::as_text)
    );
}
