use netdissect::*;

use proptest::prelude::*;

///Ethernet + IPv4 + TCP + HTTP GET request.
fn http_get_frame() -> Vec<u8> {
    let http: &[u8] = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let tcp_len = 20 + http.len();
    let ip_total = 20 + tcp_len;
    let mut data = Vec::new();
    //ethernet
    data.extend_from_slice(&[
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, //dst
        0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, //src
        0x08, 0x00, //ipv4
    ]);
    //ipv4
    data.extend_from_slice(&[0x45, 0x00, (ip_total >> 8) as u8, ip_total as u8]);
    data.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 0x40, 0x06, 0x00, 0x00]);
    data.extend_from_slice(&[192, 168, 1, 1, 192, 168, 1, 2]);
    //tcp (data offset 5, ACK+PSH)
    data.extend_from_slice(&[0xc0, 0x00, 0x00, 0x50]); //srcport 49152, dstport 80
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]);
    data.extend_from_slice(&[0x50, 0x18, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(http);
    data
}

#[test]
fn full_stack_decode() {
    let data = http_get_frame();
    let frame = decode_frame(&data, LINK_ETHERNET).unwrap();

    assert_eq!("Ethernet:IPv4:TCP:HTTP", format!("{}", frame.chain));
    assert_eq!(data.len(), frame.consumed);
    assert!(frame.chain.contains_layer(Layer::Link));
    assert!(frame.chain.contains_layer(Layer::Internet));
    assert!(frame.chain.contains_layer(Layer::Transport));
    assert!(frame.chain.contains_layer(Layer::Application));
    assert!(frame.chain.contains("HTTP"));
    assert!(!frame.chain.contains("UDP"));

    //the layers nest under lowercased short names
    let ipv4 = frame.info.get("ipv4").and_then(Value::as_record).unwrap();
    let tcp = ipv4.get("tcp").and_then(Value::as_record).unwrap();
    assert_eq!(Some(80), tcp.get("dstport").and_then(Value::as_int));
    let http = tcp.get("http").and_then(Value::as_record).unwrap();
    assert_eq!(Some("request"), http.get("receipt").and_then(Value::as_text));
    let request = http.get("request").and_then(Value::as_record).unwrap();
    assert_eq!(Some("GET"), request.get("method").and_then(Value::as_text));
}

#[test]
fn source_port_is_the_fallback() {
    //a response from port 80 to an ephemeral destination port
    let http: &[u8] = b"HTTP/1.1 200 OK\r\nServer: x\r\n\r\n";
    let tcp_len = 20 + http.len();
    let ip_total = 20 + tcp_len;
    let mut data = Vec::new();
    data.extend_from_slice(&[0x45, 0x00, (ip_total >> 8) as u8, ip_total as u8]);
    data.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 0x40, 0x06, 0x00, 0x00]);
    data.extend_from_slice(&[192, 168, 1, 2, 192, 168, 1, 1]);
    data.extend_from_slice(&[0x00, 0x50, 0xc0, 0x00]); //srcport 80, dstport 49152
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]);
    data.extend_from_slice(&[0x50, 0x18, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(http);

    let frame = decode_frame(&data, INTERNET_IPV4).unwrap();
    assert_eq!("IPv4:TCP:HTTP", format!("{}", frame.chain));
}

#[test]
fn malformed_application_layer_degrades_to_raw() {
    let mut data = http_get_frame();
    let http_start = data.len() - b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n".len();
    data.truncate(http_start);
    data.extend_from_slice(b"FOO BAR BAZ\r\n\r\n");
    //fix up the lengths
    let ip_total = (data.len() - 14) as u16;
    data[16] = (ip_total >> 8) as u8;
    data[17] = ip_total as u8;

    let frame = decode_frame(&data, LINK_ETHERNET).unwrap();

    //ethernet, ipv4 & tcp are intact, the http slot carries the error
    assert_eq!("Ethernet:IPv4:TCP:Raw", format!("{}", frame.chain));
    let ipv4 = frame.info.get("ipv4").and_then(Value::as_record).unwrap();
    let tcp = ipv4.get("tcp").and_then(Value::as_record).unwrap();
    assert_eq!(Some(80), tcp.get("dstport").and_then(Value::as_int));

    let marker = tcp.get("__error__").and_then(Value::as_record).unwrap();
    assert_eq!(
        Some("MalformedHeader"),
        marker.get("error").and_then(Value::as_text)
    );
    let raw = tcp.get("raw").and_then(Value::as_record).unwrap();
    assert_eq!(
        Some(&b"FOO BAR BAZ\r\n\r\n"[..]),
        raw.get("packet").and_then(Value::as_bytes)
    );
}

#[test]
fn zero_length_input_is_an_unexpected_end() {
    for hint in [
        LINK_ETHERNET,
        INTERNET_IPV4,
        INTERNET_IPV6,
        ip_number_lookup(6),
        port_lookup(80),
        RAW,
    ] {
        let error = decode_frame(&[], hint).unwrap_err();
        assert_matches!(error.error, DecodeError::UnexpectedEnd { offset: 0, .. });
        assert!(error.chain.is_empty());
    }
}

#[test]
fn tunnel_loop_stops_at_raw() {
    //IPv4 carrying IPv6 carrying (allegedly) another IPv6: the second
    //IPv6 at the internet layer is not recursed into
    let mut data = Vec::new();
    let ip_total = 20 + 40 + 4;
    data.extend_from_slice(&[0x45, 0x00, 0x00, ip_total as u8]);
    data.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 0x40, 41, 0x00, 0x00]);
    data.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);
    //ipv6 with next header 41 (ipv6) and four payload octets
    data.extend_from_slice(&[0x60, 0x00, 0x00, 0x00, 0x00, 0x04, 41, 0x40]);
    data.extend_from_slice(&[0u8; 32]);
    data.extend_from_slice(&[0xca, 0xfe, 0xba, 0xbe]);

    let frame = decode_frame(&data, INTERNET_IPV4).unwrap();
    assert_eq!("IPv4:IPv6:Raw", format!("{}", frame.chain));
    let ipv6 = frame.info.get("ipv6").and_then(Value::as_record).unwrap();
    let raw = ipv6.get("raw").and_then(Value::as_record).unwrap();
    assert_eq!(
        Some(&[0xca, 0xfe, 0xba, 0xbe][..]),
        raw.get("packet").and_then(Value::as_bytes)
    );
}

#[test]
fn ipv6_in_ipv4_is_decoded() {
    //a single level of v6-in-v4 tunneling is legitimate
    let mut data = Vec::new();
    let ip_total = 20 + 40 + 8;
    data.extend_from_slice(&[0x45, 0x00, 0x00, ip_total as u8]);
    data.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 0x40, 41, 0x00, 0x00]);
    data.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);
    data.extend_from_slice(&[0x60, 0x00, 0x00, 0x00, 0x00, 0x08, 17, 0x40]);
    data.extend_from_slice(&[0u8; 32]);
    data.extend_from_slice(&[0xc0, 0x00, 0x30, 0x39, 0x00, 0x08, 0x00, 0x00]);

    let frame = decode_frame(&data, INTERNET_IPV4).unwrap();
    assert_eq!("IPv4:IPv6:UDP", format!("{}", frame.chain));
}

#[test]
fn unknown_ether_type_degrades_to_raw() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&[0x12, 0x34]); //unregistered ether type
    data.extend_from_slice(&[1, 2, 3]);
    let frame = decode_frame(&data, LINK_ETHERNET).unwrap();
    assert_eq!("Ethernet:Raw", format!("{}", frame.chain));
    let raw = frame.info.get("raw").and_then(Value::as_record).unwrap();
    assert_eq!(
        Some(&[1u8, 2, 3][..]),
        raw.get("packet").and_then(Value::as_bytes)
    );
}

#[test]
fn raw_tail_redecodes_to_the_same_record() {
    //decoding the captured raw tail again with the raw hint yields an
    //identical record
    let mut data = Vec::new();
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&[0x12, 0x34]);
    data.extend_from_slice(&[9, 8, 7, 6, 5]);
    let frame = decode_frame(&data, LINK_ETHERNET).unwrap();
    let raw = frame.info.get("raw").and_then(Value::as_record).unwrap();
    let tail = raw.get("packet").and_then(Value::as_bytes).unwrap().to_vec();

    let redecoded = decode_frame(&tail, RAW).unwrap();
    assert_eq!(raw, &redecoded.info);
    assert_eq!("Raw", format!("{}", redecoded.chain));
    assert_eq!(tail.len(), redecoded.consumed);
}

#[test]
fn decoding_twice_is_structurally_equal() {
    let data = http_get_frame();
    let first = decode_frame(&data, LINK_ETHERNET).unwrap();
    let second = decode_frame(&data, LINK_ETHERNET).unwrap();
    assert_eq!(first, second);
    //field order is part of the equality
    let first_names: Vec<&str> = first.info.names().collect();
    let second_names: Vec<&str> = second.info.names().collect();
    assert_eq!(first_names, second_names);
}

#[test]
fn one_octet_short_at_each_layer() {
    let data = http_get_frame();
    //one short of the ethernet header: top level error
    let error = decode_frame(&data[..13], LINK_ETHERNET).unwrap_err();
    assert_matches!(error.error, DecodeError::UnexpectedEnd { .. });
    assert!(error.chain.is_empty());

    //one short of the ipv4 header: the error is attributed below ethernet
    let frame = decode_frame(&data[..33], LINK_ETHERNET).unwrap();
    assert_eq!("Ethernet:Raw", format!("{}", frame.chain));
    let marker = frame.info.get("__error__").and_then(Value::as_record).unwrap();
    assert_eq!(
        Some("UnexpectedEnd"),
        marker.get("error").and_then(Value::as_text)
    );
    //the error offset points into the ipv4 layer
    assert!(marker.get("offset").and_then(Value::as_int).unwrap() >= 14);
}

proptest! {
    #[test]
    fn arbitrary_input_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        //a decode either returns a frame or an error, it never panics
        let _ = decode_frame(&data, LINK_ETHERNET);
        let _ = decode_frame(&data, INTERNET_IPV4);
        let _ = decode_frame(&data, INTERNET_IPV6);
        let _ = decode_frame(&data, RAW);
    }

    #[test]
    fn consumed_never_exceeds_input(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        if let Ok(frame) = decode_frame(&data, LINK_ETHERNET) {
            prop_assert!(frame.consumed <= data.len());
            prop_assert_eq!(frame.chain.len() > 0, true);
        }
    }
}
