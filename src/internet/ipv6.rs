use std::net::Ipv6Addr;

use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecoderOutput, NextHint};
use crate::record::{Record, Value};
use crate::registry;
use crate::DecodeError;

///IPv6 fixed header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6Header {
    pub traffic_class: u8,
    pub flow_label: u32,
    ///Length of everything after the fixed header (extension headers plus
    ///transport payload) in bytes.
    pub payload_len: u16,
    pub next_header: u8,
    pub hop_limit: u8,
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
}

impl Ipv6Header {
    ///Serialized size of the fixed header in bytes.
    pub const LEN: usize = 40;

    ///Reads an IPv6 fixed header from the cursor.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Ipv6Header, DecodeError> {
        let start = cursor.offset();
        let version = cursor.read_bits(4)?;
        if version != 6 {
            return Err(DecodeError::MalformedHeader {
                offset: start,
                reason: "IPv6 version nibble is not 6",
            });
        }
        let traffic_class = cursor.read_bits(8)? as u8;
        let flow_label = cursor.read_bits(20)? as u32;
        Ok(Ipv6Header {
            traffic_class,
            flow_label,
            payload_len: cursor.read_uint(2)? as u16,
            next_header: cursor.read_uint(1)? as u8,
            hop_limit: cursor.read_uint(1)? as u8,
            source: read_ipv6_address(cursor)?,
            destination: read_ipv6_address(cursor)?,
        })
    }

    ///Emits the field record.
    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("version", Value::Int(6));
        record.push("class", Value::Int(u64::from(self.traffic_class)));
        record.push("label", Value::Int(u64::from(self.flow_label)));
        record.push("payload_len", Value::Int(u64::from(self.payload_len)));
        record.push(
            "next_header",
            Value::Text(match registry::ip_number_name(self.next_header) {
                Some(name) => name.to_string(),
                None => format!("Unknown [{}]", self.next_header),
            }),
        );
        record.push("hop_limit", Value::Int(u64::from(self.hop_limit)));
        record.push("src", Value::Ipv6(self.source));
        record.push("dst", Value::Ipv6(self.destination));
        record
    }
}

pub(crate) fn read_ipv6_address(cursor: &mut ByteCursor<'_>) -> Result<Ipv6Addr, DecodeError> {
    let bytes = cursor.read(16)?;
    let mut octets = [0u8; 16];
    octets.copy_from_slice(bytes);
    Ok(Ipv6Addr::from(octets))
}

///Decodes one IPv6 fixed header. The payload (extension headers plus
///transport data) is bounded by the declared payload length; the next
///header value dispatches through the IP protocol number registry, where
///the extension header decoders chain until a transport value is reached.
pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = Ipv6Header::read(cursor)?;
    let payload_len = usize::from(header.payload_len);
    let next_header = header.next_header;
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "IPv6",
        long_name: "Internet Protocol version 6",
        layer: Some(Layer::Internet),
        header_len: Ipv6Header::LEN,
        payload_len: Some(payload_len),
        next: NextHint::IpNumber(next_header),
    })
}
