use std::net::Ipv4Addr;

use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecoderOutput, NextHint};
use crate::record::{Record, Value};
use crate::registry;
use crate::DecodeError;

///IPv4 header including options.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv4Header {
    ///Header length in bytes (IHL * 4, 20..=60).
    pub header_len: usize,
    pub dscp: u8,
    pub ecn: u8,
    ///Total length of header plus payload in bytes.
    pub total_len: u16,
    pub identification: u16,
    pub dont_fragment: bool,
    pub more_fragments: bool,
    ///Fragment offset in units of 8 octets.
    pub fragment_offset: u16,
    pub time_to_live: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub options: Vec<Ipv4Option>,
}

///One option from the IPv4 options block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv4Option {
    pub kind: u8,
    ///Total option length in bytes including the kind & length octets.
    pub length: u8,
    pub data: Vec<u8>,
}

impl Ipv4Header {
    ///Size of the header without options in bytes.
    pub const MIN_LEN: usize = 20;

    ///Reads an IPv4 header (including its options block) from the cursor.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Ipv4Header, DecodeError> {
        let start = cursor.offset();
        let version = cursor.read_bits(4)?;
        if version != 4 {
            return Err(DecodeError::MalformedHeader {
                offset: start,
                reason: "IPv4 version nibble is not 4",
            });
        }
        let ihl = cursor.read_bits(4)?;
        if ihl < 5 {
            return Err(DecodeError::MalformedHeader {
                offset: start,
                reason: "IPv4 header length is smaller than the header itself",
            });
        }
        let header_len = (ihl as usize) * 4;
        let dscp = cursor.read_bits(6)? as u8;
        let ecn = cursor.read_bits(2)? as u8;
        let total_len = cursor.read_uint(2)? as u16;
        if usize::from(total_len) < header_len {
            return Err(DecodeError::MalformedHeader {
                offset: start,
                reason: "IPv4 total length is smaller than the header",
            });
        }
        let identification = cursor.read_uint(2)? as u16;
        let _reserved_flag = cursor.read_bits(1)?;
        let dont_fragment = cursor.read_bits(1)? != 0;
        let more_fragments = cursor.read_bits(1)? != 0;
        let fragment_offset = cursor.read_bits(13)? as u16;
        let time_to_live = cursor.read_uint(1)? as u8;
        let protocol = cursor.read_uint(1)? as u8;
        let checksum = cursor.read_uint(2)? as u16;
        let source = read_ipv4_address(cursor)?;
        let destination = read_ipv4_address(cursor)?;
        let mut options_block = cursor.sub(header_len - Ipv4Header::MIN_LEN)?;
        let options = read_options(&mut options_block)?;
        Ok(Ipv4Header {
            header_len,
            dscp,
            ecn,
            total_len,
            identification,
            dont_fragment,
            more_fragments,
            fragment_offset,
            time_to_live,
            protocol,
            checksum,
            source,
            destination,
            options,
        })
    }

    ///Payload length declared by the header in bytes.
    pub fn payload_len(&self) -> usize {
        usize::from(self.total_len) - self.header_len
    }

    ///Emits the field record.
    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("version", Value::Int(4));
        record.push("hdr_len", Value::Int(self.header_len as u64));
        record.push("dscp", Value::Int(u64::from(self.dscp)));
        record.push("ecn", Value::Int(u64::from(self.ecn)));
        record.push("len", Value::Int(u64::from(self.total_len)));
        record.push("id", Value::Int(u64::from(self.identification)));
        record.push("df", Value::Bool(self.dont_fragment));
        record.push("mf", Value::Bool(self.more_fragments));
        record.push("frag_offset", Value::Int(u64::from(self.fragment_offset) * 8));
        record.push("ttl", Value::Int(u64::from(self.time_to_live)));
        record.push(
            "proto",
            Value::Text(match registry::ip_number_name(self.protocol) {
                Some(name) => name.to_string(),
                None => format!("Unknown [{}]", self.protocol),
            }),
        );
        record.push("checksum", Value::Int(u64::from(self.checksum)));
        record.push("src", Value::Ipv4(self.source));
        record.push("dst", Value::Ipv4(self.destination));
        record.push(
            "options",
            Value::List(
                self.options
                    .iter()
                    .map(|option| {
                        let mut entry = Record::new();
                        entry.push("kind", Value::Int(u64::from(option.kind)));
                        entry.push("length", Value::Int(u64::from(option.length)));
                        entry.push("data", Value::Bytes(option.data.clone()));
                        Value::Record(entry)
                    })
                    .collect(),
            ),
        );
        record
    }
}

fn read_ipv4_address(cursor: &mut ByteCursor<'_>) -> Result<Ipv4Addr, DecodeError> {
    let bytes = cursor.read(4)?;
    Ok(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
}

///Reads the options block. End-of-option-list (kind 0) terminates the
///list, no-operation (kind 1) is a single octet, everything else carries a
///length octet counting itself & the kind octet.
fn read_options(cursor: &mut ByteCursor<'_>) -> Result<Vec<Ipv4Option>, DecodeError> {
    let mut options = Vec::new();
    while !cursor.is_empty() {
        let kind = cursor.read_uint(1)? as u8;
        match kind {
            0 => {
                options.push(Ipv4Option {
                    kind,
                    length: 1,
                    data: Vec::new(),
                });
                break;
            }
            1 => {
                options.push(Ipv4Option {
                    kind,
                    length: 1,
                    data: Vec::new(),
                });
            }
            _ => {
                let length = cursor.read_uint(1)? as u8;
                if length < 2 {
                    return Err(DecodeError::MalformedHeader {
                        offset: cursor.offset(),
                        reason: "IPv4 option length is smaller than the option prefix",
                    });
                }
                let data = cursor.read(usize::from(length) - 2)?.to_vec();
                options.push(Ipv4Option { kind, length, data });
            }
        }
    }
    Ok(options)
}

///Decodes one IPv4 header. Nominates the encapsulated protocol through the
///IP protocol number registry; the payload is bounded by the declared
///total length.
pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = Ipv4Header::read(cursor)?;
    let payload_len = header.payload_len();
    let protocol = header.protocol;
    let header_len = header.header_len;
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "IPv4",
        long_name: "Internet Protocol version 4",
        layer: Some(Layer::Internet),
        header_len,
        payload_len: Some(payload_len),
        next: NextHint::IpNumber(protocol),
    })
}
