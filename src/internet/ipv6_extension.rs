//! IPv6 extension header decoders.
//!
//! Each extension header is its own registered decoder; the chain of
//! `next_header` values walks from the IPv6 fixed header through any
//! number of extensions until a transport protocol (or `IPv6-NoNxt`) is
//! reached. All of them live inside the payload bound established by the
//! IPv6 fixed header.

use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecoderOutput, NextHint};
use crate::record::{Record, Value};
use crate::registry;
use crate::DecodeError;

///Hop-by-Hop Options & Destination Options share the same layout:
///`next_header`, `hdr_ext_len` and an option TLV block filling
///`8 * (hdr_ext_len + 1)` bytes in total.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6OptionsHeader {
    pub next_header: u8,
    ///Header length in bytes (including the two fixed octets).
    pub header_len: usize,
    pub options: Vec<Ipv6Option>,
}

///One TLV option of a hop-by-hop or destination options header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6Option {
    pub option_type: u8,
    ///Length of the option data in bytes (excluding type & length octets).
    pub length: u8,
    pub data: Vec<u8>,
}

impl Ipv6OptionsHeader {
    pub const MIN_LEN: usize = 8;

    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Ipv6OptionsHeader, DecodeError> {
        let next_header = cursor.read_uint(1)? as u8;
        let ext_len = cursor.read_uint(1)? as usize;
        let header_len = 8 * (ext_len + 1);
        let mut block = cursor.sub(header_len - 2)?;
        let options = read_tlv_options(&mut block)?;
        Ok(Ipv6OptionsHeader {
            next_header,
            header_len,
            options,
        })
    }

    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("next_header", next_header_value(self.next_header));
        record.push("length", Value::Int(self.header_len as u64));
        record.push(
            "options",
            Value::List(
                self.options
                    .iter()
                    .map(|option| {
                        let mut entry = Record::new();
                        entry.push("type", Value::Int(u64::from(option.option_type)));
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

///Reads an option TLV block. Pad1 (type 0) is a single octet; every other
///option carries a length octet counting only the option data.
fn read_tlv_options(cursor: &mut ByteCursor<'_>) -> Result<Vec<Ipv6Option>, DecodeError> {
    let mut options = Vec::new();
    while !cursor.is_empty() {
        let option_type = cursor.read_uint(1)? as u8;
        if option_type == 0 {
            //Pad1
            options.push(Ipv6Option {
                option_type,
                length: 0,
                data: Vec::new(),
            });
            continue;
        }
        let length = cursor.read_uint(1)? as u8;
        let data = cursor.read(usize::from(length))?.to_vec();
        options.push(Ipv6Option {
            option_type,
            length,
            data,
        });
    }
    Ok(options)
}

///Routing extension header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6RoutingHeader {
    pub next_header: u8,
    ///Header length in bytes.
    pub header_len: usize,
    pub routing_type: u8,
    pub segments_left: u8,
    ///Type specific data, kept raw.
    pub data: Vec<u8>,
}

impl Ipv6RoutingHeader {
    pub const MIN_LEN: usize = 8;

    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Ipv6RoutingHeader, DecodeError> {
        let next_header = cursor.read_uint(1)? as u8;
        let ext_len = cursor.read_uint(1)? as usize;
        let header_len = 8 * (ext_len + 1);
        let routing_type = cursor.read_uint(1)? as u8;
        let segments_left = cursor.read_uint(1)? as u8;
        let data = cursor.read(header_len - 4)?.to_vec();
        Ok(Ipv6RoutingHeader {
            next_header,
            header_len,
            routing_type,
            segments_left,
            data,
        })
    }

    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("next_header", next_header_value(self.next_header));
        record.push("length", Value::Int(self.header_len as u64));
        record.push("routing_type", Value::Int(u64::from(self.routing_type)));
        record.push("segs_left", Value::Int(u64::from(self.segments_left)));
        record.push("data", Value::Bytes(self.data.clone()));
        record
    }
}

///Fragment extension header (fixed 8 octets).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ipv6FragmentHeader {
    pub next_header: u8,
    ///Fragment offset in octets (wire value is in units of 8 octets).
    pub fragment_offset: u16,
    pub more_fragments: bool,
    pub identification: u32,
}

impl Ipv6FragmentHeader {
    pub const LEN: usize = 8;

    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Ipv6FragmentHeader, DecodeError> {
        let next_header = cursor.read_uint(1)? as u8;
        let _reserved = cursor.read_uint(1)?;
        let offset_field = cursor.read_uint(2)? as u16;
        let identification = cursor.read_uint(4)? as u32;
        Ok(Ipv6FragmentHeader {
            next_header,
            fragment_offset: (offset_field >> 3) * 8,
            more_fragments: (offset_field & 0x1) != 0,
            identification,
        })
    }

    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("next_header", next_header_value(self.next_header));
        record.push("frag_offset", Value::Int(u64::from(self.fragment_offset)));
        record.push("mf", Value::Bool(self.more_fragments));
        record.push("id", Value::Int(u64::from(self.identification)));
        record
    }
}

///IP authentication header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IpAuthHeader {
    pub next_header: u8,
    ///Header length in bytes (wire value counts 4 octet units minus 2).
    pub header_len: usize,
    pub spi: u32,
    pub sequence: u32,
    pub icv: Vec<u8>,
}

impl IpAuthHeader {
    pub const MIN_LEN: usize = 12;

    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<IpAuthHeader, DecodeError> {
        let start = cursor.offset();
        let next_header = cursor.read_uint(1)? as u8;
        let payload_len = cursor.read_uint(1)? as usize;
        let header_len = 4 * (payload_len + 2);
        if header_len < IpAuthHeader::MIN_LEN {
            return Err(DecodeError::MalformedHeader {
                offset: start,
                reason: "authentication header length is smaller than its fixed fields",
            });
        }
        let _reserved = cursor.read_uint(2)?;
        let spi = cursor.read_uint(4)? as u32;
        let sequence = cursor.read_uint(4)? as u32;
        let icv = cursor.read(header_len - IpAuthHeader::MIN_LEN)?.to_vec();
        Ok(IpAuthHeader {
            next_header,
            header_len,
            spi,
            sequence,
            icv,
        })
    }

    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("next_header", next_header_value(self.next_header));
        record.push("length", Value::Int(self.header_len as u64));
        record.push("spi", Value::Int(u64::from(self.spi)));
        record.push("seq", Value::Int(u64::from(self.sequence)));
        record.push("icv", Value::Bytes(self.icv.clone()));
        record
    }
}

fn next_header_value(value: u8) -> Value {
    Value::Text(match registry::ip_number_name(value) {
        Some(name) => name.to_string(),
        None => format!("Unknown [{}]", value),
    })
}

pub fn decode_hop_by_hop(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = Ipv6OptionsHeader::read(cursor)?;
    let next_header = header.next_header;
    let header_len = header.header_len;
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "HOPOPT",
        long_name: "IPv6 Hop-by-Hop Options",
        layer: Some(Layer::Internet),
        header_len,
        payload_len: None,
        next: NextHint::IpNumber(next_header),
    })
}

pub fn decode_destination_options(
    cursor: &mut ByteCursor<'_>,
) -> Result<DecoderOutput, DecodeError> {
    let header = Ipv6OptionsHeader::read(cursor)?;
    let next_header = header.next_header;
    let header_len = header.header_len;
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "IPv6-Opts",
        long_name: "IPv6 Destination Options",
        layer: Some(Layer::Internet),
        header_len,
        payload_len: None,
        next: NextHint::IpNumber(next_header),
    })
}

pub fn decode_routing(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = Ipv6RoutingHeader::read(cursor)?;
    let next_header = header.next_header;
    let header_len = header.header_len;
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "IPv6-Route",
        long_name: "Routing Header for IPv6",
        layer: Some(Layer::Internet),
        header_len,
        payload_len: None,
        next: NextHint::IpNumber(next_header),
    })
}

///Decodes a fragment header. Only the first fragment carries the transport
///header, so decoding continues into the payload only at offset zero;
///later fragments keep their payload raw.
pub fn decode_fragment(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = Ipv6FragmentHeader::read(cursor)?;
    let next = if header.fragment_offset == 0 {
        NextHint::IpNumber(header.next_header)
    } else {
        NextHint::Raw
    };
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "IPv6-Frag",
        long_name: "Fragment Header for IPv6",
        layer: Some(Layer::Internet),
        header_len: Ipv6FragmentHeader::LEN,
        payload_len: None,
        next,
    })
}

pub fn decode_auth(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = IpAuthHeader::read(cursor)?;
    let next_header = header.next_header;
    let header_len = header.header_len;
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "AH",
        long_name: "Authentication Header",
        layer: Some(Layer::Internet),
        header_len,
        payload_len: None,
        next: NextHint::IpNumber(next_header),
    })
}

///Decodes an ESP header. Everything after the security parameters index &
///sequence number is encrypted, so the remainder stays raw and the chain
///ends here.
pub fn decode_esp(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let spi = cursor.read_uint(4)? as u32;
    let sequence = cursor.read_uint(4)? as u32;
    let data = cursor.read_remaining()?.to_vec();
    let mut record = Record::new();
    record.push("spi", Value::Int(u64::from(spi)));
    record.push("seq", Value::Int(u64::from(sequence)));
    record.push("data", Value::Bytes(data));
    Ok(DecoderOutput {
        record,
        short_name: "ESP",
        long_name: "Encapsulating Security Payload",
        layer: Some(Layer::Internet),
        header_len: 8,
        payload_len: None,
        next: NextHint::Terminal,
    })
}

///`IPv6-NoNxt`: there is nothing after this header; any trailing octets
///are ignored padding.
pub fn decode_no_next(_cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    Ok(DecoderOutput {
        record: Record::new(),
        short_name: "IPv6-NoNxt",
        long_name: "No Next Header for IPv6",
        layer: Some(Layer::Internet),
        header_len: 0,
        payload_len: None,
        next: NextHint::Terminal,
    })
}
