use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecoderOutput, NextHint};
use crate::record::{Record, Value};
use crate::DecodeError;

///UDP header according to RFC 768.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UdpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    ///Length of header plus payload in bytes.
    pub length: u16,
    pub checksum: u16,
}

impl UdpHeader {
    ///Serialized size of the header in bytes.
    pub const LEN: usize = 8;

    ///Reads a UDP header from the cursor.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<UdpHeader, DecodeError> {
        let start = cursor.offset();
        let header = UdpHeader {
            source_port: cursor.read_uint(2)? as u16,
            destination_port: cursor.read_uint(2)? as u16,
            length: cursor.read_uint(2)? as u16,
            checksum: cursor.read_uint(2)? as u16,
        };
        if usize::from(header.length) < UdpHeader::LEN {
            return Err(DecodeError::MalformedHeader {
                offset: start,
                reason: "UDP length is smaller than the header",
            });
        }
        Ok(header)
    }

    ///Payload length declared by the header in bytes.
    pub fn payload_len(&self) -> usize {
        usize::from(self.length) - UdpHeader::LEN
    }

    ///Emits the field record (`srcport`, `dstport`, `len`, `checksum`).
    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("srcport", Value::Int(u64::from(self.source_port)));
        record.push("dstport", Value::Int(u64::from(self.destination_port)));
        record.push("len", Value::Int(u64::from(self.length)));
        record.push("checksum", Value::Int(u64::from(self.checksum)));
        record
    }
}

///Decodes one UDP header. The payload is bounded by the declared length;
///the application protocol resolves through the port registry (destination
///port first, source port as fallback).
pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = UdpHeader::read(cursor)?;
    Ok(DecoderOutput {
        short_name: "UDP",
        long_name: "User Datagram Protocol",
        layer: Some(Layer::Transport),
        header_len: UdpHeader::LEN,
        payload_len: Some(header.payload_len()),
        next: NextHint::Port {
            destination: header.destination_port,
            source: header.source_port,
        },
        record: header.record(),
    })
}
