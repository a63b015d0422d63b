use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecoderOutput, NextHint};
use crate::record::{Record, Value};
use crate::DecodeError;

///TCP header according to RFC 793 (plus the NS flag of RFC 3540).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TcpHeader {
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_number: u32,
    pub acknowledgment_number: u32,
    ///Header length in bytes (data offset * 4, 20..=60).
    pub header_len: usize,
    pub ns: bool,
    pub cwr: bool,
    pub ece: bool,
    pub urg: bool,
    pub ack: bool,
    pub psh: bool,
    pub rst: bool,
    pub syn: bool,
    pub fin: bool,
    pub window_size: u16,
    pub checksum: u16,
    pub urgent_pointer: u16,
    pub options: Vec<TcpOption>,
}

///One option from the TCP options block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TcpOption {
    pub kind: u8,
    ///Total option length in bytes including the kind & length octets.
    pub length: u8,
    pub data: Vec<u8>,
}

impl TcpHeader {
    ///Size of the header without options in bytes.
    pub const MIN_LEN: usize = 20;

    ///Reads a TCP header (including its options block) from the cursor.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<TcpHeader, DecodeError> {
        let start = cursor.offset();
        let source_port = cursor.read_uint(2)? as u16;
        let destination_port = cursor.read_uint(2)? as u16;
        let sequence_number = cursor.read_uint(4)? as u32;
        let acknowledgment_number = cursor.read_uint(4)? as u32;
        let data_offset = cursor.read_bits(4)?;
        if data_offset < 5 {
            return Err(DecodeError::MalformedHeader {
                offset: start,
                reason: "TCP data offset is smaller than the header itself",
            });
        }
        let header_len = (data_offset as usize) * 4;
        let _reserved = cursor.read_bits(3)?;
        let ns = cursor.read_bits(1)? != 0;
        let cwr = cursor.read_bits(1)? != 0;
        let ece = cursor.read_bits(1)? != 0;
        let urg = cursor.read_bits(1)? != 0;
        let ack = cursor.read_bits(1)? != 0;
        let psh = cursor.read_bits(1)? != 0;
        let rst = cursor.read_bits(1)? != 0;
        let syn = cursor.read_bits(1)? != 0;
        let fin = cursor.read_bits(1)? != 0;
        let window_size = cursor.read_uint(2)? as u16;
        let checksum = cursor.read_uint(2)? as u16;
        let urgent_pointer = cursor.read_uint(2)? as u16;
        let mut options_block = cursor.sub(header_len - TcpHeader::MIN_LEN)?;
        let options = read_options(&mut options_block)?;
        Ok(TcpHeader {
            source_port,
            destination_port,
            sequence_number,
            acknowledgment_number,
            header_len,
            ns,
            cwr,
            ece,
            urg,
            ack,
            psh,
            rst,
            syn,
            fin,
            window_size,
            checksum,
            urgent_pointer,
            options,
        })
    }

    ///Emits the field record. The acknowledgment number is `ack`, the ACK
    ///flag `ack_flag`.
    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("srcport", Value::Int(u64::from(self.source_port)));
        record.push("dstport", Value::Int(u64::from(self.destination_port)));
        record.push("seq", Value::Int(u64::from(self.sequence_number)));
        record.push("ack", Value::Int(u64::from(self.acknowledgment_number)));
        record.push("hdr_len", Value::Int(self.header_len as u64));
        record.push("ns", Value::Bool(self.ns));
        record.push("cwr", Value::Bool(self.cwr));
        record.push("ece", Value::Bool(self.ece));
        record.push("urg", Value::Bool(self.urg));
        record.push("ack_flag", Value::Bool(self.ack));
        record.push("psh", Value::Bool(self.psh));
        record.push("rst", Value::Bool(self.rst));
        record.push("syn", Value::Bool(self.syn));
        record.push("fin", Value::Bool(self.fin));
        record.push("window_size", Value::Int(u64::from(self.window_size)));
        record.push("checksum", Value::Int(u64::from(self.checksum)));
        record.push("urgent_pointer", Value::Int(u64::from(self.urgent_pointer)));
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

///Reads the options block. End-of-option-list (kind 0) terminates the
///list, no-operation (kind 1) is a single octet, everything else carries a
///length octet counting itself & the kind octet.
fn read_options(cursor: &mut ByteCursor<'_>) -> Result<Vec<TcpOption>, DecodeError> {
    let mut options = Vec::new();
    while !cursor.is_empty() {
        let kind = cursor.read_uint(1)? as u8;
        match kind {
            0 => {
                options.push(TcpOption {
                    kind,
                    length: 1,
                    data: Vec::new(),
                });
                break;
            }
            1 => {
                options.push(TcpOption {
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
                        reason: "TCP option length is smaller than the option prefix",
                    });
                }
                let data = cursor.read(usize::from(length) - 2)?.to_vec();
                options.push(TcpOption { kind, length, data });
            }
        }
    }
    Ok(options)
}

///Decodes one TCP header. TCP declares no payload length of its own, the
///enclosing IP layer bounds it; the application protocol resolves through
///the port registry (destination port first, source port as fallback).
pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = TcpHeader::read(cursor)?;
    let header_len = header.header_len;
    Ok(DecoderOutput {
        short_name: "TCP",
        long_name: "Transmission Control Protocol",
        layer: Some(Layer::Transport),
        header_len,
        payload_len: None,
        next: NextHint::Port {
            destination: header.destination_port,
            source: header.source_port,
        },
        record: header.record(),
    })
}
