use std::net::{Ipv4Addr, Ipv6Addr};

use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecoderOutput, NextHint};
use crate::record::{MacAddr, Record, Value};
use crate::registry;
use crate::DecodeError;

///One packet of the ARP family (ARP, RARP, DRARP, InARP).
///
///The four address fields keep the raw wire octets; how they render in the
///emitted record depends on the declared hardware & protocol types.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArpPacket {
    pub hardware_type: u16,
    pub protocol_type: u16,
    pub hardware_len: u8,
    pub protocol_len: u8,
    pub operation: u16,
    pub sender_hardware_addr: Vec<u8>,
    pub sender_protocol_addr: Vec<u8>,
    pub target_hardware_addr: Vec<u8>,
    pub target_protocol_addr: Vec<u8>,
}

impl ArpPacket {
    ///Size of the fixed prefix (htype, ptype, hlen, plen, oper) in bytes.
    pub const MIN_LEN: usize = 8;

    ///Reads an ARP family packet from the cursor. The four address fields
    ///use the lengths declared in the fixed prefix.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<ArpPacket, DecodeError> {
        let hardware_type = cursor.read_uint(2)? as u16;
        let protocol_type = cursor.read_uint(2)? as u16;
        let hardware_len = cursor.read_uint(1)? as u8;
        let protocol_len = cursor.read_uint(1)? as u8;
        let operation = cursor.read_uint(2)? as u16;
        Ok(ArpPacket {
            hardware_type,
            protocol_type,
            hardware_len,
            protocol_len,
            operation,
            sender_hardware_addr: cursor.read(hardware_len.into())?.to_vec(),
            sender_protocol_addr: cursor.read(protocol_len.into())?.to_vec(),
            target_hardware_addr: cursor.read(hardware_len.into())?.to_vec(),
            target_protocol_addr: cursor.read(protocol_len.into())?.to_vec(),
        })
    }

    ///Header length in bytes: the fixed prefix plus the four variable
    ///length address fields.
    pub fn header_len(&self) -> usize {
        ArpPacket::MIN_LEN + 2 * usize::from(self.hardware_len) + 2 * usize::from(self.protocol_len)
    }

    ///Short & long protocol names selected by the operation code. Codes
    ///outside the enumerated ranges classify as plain ARP.
    pub fn variant(&self) -> (&'static str, &'static str) {
        match self.operation {
            5 | 6 | 7 => ("DRARP", "Dynamic Reverse Address Resolution Protocol"),
            8 | 9 => ("InARP", "Inverse Address Resolution Protocol"),
            3 | 4 => ("RARP", "Reverse Address Resolution Protocol"),
            _ => ("ARP", "Address Resolution Protocol"),
        }
    }

    ///Renders a hardware address: Ethernet addresses of the regular six
    ///octets as a MAC, anything else as raw bytes.
    fn hardware_addr_value(&self, address: &[u8]) -> Value {
        if self.hardware_type == 1 && self.hardware_len == 6 {
            let mut mac = [0u8; 6];
            mac.copy_from_slice(address);
            Value::Mac(MacAddr(mac))
        } else {
            Value::Bytes(address.to_vec())
        }
    }

    ///Renders a protocol address: IPv4/IPv6 when type & length agree,
    ///anything else as raw bytes.
    fn protocol_addr_value(&self, address: &[u8]) -> Value {
        if self.protocol_type == registry::ether_type::IPV4 && self.protocol_len == 4 {
            Value::Ipv4(Ipv4Addr::new(address[0], address[1], address[2], address[3]))
        } else if self.protocol_type == registry::ether_type::IPV6 && self.protocol_len == 16 {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(address);
            Value::Ipv6(Ipv6Addr::from(octets))
        } else {
            Value::Bytes(address.to_vec())
        }
    }

    ///Emits the field record (`htype`, `ptype`, `hlen`, `plen`, `oper`,
    ///`sha`, `spa`, `tha`, `tpa`, `len`).
    pub fn record(&self) -> Record {
        let mut record = Record::new();
        let hardware_name = registry::arp_hardware_name(self.hardware_type);
        record.push(
            "htype",
            Value::Text(match hardware_name {
                Some(name) => name.to_string(),
                None => format!("Unknown [{}]", self.hardware_type),
            }),
        );
        //the protocol type field is only an EtherType for ethernet family
        //hardware
        let ethernet_family = hardware_name
            .map(|name| name.contains("Ethernet"))
            .unwrap_or(false);
        record.push(
            "ptype",
            Value::Text(if ethernet_family {
                match registry::ether_type_name(self.protocol_type) {
                    Some(name) => name.to_string(),
                    None => format!("Unknown [{}]", self.protocol_type),
                }
            } else {
                format!("Unknown [{}]", self.protocol_type)
            }),
        );
        record.push("hlen", Value::Int(u64::from(self.hardware_len)));
        record.push("plen", Value::Int(u64::from(self.protocol_len)));
        record.push(
            "oper",
            Value::Text(match registry::arp_operation_name(self.operation) {
                Some(name) => name.to_string(),
                None => format!("Unknown [{}]", self.operation),
            }),
        );
        record.push("sha", self.hardware_addr_value(&self.sender_hardware_addr));
        record.push("spa", self.protocol_addr_value(&self.sender_protocol_addr));
        record.push("tha", self.hardware_addr_value(&self.target_hardware_addr));
        record.push("tpa", self.protocol_addr_value(&self.target_protocol_addr));
        record.push("len", Value::Int(self.header_len() as u64));
        record
    }
}

///Decodes one ARP family packet. Terminal: ARP carries no payload of its
///own, trailing octets are link layer padding.
pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let packet = ArpPacket::read(cursor)?;
    let (short_name, long_name) = packet.variant();
    Ok(DecoderOutput {
        record: packet.record(),
        short_name,
        long_name,
        layer: Some(Layer::Link),
        header_len: packet.header_len(),
        payload_len: None,
        next: NextHint::Terminal,
    })
}
