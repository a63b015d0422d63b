use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecoderOutput, NextHint};
use crate::record::{MacAddr, Record, Value};
use crate::registry;
use crate::DecodeError;

///Ethernet II header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EthernetHeader {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub ether_type: u16,
}

impl EthernetHeader {
    ///Serialized size of the header in bytes.
    pub const LEN: usize = 14;

    ///Reads an Ethernet II header from the cursor.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<EthernetHeader, DecodeError> {
        Ok(EthernetHeader {
            destination: read_mac_address(cursor)?,
            source: read_mac_address(cursor)?,
            ether_type: cursor.read_uint(2)? as u16,
        })
    }

    ///Emits the field record (`dst`, `src`, `type`).
    pub fn record(&self) -> Record {
        let mut record = Record::new();
        record.push("dst", Value::Mac(self.destination));
        record.push("src", Value::Mac(self.source));
        record.push(
            "type",
            Value::Text(match registry::ether_type_name(self.ether_type) {
                Some(name) => name.to_string(),
                None => format!("Unknown [{}]", self.ether_type),
            }),
        );
        record
    }
}

fn read_mac_address(cursor: &mut ByteCursor<'_>) -> Result<MacAddr, DecodeError> {
    let bytes = cursor.read(6)?;
    let mut address = [0u8; 6];
    address.copy_from_slice(bytes);
    Ok(MacAddr(address))
}

///Decodes one Ethernet II header and nominates the encapsulated protocol
///through the EtherType registry.
pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    let header = EthernetHeader::read(cursor)?;
    Ok(DecoderOutput {
        record: header.record(),
        short_name: "Ethernet",
        long_name: "Ethernet Protocol",
        layer: Some(Layer::Link),
        header_len: EthernetHeader::LEN,
        payload_len: None,
        next: NextHint::Ether(header.ether_type),
    })
}
