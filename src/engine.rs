use crate::application::httpv1;
use crate::chain::{Layer, ProtoChain};
use crate::cursor::ByteCursor;
use crate::internet::{ipv4, ipv6, ipv6_extension};
use crate::link::{arp, ethernet};
use crate::record::{Record, Value};
use crate::registry::{self, DecoderId, ProtoDescriptor};
use crate::transport::{tcp, udp};
use crate::{DecodeError, FrameError};

///Upper bound on decoder invocations per frame. A frame that chains more
///layers than this (only possible with pathological extension header or
///tunnel constructions) has its remainder handed to the raw decoder.
const MAX_DEPTH: usize = 32;

///Options steering protocol specific decode behavior.
#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
    ///Match the reserved HTTP header field names `request`/`response` case
    ///insensitively when renaming them to `request_field`/`response_field`.
    ///Off by default: only the exact lowercase names are renamed.
    pub http_reserved_names_ignore_case: bool,
}

///Result of a full recursive frame decode.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFrame {
    ///Top level info record; nested layers appear under the lowercased
    ///short name of the child protocol.
    pub info: Record,
    ///Short names of all successfully decoded layers, in decoding order.
    pub chain: ProtoChain,
    ///Octets attributed to headers, payloads, padding & raw tails.
    pub consumed: usize,
}

///What a single decoder invocation hands back to the dispatch engine.
#[derive(Clone, Debug, PartialEq)]
pub struct DecoderOutput {
    ///Ordered field record of the decoded header.
    pub record: Record,
    ///Short protocol name recorded in the chain (for the ARP family this
    ///is the operation dependent variant, e.g. `InARP`).
    pub short_name: &'static str,
    ///Full protocol name.
    pub long_name: &'static str,
    ///Layer of the decoded protocol; `None` for the raw fallback.
    pub layer: Option<Layer>,
    ///Octets consumed by the header itself.
    pub header_len: usize,
    ///Payload length the header declared, if it declared one. The engine
    ///bounds the child decoder to this many octets.
    pub payload_len: Option<usize>,
    ///Next layer nomination.
    pub next: NextHint,
}

///Next layer nomination returned by a decoder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NextHint {
    ///Dispatch through the EtherType registry.
    Ether(u16),
    ///Dispatch through the IP protocol number registry.
    IpNumber(u8),
    ///Dispatch through the well known port registry; the destination port
    ///is tried first, the source port is the fallback.
    Port { destination: u16, source: u16 },
    ///Hand the remaining payload to the raw decoder.
    Raw,
    ///No next layer.
    Terminal,
}

///Decodes a single captured frame starting with the decoder named by
///`hint` (usually [`crate::LINK_ETHERNET`]).
///
///Errors below the first layer degrade to `__error__` markers plus a raw
///tail inside the returned frame; only a failure of the initial decoder
///itself surfaces as `FrameError`.
pub fn decode_frame(data: &[u8], hint: ProtoDescriptor) -> Result<DecodedFrame, FrameError> {
    decode_frame_with_options(data, hint, &DecodeOptions::default())
}

///Same as [`decode_frame`] with explicit decode options.
pub fn decode_frame_with_options(
    data: &[u8],
    hint: ProtoDescriptor,
    options: &DecodeOptions,
) -> Result<DecodedFrame, FrameError> {
    let mut cursor = ByteCursor::new(data);
    let mut chain = ProtoChain::new();
    match decode_layer(&mut cursor, hint, &mut chain, options, 0) {
        Ok(layer) => Ok(DecodedFrame {
            info: layer.record,
            chain,
            consumed: cursor.offset(),
        }),
        Err(error) => Err(FrameError { error, chain }),
    }
}

///One decoded layer plus the field name it nests under in its parent.
struct LayerResult {
    record: Record,
    field_name: &'static str,
}

///Runs the decoder for `proto` on `cursor`, then recurses into the
///nominated next layer over a bounded sub-cursor.
///
///An `Err` means the decoder for this layer itself failed; in that case
///nothing was appended to `chain`. Failures of child layers are absorbed
///here and turned into `__error__` markers plus a raw tail.
fn decode_layer(
    cursor: &mut ByteCursor<'_>,
    proto: ProtoDescriptor,
    chain: &mut ProtoChain,
    options: &DecodeOptions,
    depth: usize,
) -> Result<LayerResult, DecodeError> {
    let out = run_decoder(proto.decoder, cursor, options)?;
    chain.push(out.short_name, out.layer);
    let field_name = nested_field_name(out.short_name);
    let mut record = out.record;

    match out.next {
        NextHint::Terminal => {
            //octets trailing a terminal header (e.g. link layer padding
            //after a minimal ARP packet) stay with this layer
            if !cursor.is_empty() {
                record.push("padding", Value::Bytes(cursor.read_remaining()?.to_vec()));
            }
        }
        NextHint::Raw => {
            if !cursor.is_empty() {
                let child = decode_layer(cursor, registry::RAW, chain, options, depth + 1)?;
                record.push(child.field_name, Value::Record(child.record));
            }
        }
        hint => {
            let next = resolve_hint(hint);
            //stop malformed tunnel loops & runaway chains
            let next = if depth + 1 >= MAX_DEPTH
                || chain.contains_at_layer(next.short_name, next.layer)
            {
                registry::RAW
            } else {
                next
            };

            match out.payload_len {
                Some(declared) if declared > cursor.remaining() => {
                    //the header promised more payload than the capture holds
                    record.push(
                        "__error__",
                        error_marker(&DecodeError::TruncatedPacket {
                            offset: cursor.offset(),
                            declared,
                            available: cursor.remaining(),
                        }),
                    );
                    if !cursor.is_empty() {
                        let child = decode_layer(cursor, registry::RAW, chain, options, depth + 1)?;
                        record.push(child.field_name, Value::Record(child.record));
                    }
                }
                _ => {
                    let bound = out.payload_len.unwrap_or_else(|| cursor.remaining());
                    //an empty payload is not recursed into, except for
                    //IPv6-NoNxt whose whole point is to be empty
                    if bound > 0 || next.decoder == DecoderId::NoNext {
                        let mut payload = cursor.sub(bound)?;
                        let unparsed = payload.clone();
                        match decode_layer(&mut payload, next, chain, options, depth + 1) {
                            Ok(child) => {
                                record.push(child.field_name, Value::Record(child.record));
                            }
                            Err(error) => {
                                //the child decoder failed; keep the frame,
                                //mark the slot and raw-decode its payload
                                record.push("__error__", error_marker(&error));
                                let mut rest = unparsed;
                                let child =
                                    decode_layer(&mut rest, registry::RAW, chain, options, depth + 1)?;
                                record.push(child.field_name, Value::Record(child.record));
                            }
                        }
                    }
                    //octets past the declared payload (capture padding)
                    if !cursor.is_empty() {
                        record.push("padding", Value::Bytes(cursor.read_remaining()?.to_vec()));
                    }
                }
            }
        }
    }

    Ok(LayerResult { record, field_name })
}

///Resolves a next layer nomination through the matching registry.
fn resolve_hint(hint: NextHint) -> ProtoDescriptor {
    match hint {
        NextHint::Ether(value) => registry::ether_type_lookup(value),
        NextHint::IpNumber(value) => registry::ip_number_lookup(value),
        NextHint::Port {
            destination,
            source,
        } => {
            let by_destination = registry::port_lookup(destination);
            if by_destination.decoder != DecoderId::Raw {
                by_destination
            } else {
                let by_source = registry::port_lookup(source);
                if by_source.decoder != DecoderId::Raw {
                    by_source
                } else {
                    registry::RAW
                }
            }
        }
        NextHint::Raw | NextHint::Terminal => registry::RAW,
    }
}

///Central decoder table. Decoders never call each other; every dispatch
///goes through this table so new protocols plug in without touching the
///existing ones.
fn run_decoder(
    id: DecoderId,
    cursor: &mut ByteCursor<'_>,
    options: &DecodeOptions,
) -> Result<DecoderOutput, DecodeError> {
    match id {
        DecoderId::Ethernet => ethernet::decode(cursor),
        DecoderId::Arp => arp::decode(cursor),
        DecoderId::Ipv4 => ipv4::decode(cursor),
        DecoderId::Ipv6 => ipv6::decode(cursor),
        DecoderId::Ipv6HopByHop => ipv6_extension::decode_hop_by_hop(cursor),
        DecoderId::Ipv6Route => ipv6_extension::decode_routing(cursor),
        DecoderId::Ipv6Frag => ipv6_extension::decode_fragment(cursor),
        DecoderId::Ipv6DestOpts => ipv6_extension::decode_destination_options(cursor),
        DecoderId::AuthHeader => ipv6_extension::decode_auth(cursor),
        DecoderId::Esp => ipv6_extension::decode_esp(cursor),
        DecoderId::NoNext => ipv6_extension::decode_no_next(cursor),
        DecoderId::Tcp => tcp::decode(cursor),
        DecoderId::Udp => udp::decode(cursor),
        DecoderId::Http => httpv1::decode(cursor, options),
        DecoderId::Raw => raw_decode(cursor),
    }
}

///Fallback decoder: captures the remaining octets verbatim into a single
///`packet` field and terminates the chain. An already exhausted cursor is
///an error; the engine only hands non empty payloads to this decoder.
fn raw_decode(cursor: &mut ByteCursor<'_>) -> Result<DecoderOutput, DecodeError> {
    if cursor.is_empty() {
        return Err(DecodeError::UnexpectedEnd {
            offset: cursor.offset(),
            expected: 1,
            remaining: 0,
        });
    }
    let payload = cursor.read_remaining()?;
    let mut record = Record::new();
    record.push("packet", Value::Bytes(payload.to_vec()));
    Ok(DecoderOutput {
        record,
        short_name: "Raw",
        long_name: "Raw Packet Data",
        layer: None,
        header_len: payload.len(),
        payload_len: None,
        next: NextHint::Terminal,
    })
}

///Field name a child layer nests under inside its parent record.
fn nested_field_name(short_name: &'static str) -> &'static str {
    match short_name {
        "Ethernet" => "ethernet",
        "ARP" => "arp",
        "RARP" => "rarp",
        "DRARP" => "drarp",
        "InARP" => "inarp",
        "IPv4" => "ipv4",
        "IPv6" => "ipv6",
        "HOPOPT" => "hopopt",
        "IPv6-Route" => "ipv6_route",
        "IPv6-Frag" => "ipv6_frag",
        "IPv6-Opts" => "ipv6_opts",
        "IPv6-NoNxt" => "ipv6_nonxt",
        "AH" => "ah",
        "ESP" => "esp",
        "TCP" => "tcp",
        "UDP" => "udp",
        "HTTP" => "http",
        "Raw" => "raw",
        _ => "payload",
    }
}

///Record stored under `__error__` when a child layer fails: the error kind
///plus the frame offset it was detected at.
fn error_marker(error: &DecodeError) -> Value {
    let mut record = Record::new();
    record.push("error", Value::Text(error.kind().to_string()));
    record.push("offset", Value::Int(error.offset() as u64));
    Value::Record(record)
}
