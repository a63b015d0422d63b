//! HTTP/1.x decoder.
//!
//! Structure of an HTTP/1.x message (RFC 7230):
//!
//! ```text
//! HTTP-message   :==: start-line
//!                     *( header-field CRLF )
//!                     CRLF
//!                     [ message-body ]
//! start-line     :==: request-line / status-line
//! request-line   :==: method SP request-target SP HTTP-version
//! status-line    :==: HTTP-version SP status-code SP reason-phrase
//! header-field   :==: field-name ":" OWS field-value OWS
//! ```

use crate::chain::Layer;
use crate::cursor::ByteCursor;
use crate::engine::{DecodeOptions, DecoderOutput, NextHint};
use crate::record::{Record, Value};
use crate::DecodeError;

use chardetng::EncodingDetector;

const METHODS: [&str; 8] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE",
];

///Decodes an HTTP/1.x message from the whole remaining application
///payload. Terminal.
pub fn decode(
    cursor: &mut ByteCursor<'_>,
    options: &DecodeOptions,
) -> Result<DecoderOutput, DecodeError> {
    let start = cursor.offset();
    let payload = cursor.read_remaining()?;
    let split = find(payload, b"\r\n\r\n").ok_or(DecodeError::MalformedHeader {
        offset: start,
        reason: "HTTP header/body separator is missing",
    })?;
    let header_block = &payload[..split];
    let body = &payload[split + 4..];

    let mut record = read_header(header_block, options, start)?;
    record.push("body", body_value(body));

    Ok(DecoderOutput {
        record,
        short_name: "HTTP",
        long_name: "Hypertext Transfer Protocol",
        layer: Some(Layer::Application),
        header_len: split + 4,
        payload_len: None,
        next: NextHint::Terminal,
    })
}

///Reads the start line & header fields into a record: `receipt`, the
///classified start line nested under `request`/`response`, then the header
///fields in wire order.
fn read_header(
    block: &[u8],
    options: &DecodeOptions,
    offset: usize,
) -> Result<Record, DecodeError> {
    let line_end = find(block, b"\r\n").ok_or(DecodeError::MalformedHeader {
        offset,
        reason: "HTTP start line is not followed by header fields",
    })?;
    let start_line =
        std::str::from_utf8(&block[..line_end]).map_err(|_| DecodeError::MalformedHeader {
            offset,
            reason: "HTTP start line is not valid text",
        })?;
    let (first, second, third) =
        split_start_line(start_line).ok_or(DecodeError::MalformedHeader {
            offset,
            reason: "HTTP start line does not have three fields",
        })?;

    let mut record = Record::new();
    if METHODS.contains(&first) && http_version(third).is_some() {
        let mut request = Record::new();
        request.push("method", Value::Text(first.to_string()));
        request.push("target", Value::Text(second.to_string()));
        request.push(
            "version",
            Value::Text(http_version(third).unwrap_or_default()),
        );
        record.push("receipt", Value::Text("request".to_string()));
        record.push("request", Value::Record(request));
    } else if let (Some(version), Some(status)) = (http_version(first), status_code(second)) {
        let mut response = Record::new();
        response.push("version", Value::Text(version));
        response.push("status", Value::Int(status));
        response.push("phrase", Value::Text(third.to_string()));
        record.push("receipt", Value::Text("response".to_string()));
        record.push("response", Value::Record(response));
    } else {
        return Err(DecodeError::MalformedHeader {
            offset,
            reason: "HTTP start line is neither a request line nor a status line",
        });
    }

    for field in split_crlf(&block[line_end + 2..]) {
        let colon = find(field, b":").ok_or(DecodeError::MalformedHeader {
            offset,
            reason: "HTTP header field has no colon",
        })?;
        let name = String::from_utf8_lossy(&field[..colon]).trim().to_string();
        let value = String::from_utf8_lossy(&field[colon + 1..])
            .trim()
            .to_string();
        push_field(&mut record, rename_reserved(name, options), value);
    }

    Ok(record)
}

///Stores one header field, turning repeated names into an ordered list of
///values (first to last).
fn push_field(record: &mut Record, name: String, value: String) {
    if record.contains(&name) {
        match record.get_mut(&name) {
            Some(Value::List(values)) => values.push(Value::Text(value)),
            Some(existing) => {
                let first = existing.clone();
                *existing = Value::List(vec![first, Value::Text(value)]);
            }
            None => {}
        }
    } else {
        record.push(name, Value::Text(value));
    }
}

///The names `request` and `response` are reserved for the classified start
///line; header fields carrying them are stored under `request_field` /
///`response_field`. Matching is exact by default, case insensitive behind
///the options knob.
fn rename_reserved(name: String, options: &DecodeOptions) -> String {
    let matches = |reserved: &str| {
        if options.http_reserved_names_ignore_case {
            name.eq_ignore_ascii_case(reserved)
        } else {
            name == reserved
        }
    };
    if matches("request") {
        "request_field".to_string()
    } else if matches("response") {
        "response_field".to_string()
    } else {
        name
    }
}

///Splits a start line into its three whitespace separated fields; the
///third keeps any inner whitespace (reason phrases may contain spaces).
fn split_start_line(line: &str) -> Option<(&str, &str, &str)> {
    let first_end = line.find(|c: char| c.is_ascii_whitespace())?;
    let first = &line[..first_end];
    let rest = line[first_end..].trim_start();
    let second_end = rest.find(|c: char| c.is_ascii_whitespace())?;
    let second = &rest[..second_end];
    let third = rest[second_end..].trim_start();
    if first.is_empty() || second.is_empty() || third.is_empty() {
        return None;
    }
    Some((first, second, third))
}

///Extracts `<d>.<d>` from a `HTTP/<d>.<d>` token.
fn http_version(token: &str) -> Option<String> {
    let rest = token.strip_prefix("HTTP/")?;
    let bytes = rest.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
    {
        Some(rest[..3].to_string())
    } else {
        None
    }
}

fn status_code(token: &str) -> Option<u64> {
    if token.len() == 3 && token.bytes().all(|c| c.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

///Decodes the message body with the charset reported by the detector.
///Bytes that do not decode cleanly are kept unchanged; an empty body is
///the null value.
fn body_value(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    match encoding.decode_without_bom_handling_and_without_replacement(body) {
        Some(text) => Value::Text(text.into_owned()),
        None => Value::Bytes(body.to_vec()),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&index| &haystack[index..index + needle.len()] == needle)
}

fn split_crlf(mut block: &[u8]) -> Vec<&[u8]> {
    let mut fields = Vec::new();
    while let Some(index) = find(block, b"\r\n") {
        fields.push(&block[..index]);
        block = &block[index + 2..];
    }
    fields.push(block);
    fields
}
