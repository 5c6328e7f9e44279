//! # Envelope
//!
//! The JSON document that stands in for a binary header. Outgoing payloads
//! are JSON objects; the encoder adds the header fields to them and the
//! decoder reads them back.
//!
//! ## Wire Format
//! ```text
//! {"sync":2881141419,"msgId":7,<payload fields...>,"msgSize":6}
//! ```
//!
//! Payloads arrive without their final closing delimiter and sometimes with a
//! trailing placeholder byte, so both directions recover the document from a
//! small set of candidates. Candidates that need a delimiter appended are
//! built in a scratch buffer; caller-owned bytes are only ever borrowed.

use crate::config::SYNC_MAGIC;
use crate::core::message::{payload_size_of, MessageHeader};
use crate::error::{constants, ProtocolError, Result};
use bytes::Bytes;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::{Map, Value};
use std::fmt;
use tracing::trace;

/// Byte appended to close an unterminated document
pub const CLOSING_DELIMITER: u8 = b'}';

pub const SYNC_FIELD: &str = "sync";
pub const MSG_ID_FIELD: &str = "msgId";
pub const MSG_SIZE_FIELD: &str = "msgSize";

/// Room reserved for the header fields added to a payload
const ENVELOPE_OVERHEAD: usize = 64;

/// Parsed JSON object
pub type Document = Map<String, Value>;

/// Header fields carried by a validated envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub sync: u32,
    pub msg_id: u32,
    pub msg_size: u32,
}

impl Envelope {
    /// Extract and validate the header fields of `doc`.
    ///
    /// A `sync` value other than [`SYNC_MAGIC`] is rejected before the other
    /// fields are looked at.
    pub fn from_document(doc: &Document) -> Result<Self> {
        if let Some(sync) = doc.get(SYNC_FIELD) {
            if sync.as_u64() != Some(u64::from(SYNC_MAGIC)) {
                return Err(ProtocolError::IllegalArgument(format!(
                    "{}: got {sync}",
                    constants::ERR_SYNC_MISMATCH
                )));
            }
        }

        Ok(Self {
            sync: required_u32(doc, SYNC_FIELD)?,
            msg_id: required_u32(doc, MSG_ID_FIELD)?,
            msg_size: required_u32(doc, MSG_SIZE_FIELD)?,
        })
    }

    /// Header for the single complete part this envelope describes
    pub fn header(&self) -> MessageHeader {
        MessageHeader::unsegmented(self.msg_id, self.msg_size)
    }
}

/// Wrap an outgoing payload into an envelope.
///
/// `sync` and `msgId` are added when the payload does not carry them. A
/// payload that already carries them must agree with [`SYNC_MAGIC`] and
/// `msg_id`, otherwise it is rejected with
/// [`ProtocolError::IllegalArgument`]. `msgSize` is always set to the length
/// of `payload` as given.
pub fn wrap_payload(payload: &[u8], msg_id: u32) -> Result<Bytes> {
    let Some((_, trimmed)) = payload.split_last() else {
        return Err(ProtocolError::ParseFailure(
            constants::ERR_EMPTY_PAYLOAD.to_string(),
        ));
    };
    let msg_size = payload_size_of(payload)?;

    let mut doc = recover_document(&[payload, trimmed])?;
    match doc.get(SYNC_FIELD) {
        None => {
            doc.insert(SYNC_FIELD.to_string(), Value::from(SYNC_MAGIC));
        }
        Some(sync) if sync.as_u64() == Some(u64::from(SYNC_MAGIC)) => {}
        Some(sync) => {
            return Err(ProtocolError::IllegalArgument(format!(
                "{}: got {sync}",
                constants::ERR_SYNC_MISMATCH
            )));
        }
    }
    match doc.get(MSG_ID_FIELD) {
        None => {
            doc.insert(MSG_ID_FIELD.to_string(), Value::from(msg_id));
        }
        Some(id) if id.as_u64() == Some(u64::from(msg_id)) => {}
        Some(id) => {
            return Err(ProtocolError::IllegalArgument(format!(
                "{}: got {id}, expected {msg_id}",
                constants::ERR_MSG_ID_CONFLICT
            )));
        }
    }
    doc.insert(MSG_SIZE_FIELD.to_string(), Value::from(msg_size));

    let mut out = Vec::new();
    out.try_reserve(payload.len() + ENVELOPE_OVERHEAD)?;
    serde_json::to_writer(&mut out, &doc)
        .map_err(|e| ProtocolError::ParseFailure(e.to_string()))?;
    Ok(Bytes::from(out))
}

/// Parse and validate a received envelope without touching `data`.
pub fn read_envelope(data: &[u8]) -> Result<Envelope> {
    if data.is_empty() {
        return Err(ProtocolError::ParseFailure(
            constants::ERR_EMPTY_ENVELOPE.to_string(),
        ));
    }

    let stripped = strip_padding(data);
    let doc = if stripped.len() == data.len() {
        recover_document(&[data])?
    } else {
        recover_document(&[data, stripped])?
    };
    Envelope::from_document(&doc)
}

/// Try each candidate as-is, then closed with [`CLOSING_DELIMITER`]; the
/// first JSON object wins. Reports the error of the first candidate.
fn recover_document(candidates: &[&[u8]]) -> Result<Document> {
    let mut first_error = None;

    for candidate in candidates.iter().filter(|c| !c.is_empty()) {
        match parse_object(candidate) {
            Ok(doc) => return Ok(doc),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }

        let closed = closed_copy(candidate)?;
        match parse_object(&closed) {
            Ok(doc) => {
                trace!(len = candidate.len(), "recovered document by closing it");
                return Ok(doc);
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(ProtocolError::ParseFailure(first_error.unwrap_or_else(|| {
        constants::ERR_NOT_AN_OBJECT.to_string()
    })))
}

fn parse_object(candidate: &[u8]) -> std::result::Result<Document, String> {
    serde_json::from_slice::<HeaderObject>(candidate)
        .map(|HeaderObject(doc)| doc)
        .map_err(|e| e.to_string())
}

/// JSON object in which each header field appears at most once. Repeated
/// payload keys keep their last value.
struct HeaderObject(Document);

impl<'de> Deserialize<'de> for HeaderObject {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeaderObjectVisitor;

        impl<'de> Visitor<'de> for HeaderObjectVisitor {
            type Value = HeaderObject;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut doc = Document::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    let is_header =
                        matches!(key.as_str(), SYNC_FIELD | MSG_ID_FIELD | MSG_SIZE_FIELD);
                    if is_header && doc.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate field `{key}`")));
                    }
                    doc.insert(key, value);
                }
                Ok(HeaderObject(doc))
            }
        }

        deserializer.deserialize_map(HeaderObjectVisitor)
    }
}

fn closed_copy(candidate: &[u8]) -> Result<Vec<u8>> {
    let mut scratch = Vec::new();
    scratch.try_reserve_exact(candidate.len() + 1)?;
    scratch.extend_from_slice(candidate);
    scratch.push(CLOSING_DELIMITER);
    Ok(scratch)
}

/// Drop trailing NUL bytes and ASCII whitespace left behind by transports
fn strip_padding(data: &[u8]) -> &[u8] {
    let end = data
        .iter()
        .rposition(|b| *b != 0 && !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &data[..end]
}

fn required_u32(doc: &Document, name: &'static str) -> Result<u32> {
    let value = doc.get(name).ok_or(ProtocolError::MissingField(name))?;
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            ProtocolError::IllegalArgument(format!("field '{name}' is not a u32: {value}"))
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn doc(text: &str) -> Document {
        serde_json::from_str(text).expect("valid test document")
    }

    #[test]
    fn test_wrap_unterminated_payload() {
        let out = wrap_payload(br#"{"a":1"#, 7).expect("wrap");
        let wrapped = doc(std::str::from_utf8(&out).unwrap());
        assert_eq!(wrapped["a"], 1);
        assert_eq!(wrapped[SYNC_FIELD], u64::from(SYNC_MAGIC));
        assert_eq!(wrapped[MSG_ID_FIELD], 7);
        assert_eq!(wrapped[MSG_SIZE_FIELD], 6);
    }

    #[test]
    fn test_wrap_with_placeholder_byte() {
        let out = wrap_payload(b"{\"a\":1}\0", 1).expect("wrap");
        let wrapped = doc(std::str::from_utf8(&out).unwrap());
        assert_eq!(wrapped["a"], 1);
        assert_eq!(wrapped[MSG_SIZE_FIELD], 8);
    }

    #[test]
    fn test_wrap_prefers_untrimmed_document() {
        // trimming first would turn 12 into 1
        let out = wrap_payload(br#"{"a":12"#, 1).expect("wrap");
        let wrapped = doc(std::str::from_utf8(&out).unwrap());
        assert_eq!(wrapped["a"], 12);
    }

    #[test]
    fn test_wrap_accepts_matching_header_fields() {
        let out = wrap_payload(br#"{"sync":2881141419,"msgId":9,"x":true}"#, 9).expect("wrap");
        let wrapped = doc(std::str::from_utf8(&out).unwrap());
        assert_eq!(wrapped[SYNC_FIELD], u64::from(SYNC_MAGIC));
        assert_eq!(wrapped[MSG_ID_FIELD], 9);
        assert!(read_envelope(&out).is_ok());
    }

    #[test]
    fn test_wrap_rejects_conflicting_header_fields() {
        for payload in [
            &br#"{"sync":5,"x":true}"#[..],
            &br#"{"sync":"2881141419","x":true}"#[..],
            &br#"{"msgId":9,"x":true}"#[..],
            &br#"{"msgId":"x","x":true}"#[..],
            &br#"{"msgId":-1"#[..],
        ] {
            match wrap_payload(payload, 1) {
                Err(ProtocolError::IllegalArgument(_)) => {}
                other => panic!("unexpected result for {payload:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_duplicate_header_field_rejected() {
        let text = br#"{"sync":5,"sync":2881141419,"msgId":1,"msgSize":1}"#;
        match read_envelope(text) {
            Err(ProtocolError::ParseFailure(reason)) => assert!(reason.contains("duplicate field")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            wrap_payload(br#"{"msgId":1,"msgId":2"#, 2),
            Err(ProtocolError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_duplicate_payload_field_keeps_last() {
        let out = wrap_payload(br#"{"a":1,"a":2"#, 1).expect("wrap");
        let wrapped = doc(std::str::from_utf8(&out).unwrap());
        assert_eq!(wrapped["a"], 2);
    }

    #[test]
    fn test_wrap_overwrites_msg_size() {
        let payload = br#"{"msgSize":999}"#;
        let out = wrap_payload(payload, 1).expect("wrap");
        let wrapped = doc(std::str::from_utf8(&out).unwrap());
        assert_eq!(wrapped[MSG_SIZE_FIELD], payload.len());
    }

    #[test]
    fn test_wrap_rejects_garbage() {
        for payload in [&b""[..], &b"x"[..], &b"not json"[..], &b"[1,2,3]"[..], &b"42"[..]] {
            match wrap_payload(payload, 1) {
                Err(ProtocolError::ParseFailure(_)) => {}
                other => panic!("unexpected result for {payload:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_read_strips_padding() {
        let envelope =
            read_envelope(b"{\"sync\":2881141419,\"msgId\":4,\"msgSize\":10}\0\0\n").expect("read");
        assert_eq!(envelope.msg_id, 4);
        assert_eq!(envelope.msg_size, 10);
    }

    #[test]
    fn test_read_closes_unterminated_envelope() {
        let envelope = read_envelope(br#"{"sync":2881141419,"msgId":4,"msgSize":10"#).expect("read");
        assert_eq!(envelope.sync, SYNC_MAGIC);
    }

    #[test]
    fn test_sync_checked_before_missing_fields() {
        match Envelope::from_document(&doc(r#"{"sync":1}"#)) {
            Err(ProtocolError::IllegalArgument(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_fields_reported_by_name() {
        let cases = [
            (r#"{"msgId":1,"msgSize":2}"#, SYNC_FIELD),
            (r#"{"sync":2881141419,"msgSize":2}"#, MSG_ID_FIELD),
            (r#"{"sync":2881141419,"msgId":1}"#, MSG_SIZE_FIELD),
        ];
        for (text, field) in cases {
            match Envelope::from_document(&doc(text)) {
                Err(ProtocolError::MissingField(name)) => assert_eq!(name, field),
                other => panic!("unexpected result for {text}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_out_of_range_fields_rejected() {
        for text in [
            r#"{"sync":2881141419,"msgId":-1,"msgSize":2}"#,
            r#"{"sync":2881141419,"msgId":1,"msgSize":4294967296}"#,
            r#"{"sync":2881141419,"msgId":"1","msgSize":2}"#,
        ] {
            match Envelope::from_document(&doc(text)) {
                Err(ProtocolError::IllegalArgument(_)) => {}
                other => panic!("unexpected result for {text}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_strip_padding() {
        assert_eq!(strip_padding(b"{}\0 \t"), b"{}");
        assert_eq!(strip_padding(b"\0\0"), b"");
        assert_eq!(strip_padding(b"{}"), b"{}");
    }
}
