//! Source encoding detection for feed documents.
//!
//! Feeds arrive as bytes in whatever encoding the publisher chose. Before the
//! XML is walked, the bytes are transcoded to UTF-8 using the first encoding
//! found in this order:
//!
//! 1. A byte order mark (UTF-8, UTF-16LE, UTF-16BE)
//! 2. The `encoding` pseudo-attribute of the XML declaration
//! 3. The `charset` parameter of the transport `Content-Type`
//! 4. UTF-8
//!
//! Labels are resolved with the WHATWG rules implemented by `encoding_rs`, so
//! `ISO-8859-1` maps to `windows-1252` as browsers do.

use std::borrow::Cow;

use encoding_rs::{Encoding, REPLACEMENT, UTF_16BE, UTF_16LE, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;

use super::parser::DocumentError;

/// Transcodes a feed document to UTF-8.
///
/// `content_type` is the raw `Content-Type` header value when the bytes came
/// over HTTP. Returns a borrowed string when the input is already valid UTF-8.
///
/// # Errors
///
/// - [`DocumentError::UnsupportedCharset`] if the declared label is unknown
/// - [`DocumentError::InvalidEncoding`] if the bytes are not valid in the
///   detected encoding
pub fn decode_document<'a>(
    bytes: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, DocumentError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        tracing::debug!(encoding = encoding.name(), "Byte order mark found");
        return decode_with(encoding, &bytes[bom_len..]);
    }

    if let Some(label) = declared_encoding(bytes) {
        let encoding = resolve_label(&label)?;
        // The declaration was readable as ASCII, so the document cannot be UTF-16
        let encoding = if encoding == UTF_16LE || encoding == UTF_16BE {
            UTF_8
        } else {
            encoding
        };
        return decode_with(encoding, bytes);
    }

    if let Some(label) = content_type.and_then(charset_param) {
        let encoding = resolve_label(&label)?;
        return decode_with(encoding, bytes);
    }

    decode_with(UTF_8, bytes)
}

fn decode_with<'a>(
    encoding: &'static Encoding,
    bytes: &'a [u8],
) -> Result<Cow<'a, str>, DocumentError> {
    tracing::debug!(encoding = encoding.name(), bytes = bytes.len(), "Decoding document");
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(DocumentError::InvalidEncoding(encoding.name()))
}

fn resolve_label(label: &str) -> Result<&'static Encoding, DocumentError> {
    match Encoding::for_label(label.as_bytes()) {
        Some(encoding) if encoding != REPLACEMENT => Ok(encoding),
        _ => {
            tracing::warn!(label = %label, "Unsupported character encoding");
            Err(DocumentError::UnsupportedCharset(label.to_owned()))
        }
    }
}

/// Reads the `encoding` pseudo-attribute from a leading XML declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let Ok(Event::Decl(decl)) = reader.read_event_into(&mut buf) else {
        return None;
    };
    decl.encoding()
        .and_then(Result::ok)
        .map(|label| String::from_utf8_lossy(&label).into_owned())
}

/// Extracts the `charset` parameter of a `Content-Type` value.
fn charset_param(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"').to_owned())
            } else {
                None
            }
        })
        .filter(|label| !label.is_empty())
}
