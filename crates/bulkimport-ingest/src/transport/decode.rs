//! Response body decoding
//!
//! The endpoint may gzip or deflate its replies. Bodies are decompressed
//! according to `Content-Encoding` before JSON decoding.

use crate::error::TransportError;
use crate::transport::types::BatchResponse;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use std::borrow::Cow;
use std::io::Read;

/// Decode a reply body given its `Content-Encoding` header value
pub fn decode_response(
    content_encoding: Option<&str>,
    body: &[u8],
) -> Result<BatchResponse, TransportError> {
    let json = decompress(content_encoding, body)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Undo the content coding of a body
pub fn decompress<'a>(
    content_encoding: Option<&str>,
    body: &'a [u8],
) -> Result<Cow<'a, [u8]>, TransportError> {
    let encoding = content_encoding
        .map(|e| e.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match encoding.as_str() {
        "" | "identity" => Ok(Cow::Borrowed(body)),
        "gzip" | "x-gzip" => read_all(GzDecoder::new(body)),
        // "deflate" is meant to be zlib-wrapped, but raw deflate streams are common
        "deflate" if has_zlib_header(body) => read_all(ZlibDecoder::new(body)),
        "deflate" => read_all(DeflateDecoder::new(body)),
        other => Err(TransportError::UnsupportedEncoding(other.to_string())),
    }
}

fn read_all<'a, R: Read>(mut reader: R) -> Result<Cow<'a, [u8]>, TransportError> {
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(TransportError::Decompress)?;
    Ok(Cow::Owned(out))
}

/// RFC 1950 header check: CM = 8 and the first two bytes are a multiple of 31
fn has_zlib_header(body: &[u8]) -> bool {
    match body {
        [cmf, flg, ..] => cmf & 0x0f == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}
