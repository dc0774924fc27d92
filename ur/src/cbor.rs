//! CBOR byte-string framing.
//!
//! The firmware's wire format is a single CBOR major-type-2 definite-length
//! byte string wrapping the UTF-8 JSON payload — not a CBOR map. Encoding
//! uses the 0x58 (one length byte) form for payloads up to 255 bytes and
//! the 0x59 (two-byte big-endian length) form above that; decoding also
//! accepts the short form (0x40..=0x57) for completeness.

use crate::error::{DecodeError, EncodeError};

const MAJOR_BYTES_SHORT: u8 = 0x40;
const HDR_LEN1: u8 = 0x58;
const HDR_LEN2: u8 = 0x59;

/// Wrap raw bytes in a definite-length CBOR byte string.
pub fn wrap_bytes(payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(payload.len() + 3);
    match payload.len() {
        len if len <= 0xff => {
            out.push(HDR_LEN1);
            out.push(len as u8);
        }
        len if len <= 0xffff => {
            out.push(HDR_LEN2);
            out.extend_from_slice(&(len as u16).to_be_bytes());
        }
        len => return Err(EncodeError::PayloadTooLarge(len)),
    }
    out.extend_from_slice(payload);
    Ok(out)
}

/// Unwrap a definite-length CBOR byte string, returning the embedded
/// payload. A declared length past the end of the input is an error;
/// trailing bytes after the declared length are ignored.
pub fn unwrap_bytes(data: &[u8]) -> Result<&[u8], DecodeError> {
    let (&header, rest) = data.split_first().ok_or(DecodeError::CborOverrun)?;
    let (len, body) = match header {
        h if (MAJOR_BYTES_SHORT..HDR_LEN1).contains(&h) => {
            ((h - MAJOR_BYTES_SHORT) as usize, rest)
        }
        HDR_LEN1 => {
            let (&len, body) = rest.split_first().ok_or(DecodeError::CborOverrun)?;
            (len as usize, body)
        }
        HDR_LEN2 => {
            if rest.len() < 2 {
                return Err(DecodeError::CborOverrun);
            }
            let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
            (len, &rest[2..])
        }
        other => return Err(DecodeError::CborHeader(other)),
    };
    body.get(..len).ok_or(DecodeError::CborOverrun)
}
