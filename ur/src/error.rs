use thiserror::Error;

/// Internal encode failure. Should not occur for a validated transaction;
/// treated as a fatal bug if it does.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("transaction field map could not be serialized: {0}")]
    FieldMap(#[from] serde_json::Error),

    #[error("payload of {0} bytes exceeds the two-byte length form")]
    PayloadTooLarge(usize),
}

/// A malformed or incomplete scanned payload. Recoverable: the user is told
/// "invalid signed-transaction format" and may rescan; never auto-retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a UR payload (missing 'ur:' scheme)")]
    BadScheme,

    #[error("UR payload has no body")]
    EmptyPayload,

    #[error("malformed multi-part segment: {0}")]
    BadPartSegment(String),

    #[error("fragment index {index} outside 1..={total}")]
    BadPartIndex { index: u32, total: u32 },

    #[error("fragment totals disagree: accumulator has {expected}, fragment says {got}")]
    PartTotalMismatch { expected: u32, got: u32 },

    #[error("fragment type '{got}' does not match accumulated type '{expected}'")]
    PartTypeMismatch { expected: String, got: String },

    #[error("rateless (XOR-mixed) fountain parts are not supported")]
    MixedPartUnsupported,

    #[error("multi-part payload incomplete: {received} of {total} fragments")]
    Incomplete { received: u32, total: u32 },

    #[error("payload is not valid hex")]
    BadHex,

    #[error("payload contains characters outside the Bytewords alphabet")]
    BadByteword,

    #[error("Bytewords checksum mismatch")]
    ChecksumMismatch,

    #[error("CBOR header {0:#04x} is not a definite-length byte string")]
    CborHeader(u8),

    #[error("CBOR length field overruns the payload")]
    CborOverrun,

    #[error("decoded payload is neither a signature object nor a signed blob")]
    UnrecognizedPayload,
}
