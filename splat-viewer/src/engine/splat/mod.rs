//! Gaussian-splat asset decoding.
//!
//! Viewers treat a decoded [`SplatCloud`] as opaque: they hand raw bytes to
//! [`decode`] and attach the resulting mesh. Two container formats are understood:
//!
//! - **PLY** (`.ply`): ASCII or binary little-endian, with the splat attributes
//!   stored as properties of the leading `vertex` element.
//! - **Packed** (`.splat`): headerless 32-byte records.
//!
//! The format is picked from the file extension first and from the `ply` magic
//! second, so blob URLs and extension-less paths still decode.

/// Decoded splat positions and colours plus mesh conversion.
pub mod cloud;

/// Packed 32-byte `.splat` record decoding.
pub mod packed;

/// PLY vertex decoding on top of `ply-rs`.
pub mod ply;

pub use cloud::SplatCloud;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unrecognised splat format for '{0}' (expected .ply or .splat)")]
    UnknownFormat(String),
    #[error("malformed PLY: {0}")]
    Parse(String),
    #[error("invalid PLY header: {0}")]
    InvalidHeader(String),
    #[error("unsupported PLY layout: {0}")]
    Unsupported(String),
    #[error("PLY vertex element has no '{0}' property")]
    MissingProperty(&'static str),
    #[error("asset is truncated: expected {expected} {unit} of splat data, found {actual}")]
    Truncated {
        expected: usize,
        actual: usize,
        unit: &'static str,
    },
    #[error("{len} bytes is not a whole number of {record_size}-byte splat records")]
    TrailingBytes { len: usize, record_size: usize },
    #[error("asset contains no splats")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplatFormat {
    Ply,
    Packed,
}

impl SplatFormat {
    pub fn detect(name: &str, bytes: &[u8]) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or_default();
        if path.ends_with(".ply") {
            return Some(Self::Ply);
        }
        if path.ends_with(".splat") {
            return Some(Self::Packed);
        }
        if bytes.starts_with(b"ply\n") || bytes.starts_with(b"ply\r\n") {
            return Some(Self::Ply);
        }
        None
    }
}

/// Decode an asset named `name` (file name or URL) from its raw bytes.
pub fn decode(name: &str, bytes: &[u8]) -> Result<SplatCloud, DecodeError> {
    let format =
        SplatFormat::detect(name, bytes).ok_or_else(|| DecodeError::UnknownFormat(name.into()))?;

    let cloud = match format {
        SplatFormat::Ply => ply::decode_ply(bytes)?,
        SplatFormat::Packed => packed::decode_packed(bytes)?,
    };

    if cloud.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(cloud)
}
