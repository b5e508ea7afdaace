//! Hardware addresses, the byte-prefix gate and candidate derivation
//!
//! A qualifying client carries its IPv4 address in the last four bytes of a
//! six-byte hardware address. The first two bytes are the marker checked by
//! the gate, for example a locally administered `02:00` prefix:
//!
//! ```text
//!   02 : 00 : 0a : 14 : 1e : 28
//!   └─gate─┘  └──── 10.20.30.40 ───┘
//! ```

use crate::error::{OneleaseError, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Offset of the first address octet inside the hardware address
pub const DERIVATION_OFFSET: usize = 2;

/// Longest hardware address a DHCPv4 packet can carry in `chaddr`
pub const MAX_HWADDR_LEN: usize = 16;

/// Client hardware address as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HwAddr(Vec<u8>);

impl HwAddr {
    /// Wrap raw hardware address bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for HwAddr {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for HwAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for HwAddr {
    type Err = OneleaseError;

    /// Parse `xx:xx:xx:xx:xx:xx` or `xx-xx-xx-xx-xx-xx`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || OneleaseError::InvalidHardwareAddress(s.to_string());

        let bytes = s
            .trim()
            .split([':', '-'])
            .map(parse_octet)
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(invalid)?;

        if bytes.is_empty() || bytes.len() > MAX_HWADDR_LEN {
            return Err(invalid());
        }
        Ok(Self(bytes))
    }
}

/// Configured hardware-address prefix, either empty or exactly two bytes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BytePrefix(Vec<u8>);

impl BytePrefix {
    /// Length every non-empty prefix must have
    pub const LEN: usize = 2;

    /// Build a prefix from raw bytes, enforcing the zero-or-two rule
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if !(bytes.is_empty() || bytes.len() == Self::LEN) {
            return Err(OneleaseError::InvalidBytePrefix {
                prefix: HwAddr(bytes.clone()).to_string(),
                len: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Prefix that accepts every hardware address
    pub fn any() -> Self {
        Self(Vec::new())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `hwaddr` starts with this prefix
    ///
    /// The empty prefix matches everything. An address shorter than the
    /// prefix never matches.
    pub fn matches(&self, hwaddr: &HwAddr) -> bool {
        hwaddr.as_bytes().starts_with(&self.0)
    }
}

impl FromStr for BytePrefix {
    type Err = OneleaseError;

    /// Decode a formatted hex string.
    ///
    /// Accepts colon-separated octets (`02:00`), space-separated octets
    /// (`02 00`) or contiguous digits with an optional `0x` (`0x0200`).
    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_formatted_hex(s)?;
        if !(bytes.is_empty() || bytes.len() == Self::LEN) {
            return Err(OneleaseError::InvalidBytePrefix {
                prefix: s.to_string(),
                len: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for BytePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("*");
        }
        fmt::Display::fmt(&HwAddr(self.0.clone()), f)
    }
}

/// Derive the candidate address for `hwaddr`
///
/// Returns `None` when the gate did not pass or when the address does not
/// have exactly four bytes after [`DERIVATION_OFFSET`].
pub fn derive_candidate(hwaddr: &HwAddr, gate: bool) -> Option<Ipv4Addr> {
    if !gate {
        return None;
    }

    let octets: [u8; 4] = hwaddr.as_bytes().get(DERIVATION_OFFSET..)?.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

fn parse_octet(token: &str) -> Option<u8> {
    if token.is_empty() || token.len() > 2 {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

fn decode_formatted_hex(s: &str) -> Result<Vec<u8>> {
    let invalid = || OneleaseError::InvalidHex(s.to_string());
    let text = s.trim();

    if text.is_empty() {
        return Ok(Vec::new());
    }

    if text.contains(':') {
        return text.split(':').map(parse_octet).collect::<Option<_>>().ok_or_else(invalid);
    }

    if text.contains(char::is_whitespace) {
        return text
            .split_whitespace()
            .map(parse_octet)
            .collect::<Option<_>>()
            .ok_or_else(invalid);
    }

    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    // Odd-length input gets an implicit leading zero
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };

    (0..padded.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&padded[i..i + 2], 16).ok())
        .collect::<Option<_>>()
        .ok_or_else(invalid)
}
