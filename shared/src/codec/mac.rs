use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::codec::error::CodecError;

/// A 6-byte hardware address.
///
/// The canonical text form is uppercase, colon-separated hex pairs
/// (`B8:27:EB:E0:DC:E8`), which is also what serde reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Build from a wire payload; anything other than exactly 6 bytes is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; 6]>::try_from(bytes).ok().map(Self)
    }
}

impl FromStr for MacAddress {
    type Err = CodecError;

    /// Accepts `aa:bb:cc:dd:ee:ff`, `AA-BB-CC-DD-EE-FF` or `aabbccddeeff`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(|c| *c != ':' && *c != '-').collect();
        let bytes = hex::decode(&digits)
            .map_err(|_| CodecError::InvalidMacAddress(s.to_string()))?;
        Self::from_bytes(&bytes).ok_or_else(|| CodecError::InvalidMacAddress(s.to_string()))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}
