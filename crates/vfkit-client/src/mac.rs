//! Hardware (MAC) address type used by virtio-net devices.

use crate::error::VmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed link-layer hardware address.
///
/// Accepts IEEE 802 MAC-48, EUI-48, EUI-64 and 20-octet IP over InfiniBand
/// addresses in any of these forms:
///
/// ```text
/// 00:00:5e:00:53:01
/// 00-00-5e-00-53-01
/// 0000.5e00.5301
/// 02:00:5e:10:00:00:00:01
/// ```
///
/// Addresses are rendered as lowercase, colon-separated octets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(Vec<u8>);

impl MacAddress {
    /// Raw octets of the address.
    pub fn octets(&self) -> &[u8] {
        &self.0
    }
}

fn valid_octet_count(n: usize) -> bool {
    matches!(n, 6 | 8 | 20)
}

fn hex_pair(s: &[u8]) -> Option<u8> {
    let hi = (*s.first()? as char).to_digit(16)?;
    let lo = (*s.get(1)? as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Parse two hex digits at the start of `s`, requiring `sep` right after them
/// when more input follows.
fn octet_at(s: &[u8], sep: Option<u8>) -> Option<u8> {
    if s.len() > 2 && Some(s[2]) != sep {
        return None;
    }
    hex_pair(s)
}

fn parse_octets(s: &str) -> Option<Vec<u8>> {
    let b = s.as_bytes();
    if b.len() < 14 {
        return None;
    }

    if b[2] == b':' || b[2] == b'-' {
        if (b.len() + 1) % 3 != 0 {
            return None;
        }
        let n = (b.len() + 1) / 3;
        if !valid_octet_count(n) {
            return None;
        }
        (0..n).map(|i| octet_at(&b[i * 3..], Some(b[2]))).collect()
    } else if b[4] == b'.' {
        if (b.len() + 1) % 5 != 0 {
            return None;
        }
        let n = 2 * (b.len() + 1) / 5;
        if !valid_octet_count(n) {
            return None;
        }
        let mut octets = Vec::with_capacity(n);
        for group in 0..n / 2 {
            let x = group * 5;
            octets.push(octet_at(&b[x..x + 2], None)?);
            octets.push(octet_at(&b[x + 2..], Some(b[4]))?);
        }
        Some(octets)
    } else {
        None
    }
}

impl FromStr for MacAddress {
    type Err = VmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_octets(s)
            .map(MacAddress)
            .ok_or_else(|| VmError::InvalidHardwareAddress(s.to_string()))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = VmError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, octet) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{octet:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_colon_form() {
        let mac: MacAddress = "00:00:5E:00:53:01".parse().unwrap();
        assert_eq!(mac.octets(), &[0x00, 0x00, 0x5e, 0x00, 0x53, 0x01]);
        assert_eq!(mac.to_string(), "00:00:5e:00:53:01");
    }

    #[test]
    fn test_parse_dash_and_dot_forms() {
        let dash: MacAddress = "5a-94-ef-e4-0c-ee".parse().unwrap();
        let dot: MacAddress = "5a94.efe4.0cee".parse().unwrap();
        assert_eq!(dash, dot);
        assert_eq!(dot.to_string(), "5a:94:ef:e4:0c:ee");
    }

    #[test]
    fn test_parse_eui64() {
        let mac: MacAddress = "02:00:5e:10:00:00:00:01".parse().unwrap();
        assert_eq!(mac.octets().len(), 8);
    }

    #[test]
    fn test_parse_invalid() {
        for input in [
            "",
            "00:00:5e:00:53",
            "00:00:5e:00:53:0g",
            "00:00-5e:00:53:01",
            "00:00:5e:00:53:01:",
            "0000.5e00.530",
            "not a mac address",
        ] {
            let err = input.parse::<MacAddress>().unwrap_err();
            assert_eq!(err, VmError::InvalidHardwareAddress(input.to_string()));
        }
    }

    #[test]
    fn test_serde_as_string() {
        let mac: MacAddress = "5a:94:ef:e4:0c:ee".parse().unwrap();
        let json = serde_json::to_string(&mac).unwrap();
        assert_eq!(json, "\"5a:94:ef:e4:0c:ee\"");

        let back: MacAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mac);
        assert!(serde_json::from_str::<MacAddress>("\"bogus\"").is_err());
    }
}
