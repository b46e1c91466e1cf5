// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Mac address type and logic.

use arrayvec::ArrayVec;
use core::fmt::{Display, Formatter};
use core::str::FromStr;

#[allow(unused_imports)] // re-export
#[cfg(any(test, feature = "bolero"))]
pub use contract::*;

/// A [MAC Address] type.
///
/// `Mac` is a transparent wrapper around `[u8; 6]`.
/// Actions carry it verbatim: the octets are already in wire order.
///
/// [MAC Address]: https://en.wikipedia.org/wiki/MAC_address
#[repr(transparent)]
#[cfg_attr(any(test, feature = "bolero"), derive(bolero::TypeGenerator))]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Mac(pub [u8; 6]);

impl Mac {
    /// Number of octets in a [`Mac`].
    pub const LEN: usize = 6;
    /// The broadcast `Mac`
    pub const BROADCAST: Mac = Mac([u8::MAX; 6]);
    /// The zero `Mac`.
    pub const ZERO: Mac = Mac([0; 6]);

    /// Returns true iff the binary representation of the [`Mac`] is exclusively ones.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self == &Mac::BROADCAST
    }

    /// Returns true iff the least significant bit of the first octet is one.
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }

    /// Returns true iff the binary representation of the [`Mac`] is exclusively zeros.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self == &Mac::ZERO
    }

    /// The octets of this [`Mac`], in transmission order.
    #[must_use]
    pub const fn octets(&self) -> &[u8; 6] {
        &self.0
    }
}

impl From<[u8; 6]> for Mac {
    fn from(value: [u8; 6]) -> Self {
        Mac(value)
    }
}

impl From<Mac> for [u8; 6] {
    fn from(value: Mac) -> Self {
        value.0
    }
}

impl AsRef<[u8]> for Mac {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Errors which can occur while converting a string to a [`Mac`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacFromStringError {
    /// Invalid string representation of mac address
    #[error("invalid string representation of mac address: {0}")]
    Invalid(String),
}

impl TryFrom<&str> for Mac {
    type Error = MacFromStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = || MacFromStringError::Invalid(value.to_string());
        let octets = value
            .split(':')
            .try_fold(ArrayVec::<u8, { Mac::LEN }>::new(), |mut acc, octet| {
                if octet.len() != 2 || !octet.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                let parsed = u8::from_str_radix(octet, 16).map_err(|_| invalid())?;
                acc.try_push(parsed).map_err(|_| invalid())?;
                Ok(acc)
            })?;
        octets.into_inner().map(Mac).map_err(|_| invalid())
    }
}

impl FromStr for Mac {
    type Err = MacFromStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mac::try_from(s)
    }
}

impl Display for Mac {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use bolero::{Driver, ValueGenerator};

    /// Generate well formed MAC address strings (`XX:XX:XX:XX:XX:XX`, mixed case).
    pub struct MacStringGenerator;

    impl ValueGenerator for MacStringGenerator {
        type Output = String;

        fn generate<D: Driver>(&self, u: &mut D) -> Option<String> {
            const HEX: &[u8] = b"0123456789abcdefABCDEF";
            let mut out = String::with_capacity(17);
            for i in 0..12 {
                if i > 0 && i % 2 == 0 {
                    out.push(':');
                }
                let pick = u.produce::<u8>()? as usize % HEX.len();
                out.push(char::from(HEX[pick]));
            }
            Some(out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Mac, MacStringGenerator};

    #[test]
    fn parse_back_valid_strings() {
        bolero::check!()
            .with_generator(MacStringGenerator)
            .for_each(|input: &String| {
                let mac = Mac::try_from(input.as_str()).unwrap();
                assert_eq!(mac.to_string(), input.to_lowercase());
            });
    }

    #[test]
    fn display_then_parse() {
        bolero::check!().with_type().for_each(|mac: &Mac| {
            let parsed: Mac = mac.to_string().parse().unwrap();
            assert_eq!(&parsed, mac);
        });
    }

    #[test]
    fn wrong_octet_count_is_rejected() {
        assert!(Mac::try_from("00:00:00:00:00").is_err());
        assert!(Mac::try_from("00:00:00:00:00:00:00").is_err());
    }

    #[test]
    fn malformed_octet_is_rejected() {
        assert!(Mac::try_from("00:00:00:00:00:000").is_err());
        assert!(Mac::try_from("00:00:00:00:+0:00").is_err());
        assert!(Mac::try_from("").is_err());
    }

    #[test]
    fn classification() {
        assert!(Mac::BROADCAST.is_broadcast());
        assert!(Mac::BROADCAST.is_multicast());
        assert!(Mac::ZERO.is_zero());
        assert!(!Mac([0x02, 0, 0, 0, 0, 1]).is_multicast());
    }
}
