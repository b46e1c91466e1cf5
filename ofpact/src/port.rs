// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Switch port numbers.

use core::fmt::{Display, Formatter};

/// An OpenFlow 1.3 port number.
///
/// Values from [`PortNo::MAX`] upwards are reserved and name logical ports rather than
/// physical ones.
#[repr(transparent)]
#[cfg_attr(any(test, feature = "bolero"), derive(bolero::TypeGenerator))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortNo(pub u32);

impl PortNo {
    /// Highest number usable by a physical port.
    pub const MAX: PortNo = PortNo(0xffff_ff00);
    /// The port the packet arrived on.
    pub const IN_PORT: PortNo = PortNo(0xffff_fff8);
    /// Submit the packet to the first flow table.
    pub const TABLE: PortNo = PortNo(0xffff_fff9);
    /// Traditional non-OpenFlow forwarding.
    pub const NORMAL: PortNo = PortNo(0xffff_fffa);
    /// All ports except the input port and blocked ones.
    pub const FLOOD: PortNo = PortNo(0xffff_fffb);
    /// All ports except the input port.
    pub const ALL: PortNo = PortNo(0xffff_fffc);
    /// Send to the controller.
    pub const CONTROLLER: PortNo = PortNo(0xffff_fffd);
    /// The switch's local networking stack.
    pub const LOCAL: PortNo = PortNo(0xffff_fffe);
    /// Wildcard / no port.
    pub const ANY: PortNo = PortNo(0xffff_ffff);

    /// The raw port number.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// True iff this is one of the reserved logical ports.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        self.0 > PortNo::MAX.0
    }

    fn reserved_name(self) -> Option<&'static str> {
        Some(match self {
            PortNo::IN_PORT => "IN_PORT",
            PortNo::TABLE => "TABLE",
            PortNo::NORMAL => "NORMAL",
            PortNo::FLOOD => "FLOOD",
            PortNo::ALL => "ALL",
            PortNo::CONTROLLER => "CONTROLLER",
            PortNo::LOCAL => "LOCAL",
            PortNo::ANY => "ANY",
            _ => return None,
        })
    }
}

impl From<u32> for PortNo {
    fn from(port: u32) -> PortNo {
        PortNo(port)
    }
}

impl From<PortNo> for u32 {
    fn from(port: PortNo) -> u32 {
        port.0
    }
}

impl Display for PortNo {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.reserved_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::PortNo;

    #[test]
    fn reserved_ports_have_names() {
        assert_eq!(PortNo::CONTROLLER.to_string(), "CONTROLLER");
        assert_eq!(PortNo::IN_PORT.to_string(), "IN_PORT");
        assert_eq!(PortNo(5).to_string(), "5");
        assert!(PortNo::LOCAL.is_reserved());
        assert!(!PortNo::MAX.is_reserved());
    }
}
