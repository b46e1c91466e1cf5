// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Field registry.
//!
//! Every field an action can load, move or output from is described by a [`FieldDescriptor`]:
//! its width and its offset in the canonical flow key. The table is a `static` laid out by id,
//! so lookups are a bounds-checked index and the registry never changes after start up.

use core::fmt::{Display, Formatter};
use strum::EnumCount;

/// Length, in octets, of the canonical flow key all field offsets point into.
pub const FLOW_KEY_LEN: u16 = 188;

/// Description of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    id: FieldId,
    name: &'static str,
    n_bits: u16,
    n_bytes: u8,
    offset: u16,
}

impl FieldDescriptor {
    /// The id this descriptor describes.
    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// NXM / OXM name of the field, as `ovs-ofctl` spells it.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Number of meaningful bits.
    #[must_use]
    pub const fn n_bits(&self) -> u16 {
        self.n_bits
    }

    /// Number of octets the field occupies on the wire and in the flow key.
    #[must_use]
    pub const fn n_bytes(&self) -> u8 {
        self.n_bytes
    }

    /// Offset of the field in the canonical flow key.
    #[must_use]
    pub const fn offset(&self) -> u16 {
        self.offset
    }
}

macro_rules! fields {
    ($($variant:ident => ($name:literal, $bits:expr, $bytes:expr, $ofs:expr)),* $(,)?) => {
        /// Identifier of a packet or pipeline field.
        #[repr(u16)]
        #[cfg_attr(any(test, feature = "bolero"), derive(bolero::TypeGenerator))]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            strum::EnumCount,
            strum::EnumIter,
            strum::FromRepr,
        )]
        pub enum FieldId {
            $(
                #[doc = $name]
                $variant,
            )*
        }

        static FIELDS: [FieldDescriptor; FieldId::COUNT] = [
            $(
                FieldDescriptor {
                    id: FieldId::$variant,
                    name: $name,
                    n_bits: $bits,
                    n_bytes: $bytes,
                    offset: $ofs,
                },
            )*
        ];
    };
}

const REGS: u16 = 24;

// Fields sharing an offset alias the same flow key bytes (e.g. IPv4 and ARP addresses,
// TCP and UDP ports, extended registers over register pairs).
fields! {
    TunId => ("NXM_NX_TUN_ID", 64, 8, 0),
    TunSrc => ("NXM_NX_TUN_IPV4_SRC", 32, 4, 8),
    TunDst => ("NXM_NX_TUN_IPV4_DST", 32, 4, 12),
    Metadata => ("OXM_OF_METADATA", 64, 8, 16),
    Reg0 => ("NXM_NX_REG0", 32, 4, REGS),
    Reg1 => ("NXM_NX_REG1", 32, 4, REGS + 4),
    Reg2 => ("NXM_NX_REG2", 32, 4, REGS + 8),
    Reg3 => ("NXM_NX_REG3", 32, 4, REGS + 12),
    Reg4 => ("NXM_NX_REG4", 32, 4, REGS + 16),
    Reg5 => ("NXM_NX_REG5", 32, 4, REGS + 20),
    Reg6 => ("NXM_NX_REG6", 32, 4, REGS + 24),
    Reg7 => ("NXM_NX_REG7", 32, 4, REGS + 28),
    Reg8 => ("NXM_NX_REG8", 32, 4, REGS + 32),
    Reg9 => ("NXM_NX_REG9", 32, 4, REGS + 36),
    Reg10 => ("NXM_NX_REG10", 32, 4, REGS + 40),
    Reg11 => ("NXM_NX_REG11", 32, 4, REGS + 44),
    Reg12 => ("NXM_NX_REG12", 32, 4, REGS + 48),
    Reg13 => ("NXM_NX_REG13", 32, 4, REGS + 52),
    Reg14 => ("NXM_NX_REG14", 32, 4, REGS + 56),
    Reg15 => ("NXM_NX_REG15", 32, 4, REGS + 60),
    XReg0 => ("OXM_OF_PKT_REG0", 64, 8, REGS),
    XReg1 => ("OXM_OF_PKT_REG1", 64, 8, REGS + 8),
    XReg2 => ("OXM_OF_PKT_REG2", 64, 8, REGS + 16),
    XReg3 => ("OXM_OF_PKT_REG3", 64, 8, REGS + 24),
    XReg4 => ("OXM_OF_PKT_REG4", 64, 8, REGS + 32),
    XReg5 => ("OXM_OF_PKT_REG5", 64, 8, REGS + 40),
    XReg6 => ("OXM_OF_PKT_REG6", 64, 8, REGS + 48),
    XReg7 => ("OXM_OF_PKT_REG7", 64, 8, REGS + 56),
    PktMark => ("NXM_NX_PKT_MARK", 32, 4, 88),
    CtState => ("NXM_NX_CT_STATE", 32, 4, 92),
    CtMark => ("NXM_NX_CT_MARK", 32, 4, 96),
    CtZone => ("NXM_NX_CT_ZONE", 16, 2, 100),
    VlanTci => ("NXM_OF_VLAN_TCI", 16, 2, 102),
    VlanVid => ("OXM_OF_VLAN_VID", 12, 2, 102),
    InPort => ("OXM_OF_IN_PORT", 32, 4, 104),
    EthType => ("NXM_OF_ETH_TYPE", 16, 2, 108),
    EthSrc => ("NXM_OF_ETH_SRC", 48, 6, 110),
    EthDst => ("NXM_OF_ETH_DST", 48, 6, 116),
    IpProto => ("NXM_OF_IP_PROTO", 8, 1, 122),
    IpDscp => ("OXM_OF_IP_DSCP", 6, 1, 123),
    IpEcn => ("OXM_OF_IP_ECN", 2, 1, 124),
    IpTtl => ("NXM_NX_IP_TTL", 8, 1, 125),
    TcpSrc => ("NXM_OF_TCP_SRC", 16, 2, 126),
    UdpSrc => ("NXM_OF_UDP_SRC", 16, 2, 126),
    Icmpv4Type => ("NXM_OF_ICMP_TYPE", 8, 1, 127),
    TcpDst => ("NXM_OF_TCP_DST", 16, 2, 128),
    UdpDst => ("NXM_OF_UDP_DST", 16, 2, 128),
    Icmpv4Code => ("NXM_OF_ICMP_CODE", 8, 1, 129),
    ArpOp => ("NXM_OF_ARP_OP", 16, 2, 130),
    Ipv4Src => ("NXM_OF_IP_SRC", 32, 4, 132),
    ArpSpa => ("NXM_OF_ARP_SPA", 32, 4, 132),
    Ipv4Dst => ("NXM_OF_IP_DST", 32, 4, 136),
    ArpTpa => ("NXM_OF_ARP_TPA", 32, 4, 136),
    ArpSha => ("NXM_NX_ARP_SHA", 48, 6, 140),
    ArpTha => ("NXM_NX_ARP_THA", 48, 6, 146),
    Ipv6Src => ("NXM_NX_IPV6_SRC", 128, 16, 152),
    Ipv6Dst => ("NXM_NX_IPV6_DST", 128, 16, 168),
    Ipv6Label => ("NXM_NX_IPV6_LABEL", 20, 4, 184),
}

impl FieldId {
    /// The registry entry for this field.
    #[must_use]
    pub fn descriptor(self) -> &'static FieldDescriptor {
        &FIELDS[self as usize]
    }

    /// Number of meaningful bits of this field.
    #[must_use]
    pub fn n_bits(self) -> u16 {
        self.descriptor().n_bits
    }

    /// Number of octets of this field.
    #[must_use]
    pub fn n_bytes(self) -> u8 {
        self.descriptor().n_bytes
    }

    /// The raw id used on the wire.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Look up a field by its raw wire id.
///
/// # Panics
///
/// An id outside the registry is a programming error, not a runtime condition: this panics
/// rather than hand back a placeholder.
#[must_use]
#[allow(clippy::panic)] // fail fast on corrupt ids
pub fn lookup(raw: u16) -> &'static FieldDescriptor {
    match FieldId::from_repr(raw) {
        Some(id) => id.descriptor(),
        None => panic!("unknown field id {raw} (registry holds {} fields)", FieldId::COUNT),
    }
}

/// Error returned when a raw value names no registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown field id {0}")]
pub struct UnknownField(pub u16);

impl TryFrom<u16> for FieldId {
    type Error = UnknownField;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        FieldId::from_repr(raw).ok_or(UnknownField(raw))
    }
}

impl From<FieldId> for u16 {
    fn from(id: FieldId) -> u16 {
        id.as_u16()
    }
}

impl Display for FieldId {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.descriptor().name)
    }
}

#[cfg(test)]
mod test {
    use super::{FIELDS, FLOW_KEY_LEN, FieldId, UnknownField, lookup};
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn table_is_indexed_by_id() {
        assert_eq!(FIELDS.len(), FieldId::COUNT);
        for (i, desc) in FIELDS.iter().enumerate() {
            assert_eq!(desc.id() as usize, i, "{} is out of place", desc.name());
        }
    }

    #[test]
    fn every_field_fits_the_flow_key() {
        for id in FieldId::iter() {
            let desc = id.descriptor();
            assert!(desc.n_bits() > 0);
            assert!(desc.n_bits() <= u16::from(desc.n_bytes()) * 8, "{id}");
            assert!(desc.offset() + u16::from(desc.n_bytes()) <= FLOW_KEY_LEN, "{id}");
        }
    }

    #[test]
    fn extended_registers_overlay_register_pairs() {
        let regs: Vec<_> = FieldId::iter()
            .filter(|id| id.descriptor().name().starts_with("NXM_NX_REG"))
            .collect();
        let xregs: Vec<_> = FieldId::iter()
            .filter(|id| id.descriptor().name().starts_with("OXM_OF_PKT_REG"))
            .collect();
        assert_eq!(regs.len(), 16);
        assert_eq!(xregs.len(), 8);
        for (i, xreg) in xregs.iter().enumerate() {
            assert_eq!(xreg.descriptor().offset(), regs[2 * i].descriptor().offset());
            assert_eq!(xreg.n_bits(), regs[2 * i].n_bits() + regs[2 * i + 1].n_bits());
        }
    }

    #[test]
    fn lookup_known_ids() {
        bolero::check!().with_type().cloned().for_each(|id: FieldId| {
            assert_eq!(lookup(id.as_u16()).id(), id);
            assert_eq!(FieldId::try_from(id.as_u16()), Ok(id));
        });
    }

    #[test]
    fn try_from_unknown_id_is_an_error() {
        #[allow(clippy::cast_possible_truncation)]
        let raw = FieldId::COUNT as u16;
        assert_eq!(FieldId::try_from(raw), Err(UnknownField(raw)));
        assert_eq!(FieldId::try_from(u16::MAX), Err(UnknownField(u16::MAX)));
    }

    #[test]
    #[should_panic(expected = "unknown field id")]
    fn lookup_unknown_id_panics() {
        #[allow(clippy::cast_possible_truncation)]
        let _ = lookup(FieldId::COUNT as u16);
    }

    #[test]
    fn display_uses_nxm_names() {
        assert_eq!(FieldId::Reg3.to_string(), "NXM_NX_REG3");
        assert_eq!(FieldId::EthDst.to_string(), "NXM_OF_ETH_DST");
    }
}
