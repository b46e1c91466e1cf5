// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Action records.
//!
//! An action list is a sequence of records. Every record starts with a four octet header
//!
//! ```text
//!  0        1        2                 4
//! +--------+--------+--------+--------+----------------------+---------+
//! |  type  |  raw   |   len (be16)    | payload              | padding |
//! +--------+--------+--------+--------+----------------------+---------+
//! ```
//!
//! `len` covers header, payload and zero padding, and is always a multiple of [`ALIGN`].
//! `raw` names the OpenFlow opcode a record originates from when several opcodes share one
//! record type; it is [`RAW_NONE`] otherwise.
//!
//! [`Action::parse`] and [`ActionIter`] only accept what [`Action::encode`] produces. They exist
//! to inspect lists built by this crate, not to decode lists received from a switch.

use crate::buf::{ALIGN, ActionBuf, align_up};
use crate::field::{FieldId, UnknownField};
use crate::port::PortNo;
use crate::wire::WireScalar;
use arrayvec::ArrayVec;
use core::net::Ipv4Addr;
use static_assertions::{const_assert, const_assert_eq};

/// Length of the header every record starts with.
pub const RECORD_HEADER_LEN: usize = 4;

/// `raw` value of records without a specific originating opcode.
pub const RAW_NONE: u8 = 0xff;

/// `raw` value marking a [`ActionType::StripVlan`] record as an OpenFlow 1.1+ `pop_vlan`
/// (as opposed to an OpenFlow 1.0 `strip_vlan`).
pub const RAW_POP_VLAN: u8 = 8;

/// `max_len` meaning "do not truncate, do not buffer".
pub const MAX_LEN_UNLIMITED: u16 = 0xffff;

/// Ethertype of the tag inserted by [`Action::PushVlan`] (802.1Q).
pub const ETH_TYPE_VLAN: u16 = 0x8100;

/// Longest value a single set-field record can carry (IPv6 addresses).
pub const MAX_FIELD_BYTES: usize = 16;

/// Most controller ids a single dec-ttl record can carry.
pub const MAX_CONTROLLER_IDS: usize = 32;

const OUTPUT_LEN: usize = 16;
const GROUP_LEN: usize = 8;
const OUTPUT_REG_LEN: usize = 16;
const SET_VLAN_VID_LEN: usize = 8;
const STRIP_VLAN_LEN: usize = 8;
const PUSH_VLAN_LEN: usize = 8;
const SET_IPV4_LEN: usize = 8;
const REG_MOVE_LEN: usize = 16;
const RESUBMIT_LEN: usize = 16;
const WRITE_METADATA_LEN: usize = 24;
const GOTO_TABLE_LEN: usize = 8;
const SET_FIELD_FIXED_LEN: usize = RECORD_HEADER_LEN + 4;
const DEC_TTL_FIXED_LEN: usize = RECORD_HEADER_LEN + 4;

const_assert_eq!(OUTPUT_LEN, align_up(RECORD_HEADER_LEN + 4 + 2 + 2));
const_assert_eq!(GROUP_LEN, align_up(RECORD_HEADER_LEN + 4));
const_assert_eq!(OUTPUT_REG_LEN, align_up(RECORD_HEADER_LEN + 4 * 2));
const_assert_eq!(REG_MOVE_LEN, align_up(RECORD_HEADER_LEN + 5 * 2));
const_assert_eq!(RESUBMIT_LEN, align_up(RECORD_HEADER_LEN + 4 + 1 + 3));
const_assert_eq!(WRITE_METADATA_LEN, align_up(RECORD_HEADER_LEN + 4 + 2 * 8));
const_assert_eq!(GOTO_TABLE_LEN, align_up(RECORD_HEADER_LEN + 1 + 3));
const_assert!(DEC_TTL_FIXED_LEN + 2 * MAX_CONTROLLER_IDS <= u16::MAX as usize);

/// Record type codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::FromRepr, strum::EnumIter)]
pub enum ActionType {
    /// Output to a port.
    Output = 0,
    /// Apply a group.
    Group = 1,
    /// Output to the port held in a field.
    OutputReg = 2,
    /// Masked write to a field.
    SetField = 3,
    /// Rewrite the VLAN id.
    SetVlanVid = 4,
    /// Remove the outermost VLAN tag.
    StripVlan = 5,
    /// Insert a VLAN tag.
    PushVlan = 6,
    /// Rewrite the IPv4 source address.
    SetIpv4Src = 7,
    /// Rewrite the IPv4 destination address.
    SetIpv4Dst = 8,
    /// Copy bits between fields.
    RegMove = 9,
    /// Decrement the IP TTL.
    DecTtl = 10,
    /// Re-run the lookup in another table.
    Resubmit = 11,
    /// Write the metadata field.
    WriteMetadata = 12,
    /// Continue processing in another table.
    GotoTable = 13,
}

bitflags::bitflags! {
    /// Flags carried by set-field and set-vlan-vid records.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SetFieldFlags: u8 {
        /// The flow carries a VLAN tag at the time the action runs, which moves the
        /// in-packet location of the ethernet addresses.
        const FLOW_HAS_VLAN = 0x01;
    }
}

/// A masked write of a value to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetField {
    field: FieldId,
    value: ArrayVec<u8, MAX_FIELD_BYTES>,
    mask: ArrayVec<u8, MAX_FIELD_BYTES>,
    flags: SetFieldFlags,
}

impl SetField {
    /// Write all of `field`; `value` is in wire order.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not exactly as wide as the field.
    #[must_use]
    pub fn exact(field: FieldId, value: &[u8]) -> SetField {
        let n_bytes = usize::from(field.n_bytes());
        assert_eq!(
            value.len(),
            n_bytes,
            "{field} is {n_bytes} bytes wide, got a {} byte value",
            value.len()
        );
        let mut mask = ArrayVec::new();
        mask.extend(core::iter::repeat_n(u8::MAX, n_bytes));
        SetField {
            field,
            value: value.iter().copied().collect(),
            mask,
            flags: SetFieldFlags::empty(),
        }
    }

    /// Record whether the flow carries a VLAN tag when this action runs.
    #[must_use]
    pub fn with_vlan(mut self, flow_has_vlan: bool) -> SetField {
        self.flags.set(SetFieldFlags::FLOW_HAS_VLAN, flow_has_vlan);
        self
    }

    /// The written field.
    #[must_use]
    pub fn field(&self) -> FieldId {
        self.field
    }

    /// The value, in wire order.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The mask, in wire order; as wide as the value.
    #[must_use]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// True iff the whole field is written.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.mask.iter().all(|b| *b == u8::MAX)
    }

    /// Whether the flow carries a VLAN tag when this action runs.
    #[must_use]
    pub fn flow_has_vlan(&self) -> bool {
        self.flags.contains(SetFieldFlags::FLOW_HAS_VLAN)
    }

    /// The value as an integer, if it is 1, 2, 4 or 8 octets wide.
    #[must_use]
    pub fn value_as<T: WireScalar>(&self) -> Option<T> {
        (self.value.len() == T::SIZE).then(|| T::read_wire(&self.value))
    }
}

/// A copy of the low `n_bits` of one field into the low `n_bits` of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegMove {
    src: FieldId,
    dst: FieldId,
    n_bits: u16,
}

impl RegMove {
    /// Move as many bits as both fields can hold.
    #[must_use]
    pub fn whole(src: FieldId, dst: FieldId) -> RegMove {
        RegMove {
            src,
            dst,
            n_bits: src.n_bits().min(dst.n_bits()),
        }
    }

    /// The field bits are read from.
    #[must_use]
    pub fn src(&self) -> FieldId {
        self.src
    }

    /// The field bits are written to.
    #[must_use]
    pub fn dst(&self) -> FieldId {
        self.dst
    }

    /// Number of bits copied, starting at bit 0 of both fields.
    #[must_use]
    pub fn n_bits(&self) -> u16 {
        self.n_bits
    }
}

/// One action record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send the packet to `port`; `max_len` bounds what reaches the controller (0 when unset).
    Output {
        /// Egress port.
        port: PortNo,
        /// Octets sent to the controller.
        max_len: u16,
    },
    /// Process the packet through a group.
    Group(u32),
    /// Send the packet to the port held in `field`.
    OutputReg {
        /// Field holding the egress port.
        field: FieldId,
        /// Bits of `field` used, starting at bit 0.
        n_bits: u16,
        /// Octets sent to the controller.
        max_len: u16,
    },
    /// Masked write to a field.
    SetField(SetField),
    /// Rewrite the VLAN id (low 12 bits only).
    SetVlanVid(u16),
    /// Remove the outermost VLAN tag.
    PopVlan,
    /// Insert an 802.1Q tag.
    PushVlan,
    /// Rewrite the IPv4 source address.
    SetIpv4Src(Ipv4Addr),
    /// Rewrite the IPv4 destination address.
    SetIpv4Dst(Ipv4Addr),
    /// Copy bits between fields.
    RegMove(RegMove),
    /// Decrement the TTL; controllers in `controller_ids` are told when it expires.
    DecTtl {
        /// Controller connection ids to notify.
        controller_ids: ArrayVec<u16, MAX_CONTROLLER_IDS>,
    },
    /// Re-run the lookup as if the packet arrived on `in_port`, in `table_id`.
    Resubmit {
        /// Ingress port to pretend ([`PortNo::IN_PORT`] keeps the current one).
        in_port: PortNo,
        /// Table to look up.
        table_id: u8,
    },
    /// `metadata = (metadata & !mask) | (value & mask)`.
    WriteMetadata {
        /// New bits.
        metadata: u64,
        /// Bits to change.
        mask: u64,
    },
    /// Continue in `table_id`.
    GotoTable(u8),
}

impl Action {
    /// The record type this action is encoded as.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::Output { .. } => ActionType::Output,
            Action::Group(_) => ActionType::Group,
            Action::OutputReg { .. } => ActionType::OutputReg,
            Action::SetField(_) => ActionType::SetField,
            Action::SetVlanVid(_) => ActionType::SetVlanVid,
            Action::PopVlan => ActionType::StripVlan,
            Action::PushVlan => ActionType::PushVlan,
            Action::SetIpv4Src(_) => ActionType::SetIpv4Src,
            Action::SetIpv4Dst(_) => ActionType::SetIpv4Dst,
            Action::RegMove(_) => ActionType::RegMove,
            Action::DecTtl { .. } => ActionType::DecTtl,
            Action::Resubmit { .. } => ActionType::Resubmit,
            Action::WriteMetadata { .. } => ActionType::WriteMetadata,
            Action::GotoTable(_) => ActionType::GotoTable,
        }
    }

    fn raw(&self) -> u8 {
        match self {
            Action::PopVlan => RAW_POP_VLAN,
            _ => RAW_NONE,
        }
    }

    /// Length of the encoded record, padding included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Action::Output { .. } => OUTPUT_LEN,
            Action::Group(_) => GROUP_LEN,
            Action::OutputReg { .. } => OUTPUT_REG_LEN,
            Action::SetField(sf) => align_up(SET_FIELD_FIXED_LEN + 2 * sf.value.len()),
            Action::SetVlanVid(_) => SET_VLAN_VID_LEN,
            Action::PopVlan => STRIP_VLAN_LEN,
            Action::PushVlan => PUSH_VLAN_LEN,
            Action::SetIpv4Src(_) | Action::SetIpv4Dst(_) => SET_IPV4_LEN,
            Action::RegMove(_) => REG_MOVE_LEN,
            Action::DecTtl { controller_ids } => {
                align_up(DEC_TTL_FIXED_LEN + 2 * controller_ids.len())
            }
            Action::Resubmit { .. } => RESUBMIT_LEN,
            Action::WriteMetadata { .. } => WRITE_METADATA_LEN,
            Action::GotoTable(_) => GOTO_TABLE_LEN,
        }
    }

    /// Append this action's record to `buf`; returns the offset of the record.
    pub fn encode(&self, buf: &mut ActionBuf) -> usize {
        let start = buf.start_record(self.action_type() as u8, self.raw());
        match self {
            Action::Output { port, max_len } => {
                buf.put(port.as_u32());
                buf.put(*max_len);
            }
            Action::Group(group_id) => {
                buf.put(*group_id);
            }
            Action::OutputReg {
                field,
                n_bits,
                max_len,
            } => {
                buf.put(field.as_u16());
                buf.put(0u16);
                buf.put(*n_bits);
                buf.put(*max_len);
            }
            Action::SetField(sf) => {
                buf.put(sf.field.as_u16());
                buf.put(sf.flags.bits());
                #[allow(clippy::cast_possible_truncation)] // at most MAX_FIELD_BYTES
                buf.put(sf.value.len() as u8);
                buf.append(&sf.value);
                buf.append(&sf.mask);
            }
            Action::SetVlanVid(vid) => {
                buf.put(net::vlan::vid_bits(*vid));
                buf.put(0u8); // never push a tag implicitly
                buf.put(SetFieldFlags::FLOW_HAS_VLAN.bits());
            }
            Action::PopVlan => {}
            Action::PushVlan => {
                buf.put(ETH_TYPE_VLAN);
            }
            Action::SetIpv4Src(addr) | Action::SetIpv4Dst(addr) => {
                buf.put(addr.to_bits());
            }
            Action::RegMove(mv) => {
                buf.put(mv.src.as_u16());
                buf.put(0u16);
                buf.put(mv.dst.as_u16());
                buf.put(0u16);
                buf.put(mv.n_bits);
            }
            Action::DecTtl { controller_ids } => {
                // the count is only known once the id tail has been written
                let n_at = buf.put(0u16);
                buf.put_zeros(2);
                for id in controller_ids {
                    buf.put(*id);
                }
                #[allow(clippy::cast_possible_truncation)] // at most MAX_CONTROLLER_IDS
                buf.patch(n_at, controller_ids.len() as u16);
            }
            Action::Resubmit { in_port, table_id } => {
                buf.put(in_port.as_u32());
                buf.put(*table_id);
            }
            Action::WriteMetadata { metadata, mask } => {
                buf.put_zeros(4);
                buf.put(*metadata);
                buf.put(*mask);
            }
            Action::GotoTable(table_id) => {
                buf.put(*table_id);
            }
        }
        buf.finish_record(start);
        debug_assert_eq!(buf.len() - start, self.encoded_len());
        start
    }

    /// Parse the record at the start of `bytes`; returns it with its length.
    ///
    /// # Errors
    ///
    /// Fails if the record is truncated, malformed, or of a shape [`Action::encode`] never
    /// produces.
    pub fn parse(bytes: &[u8]) -> Result<(Action, usize), ParseError> {
        let mut header = Cursor::new(bytes);
        let type_code = header.get::<u8>()?;
        let _raw = header.get::<u8>()?;
        let len = header.get::<u16>()?;
        let record_len = usize::from(len);
        if record_len < ALIGN || record_len % ALIGN != 0 {
            return Err(ParseError::BadLength(len));
        }
        if bytes.len() < record_len {
            return Err(ParseError::Length(LengthError {
                expected: record_len,
                actual: bytes.len(),
            }));
        }
        let ty = ActionType::from_repr(type_code).ok_or(ParseError::UnknownType(type_code))?;
        let mut cur = Cursor::new(&bytes[RECORD_HEADER_LEN..record_len]);
        let action = match ty {
            ActionType::Output => Action::Output {
                port: PortNo(cur.get()?),
                max_len: cur.get()?,
            },
            ActionType::Group => Action::Group(cur.get()?),
            ActionType::OutputReg => {
                let field = FieldId::try_from(cur.get::<u16>()?)?;
                let ofs = cur.get::<u16>()?;
                let n_bits = cur.get::<u16>()?;
                check_subfield(field, ofs, n_bits)?;
                Action::OutputReg {
                    field,
                    n_bits,
                    max_len: cur.get()?,
                }
            }
            ActionType::SetField => {
                let field = FieldId::try_from(cur.get::<u16>()?)?;
                let flags = SetFieldFlags::from_bits_retain(cur.get::<u8>()?);
                let n_bytes = cur.get::<u8>()?;
                if n_bytes != field.n_bytes() {
                    return Err(ParseError::FieldWidth {
                        field,
                        expected: field.n_bytes(),
                        actual: n_bytes,
                    });
                }
                let value = cur.take(usize::from(n_bytes))?.iter().copied().collect();
                let mask = cur.take(usize::from(n_bytes))?.iter().copied().collect();
                Action::SetField(SetField {
                    field,
                    value,
                    mask,
                    flags,
                })
            }
            ActionType::SetVlanVid => Action::SetVlanVid(net::vlan::vid_bits(cur.get::<u16>()?)),
            ActionType::StripVlan => Action::PopVlan,
            ActionType::PushVlan => match cur.get::<u16>()? {
                ETH_TYPE_VLAN => Action::PushVlan,
                other => return Err(ParseError::EthType(other)),
            },
            ActionType::SetIpv4Src => Action::SetIpv4Src(Ipv4Addr::from_bits(cur.get()?)),
            ActionType::SetIpv4Dst => Action::SetIpv4Dst(Ipv4Addr::from_bits(cur.get()?)),
            ActionType::RegMove => {
                let src = FieldId::try_from(cur.get::<u16>()?)?;
                let src_ofs = cur.get::<u16>()?;
                let dst = FieldId::try_from(cur.get::<u16>()?)?;
                let dst_ofs = cur.get::<u16>()?;
                let n_bits = cur.get::<u16>()?;
                check_subfield(src, src_ofs, n_bits)?;
                check_subfield(dst, dst_ofs, n_bits)?;
                Action::RegMove(RegMove { src, dst, n_bits })
            }
            ActionType::DecTtl => {
                let n = cur.get::<u16>()?;
                if usize::from(n) > MAX_CONTROLLER_IDS {
                    return Err(ParseError::ControllerIds(n));
                }
                cur.take(2)?;
                let mut controller_ids = ArrayVec::new();
                for _ in 0..n {
                    controller_ids.push(cur.get::<u16>()?);
                }
                Action::DecTtl { controller_ids }
            }
            ActionType::Resubmit => Action::Resubmit {
                in_port: PortNo(cur.get()?),
                table_id: cur.get()?,
            },
            ActionType::WriteMetadata => {
                cur.take(4)?;
                Action::WriteMetadata {
                    metadata: cur.get()?,
                    mask: cur.get()?,
                }
            }
            ActionType::GotoTable => Action::GotoTable(cur.get()?),
        };
        if action.encoded_len() != record_len {
            return Err(ParseError::RecordLength {
                ty,
                expected: action.encoded_len(),
                actual: record_len,
            });
        }
        Ok((action, record_len))
    }
}

fn check_subfield(field: FieldId, ofs: u16, n_bits: u16) -> Result<(), ParseError> {
    if ofs != 0 || n_bits == 0 || n_bits > field.n_bits() {
        return Err(ParseError::Subfield { field, ofs, n_bits });
    }
    Ok(())
}

/// Not enough octets to parse what was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected at least {expected} bytes, got {actual}")]
pub struct LengthError {
    /// Octets needed.
    pub expected: usize,
    /// Octets available.
    pub actual: usize,
}

/// Reasons a record is rejected by [`Action::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Truncated header, payload or list.
    #[error(transparent)]
    Length(#[from] LengthError),
    /// Record length is zero, or not a multiple of the list alignment.
    #[error("record length {0} is not a non-zero multiple of {ALIGN}")]
    BadLength(u16),
    /// No such record type.
    #[error("unknown action type {0}")]
    UnknownType(u8),
    /// The record names a field the registry does not know.
    #[error(transparent)]
    UnknownField(#[from] UnknownField),
    /// A set-field value is not as wide as its field.
    #[error("{field} is {expected} bytes wide, record carries {actual}")]
    FieldWidth {
        /// Field written.
        field: FieldId,
        /// Width from the registry.
        expected: u8,
        /// Width found in the record.
        actual: u8,
    },
    /// A sub-field reference that does not start at bit 0 or does not fit its field.
    #[error("unsupported sub-field {field}[{ofs}..+{n_bits}]")]
    Subfield {
        /// Field referenced.
        field: FieldId,
        /// First bit.
        ofs: u16,
        /// Number of bits.
        n_bits: u16,
    },
    /// A dec-ttl record naming more controllers than a record may hold.
    #[error("{0} controller ids exceed the limit of {MAX_CONTROLLER_IDS}")]
    ControllerIds(u16),
    /// A push-vlan record with an ethertype other than 802.1Q.
    #[error("unsupported vlan ethertype {0:#06x}")]
    EthType(u16),
    /// The record length disagrees with its payload.
    #[error("{ty:?} record should be {expected} bytes long, found {actual}")]
    RecordLength {
        /// Record type.
        ty: ActionType,
        /// Length implied by the payload.
        expected: usize,
        /// Length found in the header.
        actual: usize,
    },
}

/// Bounds-checked reader over a record.
#[derive(Debug)]
struct Cursor<'buf> {
    inner: &'buf [u8],
    pos: usize,
}

impl<'buf> Cursor<'buf> {
    fn new(inner: &'buf [u8]) -> Cursor<'buf> {
        Cursor { inner, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'buf [u8], LengthError> {
        let remaining = self.inner.len() - self.pos;
        if n > remaining {
            return Err(LengthError {
                expected: n,
                actual: remaining,
            });
        }
        let out = &self.inner[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn get<T: WireScalar>(&mut self) -> Result<T, LengthError> {
        self.take(T::SIZE).map(T::read_wire)
    }
}

/// Iterator over the records of an encoded list.
///
/// Yields one error at most: iteration stops at the first record that fails to parse.
#[derive(Debug, Clone)]
pub struct ActionIter<'buf> {
    rest: &'buf [u8],
}

impl<'buf> ActionIter<'buf> {
    /// Iterate over the records in `bytes`.
    #[must_use]
    pub fn new(bytes: &'buf [u8]) -> ActionIter<'buf> {
        ActionIter { rest: bytes }
    }
}

impl Iterator for ActionIter<'_> {
    type Item = Result<Action, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match Action::parse(self.rest) {
            Ok((action, len)) => {
                self.rest = &self.rest[len..];
                Some(Ok(action))
            }
            Err(e) => {
                self.rest = &[];
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(action: &Action) -> Vec<u8> {
        let mut buf = ActionBuf::new();
        action.encode(&mut buf);
        buf.take().into()
    }

    fn samples() -> Vec<Action> {
        vec![
            Action::Output {
                port: PortNo(5),
                max_len: 0,
            },
            Action::Group(7),
            Action::OutputReg {
                field: FieldId::Reg7,
                n_bits: 32,
                max_len: MAX_LEN_UNLIMITED,
            },
            Action::SetField(SetField::exact(FieldId::Reg0, &[0, 0, 0, 42])),
            Action::SetField(SetField::exact(FieldId::EthDst, &[2, 0, 0, 0, 0, 1]).with_vlan(true)),
            Action::SetVlanVid(100),
            Action::PopVlan,
            Action::PushVlan,
            Action::SetIpv4Src(Ipv4Addr::new(10, 0, 0, 1)),
            Action::SetIpv4Dst(Ipv4Addr::new(192, 168, 1, 1)),
            Action::RegMove(RegMove::whole(FieldId::Reg0, FieldId::TunId)),
            Action::DecTtl {
                controller_ids: [0].into_iter().collect(),
            },
            Action::Resubmit {
                in_port: PortNo::IN_PORT,
                table_id: 3,
            },
            Action::WriteMetadata {
                metadata: 0x1122_3344_5566_7788,
                mask: 0xffff_0000_0000_ffff,
            },
            Action::GotoTable(2),
        ]
    }

    #[test]
    fn every_type_is_sampled() {
        use strum::IntoEnumIterator;
        let sampled: Vec<_> = samples().iter().map(Action::action_type).collect();
        for ty in ActionType::iter() {
            assert!(sampled.contains(&ty), "{ty:?} has no sample");
        }
    }

    #[test]
    fn records_are_aligned_and_self_describing() {
        for action in samples() {
            let bytes = encode(&action);
            assert_eq!(bytes.len(), action.encoded_len(), "{action:?}");
            assert_eq!(bytes.len() % ALIGN, 0, "{action:?}");
            assert_eq!(bytes[0], action.action_type() as u8);
            assert_eq!(usize::from(u16::read_wire(&bytes[2..4])), bytes.len());
            assert_eq!(Action::parse(&bytes).unwrap(), (action, bytes.len()));
        }
    }

    #[test]
    fn output_layout() {
        let bytes = encode(&Action::Output {
            port: PortNo::CONTROLLER,
            max_len: 128,
        });
        assert_eq!(
            bytes,
            vec![0, RAW_NONE, 0, 16, 0xff, 0xff, 0xff, 0xfd, 0, 128, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn pop_vlan_layout() {
        assert_eq!(
            encode(&Action::PopVlan),
            vec![ActionType::StripVlan as u8, RAW_POP_VLAN, 0, 8, 0, 0, 0, 0]
        );
    }

    #[test]
    fn write_metadata_layout() {
        let bytes = encode(&Action::WriteMetadata {
            metadata: 0x0102_0304_0506_0708,
            mask: u64::MAX,
        });
        assert_eq!(&bytes[4..8], &[0; 4]);
        assert_eq!(&bytes[8..16], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[16..24], &[0xff; 8]);
    }

    #[test]
    fn set_field_layout() {
        let bytes = encode(&Action::SetField(
            SetField::exact(FieldId::EthSrc, &[2, 0, 0, 0, 0, 9]).with_vlan(true),
        ));
        assert_eq!(bytes.len(), 24);
        assert_eq!(u16::read_wire(&bytes[4..6]), FieldId::EthSrc.as_u16());
        assert_eq!(bytes[6], SetFieldFlags::FLOW_HAS_VLAN.bits());
        assert_eq!(bytes[7], 6);
        assert_eq!(&bytes[8..14], &[2, 0, 0, 0, 0, 9]);
        assert_eq!(&bytes[14..20], &[0xff; 6]);
        assert_eq!(&bytes[20..24], &[0; 4]);
    }

    #[test]
    #[should_panic(expected = "bytes wide")]
    fn set_field_rejects_wrong_width() {
        let _ = SetField::exact(FieldId::Reg0, &[1, 2]);
    }

    #[test]
    fn vlan_vid_keeps_low_twelve_bits() {
        let bytes = encode(&Action::SetVlanVid(0xf123));
        assert_eq!(u16::read_wire(&bytes[4..6]), 0x0123);
        assert_eq!(Action::parse(&bytes).unwrap().0, Action::SetVlanVid(0x0123));
    }

    #[test]
    fn dec_ttl_id_count_is_bounded() {
        let full = Action::DecTtl {
            controller_ids: (0..).take(MAX_CONTROLLER_IDS).collect(),
        };
        let bytes = encode(&full);
        assert_eq!(bytes.len(), align_up(DEC_TTL_FIXED_LEN + 2 * MAX_CONTROLLER_IDS));
        #[allow(clippy::cast_possible_truncation)]
        let n = MAX_CONTROLLER_IDS as u16;
        assert_eq!(u16::read_wire(&bytes[4..6]), n);
        assert_eq!(Action::parse(&bytes).unwrap().0, full);

        // a record claiming one id too many is refused before its tail is read
        let mut over = bytes.clone();
        over[4..6].copy_from_slice(&(n + 1).to_wire());
        assert_eq!(Action::parse(&over), Err(ParseError::ControllerIds(n + 1)));
    }

    #[test]
    fn truncated_record_is_rejected() {
        let bytes = encode(&Action::Group(9));
        assert_eq!(
            Action::parse(&bytes[..6]),
            Err(ParseError::Length(LengthError {
                expected: 8,
                actual: 6
            }))
        );
        assert!(matches!(
            Action::parse(&bytes[..2]),
            Err(ParseError::Length(_))
        ));
    }

    #[test]
    fn bad_headers_are_rejected() {
        assert_eq!(
            Action::parse(&[0, RAW_NONE, 0, 12, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(ParseError::BadLength(12))
        );
        assert_eq!(
            Action::parse(&[200, RAW_NONE, 0, 8, 0, 0, 0, 0]),
            Err(ParseError::UnknownType(200))
        );
        // a group record claiming to be twice its size
        let mut group = encode(&Action::Group(1));
        group[3] = 16;
        group.extend_from_slice(&[0; 8]);
        assert!(matches!(
            Action::parse(&group),
            Err(ParseError::RecordLength { ty: ActionType::Group, .. })
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut bytes = encode(&Action::SetField(SetField::exact(FieldId::Reg0, &[0; 4])));
        bytes[4] = 0xff;
        bytes[5] = 0xff;
        assert_eq!(
            Action::parse(&bytes),
            Err(ParseError::UnknownField(UnknownField(0xffff)))
        );
    }

    #[test]
    fn sub_field_offsets_are_rejected() {
        let mut bytes = encode(&Action::RegMove(RegMove::whole(FieldId::Reg0, FieldId::Reg1)));
        bytes[7] = 4; // src_ofs
        assert!(matches!(
            Action::parse(&bytes),
            Err(ParseError::Subfield { field: FieldId::Reg0, ofs: 4, .. })
        ));
    }

    #[test]
    fn iterator_stops_after_an_error() {
        let mut bytes = encode(&Action::GotoTable(1));
        bytes.extend_from_slice(&[0xee, 0, 0, 8, 0, 0, 0, 0]);
        bytes.extend(encode(&Action::GotoTable(2)));
        let mut iter = ActionIter::new(&bytes);
        assert_eq!(iter.next(), Some(Ok(Action::GotoTable(1))));
        assert_eq!(iter.next(), Some(Err(ParseError::UnknownType(0xee))));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn parse_noise_never_panics() {
        bolero::check!().with_type().for_each(|bytes: &Vec<u8>| {
            for record in ActionIter::new(bytes) {
                if let Ok(action) = record {
                    let reencoded = encode(&action);
                    assert_eq!(Action::parse(&reencoded).unwrap().0, action);
                }
            }
        });
    }
}
