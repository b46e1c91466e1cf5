// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Chainable construction of action lists.

use crate::action::{Action, MAX_LEN_UNLIMITED, RegMove, SetField};
use crate::buf::{ActionBuf, ActionList};
use crate::dst::ActionsDst;
use crate::field::FieldId;
use crate::port::PortNo;
use crate::wire::WireScalar;
use core::net::IpAddr;
use net::eth::mac::Mac;
use tracing::{debug, trace};

/// Accumulates actions for one OpenFlow message.
///
/// Operations append records in call order and return `&mut Self`, so a list reads like the
/// pipeline it describes:
///
/// ```
/// # use ofagent_ofpact::{ActionBuilder, FlowEntry};
/// let mut flow = FlowEntry::new(0, 100);
/// ActionBuilder::new().output(5u32).goto_table(2).group(7).build(&mut flow);
/// assert_eq!(flow.actions_len(), 32);
/// ```
///
/// The builder remembers whether a VLAN tag has been pushed or rewritten so far: ethernet
/// address rewrites issued afterwards are flagged so the datapath finds the addresses behind
/// the tag. That state survives [`ActionBuilder::build`].
#[derive(Debug, Default)]
pub struct ActionBuilder {
    buf: ActionBuf,
    vlan_present: bool,
}

impl ActionBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> ActionBuilder {
        ActionBuilder::with_capacity(ActionBuf::DEFAULT_CAPACITY)
    }

    /// Create an empty builder with room for `capacity` octets of records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ActionBuilder {
        ActionBuilder {
            buf: ActionBuf::with_capacity(capacity),
            vlan_present: false,
        }
    }

    /// True once a VLAN tag has been pushed or its id set.
    #[must_use]
    pub fn vlan_present(&self) -> bool {
        self.vlan_present
    }

    /// Octets accumulated since the last build.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True iff nothing has been accumulated since the last build.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The records accumulated since the last build.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_slice()
    }

    /// Decode the records accumulated since the last build.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        crate::action::ActionIter::new(self.buf.as_slice())
            .map_while(Result::ok)
            .collect()
    }

    fn push(&mut self, action: &Action) -> &mut Self {
        let at = action.encode(&mut self.buf);
        trace!("appended {action} at offset {at}");
        self
    }

    fn set_register<T: WireScalar>(&mut self, field: FieldId, value: T) -> &mut Self {
        let value = value.to_wire();
        self.push(&Action::SetField(SetField::exact(field, &value)))
    }

    /// Load an 8 bit value into `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field` is not one octet wide.
    pub fn set_register8(&mut self, field: FieldId, value: u8) -> &mut Self {
        self.set_register(field, value)
    }

    /// Load a 16 bit value into `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field` is not two octets wide.
    pub fn set_register16(&mut self, field: FieldId, value: u16) -> &mut Self {
        self.set_register(field, value)
    }

    /// Load a 32 bit value into `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field` is not four octets wide.
    pub fn set_register32(&mut self, field: FieldId, value: u32) -> &mut Self {
        self.set_register(field, value)
    }

    /// Load a 64 bit value into `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field` is not eight octets wide.
    pub fn set_register64(&mut self, field: FieldId, value: u64) -> &mut Self {
        self.set_register(field, value)
    }

    /// Load a MAC address into `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field` is not six octets wide.
    pub fn set_register_mac(&mut self, field: FieldId, mac: Mac) -> &mut Self {
        self.push(&Action::SetField(SetField::exact(field, mac.as_ref())))
    }

    /// Copy `src` into `dst`, as many low bits as the narrower of the two holds.
    pub fn move_field(&mut self, src: FieldId, dst: FieldId) -> &mut Self {
        self.push(&Action::RegMove(RegMove::whole(src, dst)))
    }

    /// Overwrite the bits of the metadata selected by `mask`.
    pub fn write_metadata(&mut self, metadata: u64, mask: u64) -> &mut Self {
        self.push(&Action::WriteMetadata { metadata, mask })
    }

    fn set_eth(&mut self, field: FieldId, mac: Option<Mac>) -> &mut Self {
        match mac {
            Some(mac) => {
                let vlan = self.vlan_present;
                self.push(&Action::SetField(
                    SetField::exact(field, mac.as_ref()).with_vlan(vlan),
                ))
            }
            None => self,
        }
    }

    /// Rewrite the ethernet source address; does nothing if `mac` is `None`.
    pub fn set_eth_src(&mut self, mac: Option<Mac>) -> &mut Self {
        self.set_eth(FieldId::EthSrc, mac)
    }

    /// Rewrite the ethernet destination address; does nothing if `mac` is `None`.
    pub fn set_eth_dst(&mut self, mac: Option<Mac>) -> &mut Self {
        self.set_eth(FieldId::EthDst, mac)
    }

    /// Rewrite the IP source address.
    pub fn set_ip_src(&mut self, addr: IpAddr) -> &mut Self {
        match addr {
            IpAddr::V4(v4) => self.push(&Action::SetIpv4Src(v4)),
            IpAddr::V6(v6) => {
                self.push(&Action::SetField(SetField::exact(FieldId::Ipv6Src, &v6.octets())))
            }
        }
    }

    /// Rewrite the IP destination address.
    pub fn set_ip_dst(&mut self, addr: IpAddr) -> &mut Self {
        match addr {
            IpAddr::V4(v4) => self.push(&Action::SetIpv4Dst(v4)),
            IpAddr::V6(v6) => {
                self.push(&Action::SetField(SetField::exact(FieldId::Ipv6Dst, &v6.octets())))
            }
        }
    }

    /// Decrement the IP TTL, notifying the default controller connection on expiry.
    pub fn decrement_ttl(&mut self) -> &mut Self {
        self.push(&Action::DecTtl {
            controller_ids: [0].into_iter().collect(),
        })
    }

    /// Continue processing in `table_id`.
    pub fn goto_table(&mut self, table_id: u8) -> &mut Self {
        debug_assert_ne!(table_id, u8::MAX, "table 255 is not a valid goto target");
        self.push(&Action::GotoTable(table_id))
    }

    /// Look the packet up again in `table_id` as if it had arrived on `in_port`.
    pub fn resubmit(&mut self, in_port: impl Into<PortNo>, table_id: u8) -> &mut Self {
        self.push(&Action::Resubmit {
            in_port: in_port.into(),
            table_id,
        })
    }

    /// Send the packet to `port`.
    pub fn output(&mut self, port: impl Into<PortNo>) -> &mut Self {
        self.push(&Action::Output {
            port: port.into(),
            max_len: 0,
        })
    }

    /// Send the packet to the port number held in `field`.
    pub fn output_from_field(&mut self, field: FieldId) -> &mut Self {
        self.push(&Action::OutputReg {
            field,
            n_bits: field.n_bits(),
            max_len: MAX_LEN_UNLIMITED,
        })
    }

    /// Process the packet through group `group_id`.
    pub fn group(&mut self, group_id: u32) -> &mut Self {
        self.push(&Action::Group(group_id))
    }

    /// Send (up to `max_len` octets of) the packet to the controller.
    pub fn controller_upload(&mut self, max_len: u16) -> &mut Self {
        self.push(&Action::Output {
            port: PortNo::CONTROLLER,
            max_len,
        })
    }

    /// Insert an 802.1Q tag.
    pub fn push_vlan_header(&mut self) -> &mut Self {
        self.vlan_present = true;
        self.push(&Action::PushVlan)
    }

    /// Set the VLAN id; bits above the low 12 are dropped.
    pub fn set_vlan_id(&mut self, vid: u16) -> &mut Self {
        self.vlan_present = true;
        self.push(&Action::SetVlanVid(net::vlan::vid_bits(vid)))
    }

    /// Remove the outermost VLAN tag.
    pub fn pop_vlan_header(&mut self) -> &mut Self {
        self.push(&Action::PopVlan)
    }

    /// Pad the accumulated list and hand it over to `dst`.
    ///
    /// The builder is left empty and may be reused; building again straight away hands an empty
    /// list to the next destination. The VLAN state is kept.
    pub fn build<D: ActionsDst>(&mut self, dst: &mut D) {
        self.buf.finalize_pad();
        let list: ActionList = self.buf.take();
        let len = list.len();
        debug!("built {len} octet action list: {list}");
        dst.set_actions(list);
        dst.set_actions_len(len);
    }
}
