// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! `ovs-ofctl`-like rendering of actions.

use crate::action::{Action, MAX_LEN_UNLIMITED, SetField};
use crate::buf::ActionList;
use crate::port::PortNo;
use core::fmt::{Display, Formatter};

fn fmt_hex(f: &mut Formatter<'_>, bytes: &[u8]) -> core::fmt::Result {
    write!(f, "0x")?;
    bytes.iter().try_for_each(|b| write!(f, "{b:02x}"))
}

fn fmt_set_field(f: &mut Formatter<'_>, sf: &SetField) -> core::fmt::Result {
    write!(f, "set_field:")?;
    fmt_hex(f, sf.value())?;
    if !sf.is_exact() {
        write!(f, "/")?;
        fmt_hex(f, sf.mask())?;
    }
    write!(f, "->{}", sf.field())?;
    if sf.flow_has_vlan() {
        write!(f, "(vlan)")?;
    }
    Ok(())
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Action::Output {
                port: PortNo::CONTROLLER,
                max_len,
            } => write!(f, "controller:{max_len}"),
            Action::Output { port, .. } => write!(f, "output:{port}"),
            Action::Group(group_id) => write!(f, "group:{group_id}"),
            Action::OutputReg {
                field,
                n_bits,
                max_len,
            } => {
                write!(f, "output:{field}[0..{}]", n_bits.saturating_sub(1))?;
                if *max_len != MAX_LEN_UNLIMITED {
                    write!(f, ",max_len={max_len}")?;
                }
                Ok(())
            }
            Action::SetField(sf) => fmt_set_field(f, sf),
            Action::SetVlanVid(vid) => write!(f, "mod_vlan_vid:{vid}"),
            Action::PopVlan => write!(f, "pop_vlan"),
            Action::PushVlan => write!(f, "push_vlan:0x8100"),
            Action::SetIpv4Src(addr) => write!(f, "mod_nw_src:{addr}"),
            Action::SetIpv4Dst(addr) => write!(f, "mod_nw_dst:{addr}"),
            Action::RegMove(mv) => {
                let last = mv.n_bits().saturating_sub(1);
                write!(
                    f,
                    "move:{}[0..{last}]->{}[0..{last}]",
                    mv.src(),
                    mv.dst()
                )
            }
            Action::DecTtl { controller_ids } => {
                write!(f, "dec_ttl")?;
                if controller_ids.as_slice() != [0] {
                    write!(f, "(")?;
                    for (i, id) in controller_ids.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{id}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Action::Resubmit {
                in_port: PortNo::IN_PORT,
                table_id,
            } => write!(f, "resubmit(,{table_id})"),
            Action::Resubmit { in_port, table_id } => write!(f, "resubmit({in_port},{table_id})"),
            Action::WriteMetadata { metadata, mask } => {
                write!(f, "write_metadata:{metadata:#x}")?;
                if *mask != u64::MAX {
                    write!(f, "/{mask:#x}")?;
                }
                Ok(())
            }
            Action::GotoTable(table_id) => write!(f, "goto_table:{table_id}"),
        }
    }
}

impl Display for ActionList {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "actions=")?;
        if self.is_empty() {
            return write!(f, "drop");
        }
        for (i, action) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match action {
                Ok(action) => write!(f, "{action}")?,
                Err(e) => write!(f, "<invalid: {e}>")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::action::Action;
    use crate::builder::ActionBuilder;
    use crate::dst::FlowEntry;
    use crate::field::FieldId;
    use crate::port::PortNo;
    use core::net::{IpAddr, Ipv4Addr};
    use net::eth::mac::Mac;

    fn render(builder: &mut ActionBuilder) -> String {
        let mut flow = FlowEntry::new(0, 0);
        builder.build(&mut flow);
        flow.actions().to_string()
    }

    #[test]
    fn empty_list_drops() {
        assert_eq!(render(&mut ActionBuilder::new()), "actions=drop");
    }

    #[test]
    fn rendering() {
        let mut b = ActionBuilder::new();
        b.set_register32(FieldId::Reg0, 0x2a)
            .move_field(FieldId::Reg0, FieldId::TunId)
            .push_vlan_header()
            .set_vlan_id(10)
            .set_eth_dst(Some(Mac([2, 0, 0, 0, 0, 1])))
            .set_ip_src(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
            .decrement_ttl()
            .resubmit(PortNo::IN_PORT, 3)
            .output_from_field(FieldId::Reg1)
            .controller_upload(128)
            .pop_vlan_header()
            .write_metadata(1, 1)
            .goto_table(4);
        assert_eq!(
            render(&mut b),
            "actions=set_field:0x0000002a->NXM_NX_REG0,\
             move:NXM_NX_REG0[0..31]->NXM_NX_TUN_ID[0..31],\
             push_vlan:0x8100,\
             mod_vlan_vid:10,\
             set_field:0x020000000001->NXM_OF_ETH_DST(vlan),\
             mod_nw_src:10.0.0.1,\
             dec_ttl,\
             resubmit(,3),\
             output:NXM_NX_REG1[0..31],\
             controller:128,\
             pop_vlan,\
             write_metadata:0x1/0x1,\
             goto_table:4"
        );
    }

    #[test]
    fn zero_width_output_reg_renders() {
        let action = Action::OutputReg {
            field: FieldId::Reg0,
            n_bits: 0,
            max_len: 0,
        };
        assert_eq!(action.to_string(), "output:NXM_NX_REG0[0..0],max_len=0");
    }

    #[test]
    fn invalid_records_are_marked() {
        let list = crate::buf::ActionBuf::new().take();
        assert_eq!(list.to_string(), "actions=drop");

        let mut buf = crate::buf::ActionBuf::new();
        buf.append(&[0xee, 0xff, 0, 8, 0, 0, 0, 0]);
        assert_eq!(
            buf.take().to_string(),
            "actions=<invalid: unknown action type 238>"
        );
    }
}
