// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Messages an action list can be built into.
//!
//! These are minimal models of the OpenFlow messages that carry actions: enough header to tell
//! them apart, plus the list and its length.

use crate::buf::ActionList;
use crate::port::PortNo;

/// A message that carries an action list.
///
/// [`crate::ActionBuilder::build`] hands over the list first, then its length in octets.
pub trait ActionsDst {
    /// Store the encoded actions.
    fn set_actions(&mut self, actions: ActionList);
    /// Store the length of the encoded actions.
    fn set_actions_len(&mut self, len: usize);
}

macro_rules! actions_dst {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ActionsDst for $ty {
                fn set_actions(&mut self, actions: ActionList) {
                    self.actions = actions;
                }
                fn set_actions_len(&mut self, len: usize) {
                    self.actions_len = len;
                }
            }

            impl $ty {
                /// The encoded actions.
                #[must_use]
                pub fn actions(&self) -> &ActionList {
                    &self.actions
                }

                /// Length of the encoded actions, in octets.
                #[must_use]
                pub fn actions_len(&self) -> usize {
                    self.actions_len
                }
            }
        )*
    };
}

actions_dst!(FlowEntry, FlowMod, PacketOut, Bucket);

/// A flow table entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowEntry {
    /// Table the entry lives in.
    pub table_id: u8,
    /// Match priority.
    pub priority: u16,
    /// Opaque controller-issued identifier.
    pub cookie: u64,
    actions: ActionList,
    actions_len: usize,
}

impl FlowEntry {
    /// An entry in `table_id` at `priority`, with no actions (drop).
    #[must_use]
    pub fn new(table_id: u8, priority: u16) -> FlowEntry {
        FlowEntry {
            table_id,
            priority,
            ..FlowEntry::default()
        }
    }
}

/// What a [`FlowMod`] does to the flow table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowModCommand {
    /// Install a new entry.
    #[default]
    Add,
    /// Change the actions of matching entries.
    Modify,
    /// Change the actions of the entry with an identical match and priority.
    ModifyStrict,
    /// Remove matching entries.
    Delete,
    /// Remove the entry with an identical match and priority.
    DeleteStrict,
}

/// A flow table modification request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowMod {
    /// Requested change.
    pub command: FlowModCommand,
    /// The entry the change applies to.
    pub table_id: u8,
    /// Match priority.
    pub priority: u16,
    /// Seconds of inactivity before removal, 0 for none.
    pub idle_timeout: u16,
    /// Seconds before removal, 0 for none.
    pub hard_timeout: u16,
    actions: ActionList,
    actions_len: usize,
}

impl FlowMod {
    /// A `command` request for `table_id` at `priority`, without timeouts.
    #[must_use]
    pub fn new(command: FlowModCommand, table_id: u8, priority: u16) -> FlowMod {
        FlowMod {
            command,
            table_id,
            priority,
            ..FlowMod::default()
        }
    }
}

/// A packet injected by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    /// Port the packet is deemed to have arrived on.
    pub in_port: PortNo,
    /// Switch buffer holding the packet, if any.
    pub buffer_id: Option<u32>,
    /// The packet, when not buffered on the switch.
    pub data: Vec<u8>,
    actions: ActionList,
    actions_len: usize,
}

impl PacketOut {
    /// An unbuffered packet-out with no payload yet.
    #[must_use]
    pub fn new(in_port: PortNo) -> PacketOut {
        PacketOut {
            in_port,
            buffer_id: None,
            data: Vec::new(),
            actions: ActionList::default(),
            actions_len: 0,
        }
    }
}

/// One bucket of a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    /// Relative weight for select groups.
    pub weight: u16,
    /// Port whose liveness gates the bucket (fast failover groups).
    pub watch_port: Option<PortNo>,
    /// Group whose liveness gates the bucket (fast failover groups).
    pub watch_group: Option<u32>,
    actions: ActionList,
    actions_len: usize,
}

impl Bucket {
    /// A bucket of weight `weight` watching nothing.
    #[must_use]
    pub fn new(weight: u16) -> Bucket {
        Bucket {
            weight,
            ..Bucket::default()
        }
    }
}
