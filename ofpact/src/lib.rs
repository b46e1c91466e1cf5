// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::all, clippy::pedantic)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

//! Encoding of switch pipeline actions into action lists.
//!
//! An [`ActionBuilder`] accumulates actions (field loads and moves, address rewrites, VLAN
//! tag handling, table jumps, outputs) as a sequence of 8-octet aligned records, then hands
//! the finished [`ActionList`] to one message through [`ActionsDst`].
//!
//! Fields are named by [`FieldId`] and described by a static registry (see [`field`]).

pub mod action;
pub mod buf;
pub mod builder;
mod display;
pub mod dst;
pub mod field;
pub mod port;
pub mod wire;

// re-exports
pub use action::{Action, ActionIter, ActionType, ParseError};
pub use buf::ActionList;
pub use builder::ActionBuilder;
pub use dst::{ActionsDst, Bucket, FlowEntry, FlowMod, FlowModCommand, PacketOut};
pub use field::{FieldDescriptor, FieldId};
pub use port::PortNo;

use tracectl::trace_target;
trace_target!("ofpact", LevelFilter::INFO, &["openflow"]);
