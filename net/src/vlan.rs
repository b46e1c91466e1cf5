// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VLAN identifiers.
//!
//! A VLAN id is the low 12 bits of the tag control information word; the upper four carry
//! the priority and drop eligibility bits.

/// Mask selecting the VID bits of a tag control information word.
pub const VID_MASK: u16 = 0x0fff;

/// The VID carried by `tci`, with the priority and drop eligibility bits cleared.
#[must_use]
pub const fn vid_bits(tci: u16) -> u16 {
    tci & VID_MASK
}
