// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Scalars in wire (network) byte order.
//!
//! Every multi-byte integer written into or read from an action record goes through
//! [`WireScalar`], so no encoder can forget a byte swap.

use arrayvec::ArrayVec;
use byteorder::{ByteOrder, NetworkEndian};

/// An unsigned integer with a fixed network-order representation.
pub trait WireScalar: Copy + Sized {
    /// Width of the scalar on the wire, in octets.
    const SIZE: usize;
    /// All bits set.
    const ONES: Self;

    /// Write `self` to the first [`Self::SIZE`] octets of `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is shorter than [`Self::SIZE`].
    fn write_wire(self, dst: &mut [u8]);

    /// Read a value from the first [`Self::SIZE`] octets of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` is shorter than [`Self::SIZE`].
    fn read_wire(src: &[u8]) -> Self;

    /// The network-order octets of `self`.
    fn to_wire(self) -> ArrayVec<u8, 8> {
        let mut out = ArrayVec::from([0u8; 8]);
        out.truncate(Self::SIZE);
        self.write_wire(&mut out);
        out
    }
}

impl WireScalar for u8 {
    const SIZE: usize = 1;
    const ONES: Self = u8::MAX;

    fn write_wire(self, dst: &mut [u8]) {
        dst[0] = self;
    }

    fn read_wire(src: &[u8]) -> Self {
        src[0]
    }
}

macro_rules! wire_scalar {
    ($ty:ty, $write:ident, $read:ident) => {
        impl WireScalar for $ty {
            const SIZE: usize = core::mem::size_of::<$ty>();
            const ONES: Self = <$ty>::MAX;

            fn write_wire(self, dst: &mut [u8]) {
                NetworkEndian::$write(dst, self);
            }

            fn read_wire(src: &[u8]) -> Self {
                NetworkEndian::$read(src)
            }
        }
    };
}

wire_scalar!(u16, write_u16, read_u16);
wire_scalar!(u32, write_u32, read_u32);
wire_scalar!(u64, write_u64, read_u64);

#[cfg(test)]
mod test {
    use super::WireScalar;

    #[test]
    fn network_order() {
        assert_eq!(0x1234u16.to_wire().as_slice(), &[0x12, 0x34]);
        assert_eq!(0x0102_0304u32.to_wire().as_slice(), &[1, 2, 3, 4]);
        assert_eq!(
            0x0102_0304_0506_0708u64.to_wire().as_slice(),
            &[1, 2, 3, 4, 5, 6, 7, 8]
        );
        assert_eq!(0xabu8.to_wire().as_slice(), &[0xab]);
    }

    #[test]
    fn read_back() {
        bolero::check!().with_type().cloned().for_each(|v: u64| {
            assert_eq!(u64::read_wire(&v.to_wire()), v);
            #[allow(clippy::cast_possible_truncation)]
            let low = v as u32;
            assert_eq!(u32::read_wire(&low.to_wire()), low);
            #[allow(clippy::cast_possible_truncation)]
            let short = v as u16;
            assert_eq!(u16::read_wire(&short.to_wire()), short);
        });
    }

    #[test]
    fn ones_fill_the_width() {
        assert!(u16::ONES.to_wire().iter().all(|b| *b == 0xff));
        assert!(u64::ONES.to_wire().iter().all(|b| *b == 0xff));
        assert_eq!(u32::ONES.to_wire().len(), 4);
    }
}
