// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The action accumulator.
//!
//! [`ActionBuf`] is an append-only byte buffer. Records are written header first; the header's
//! length field is patched in place once the record's tail is known (see
//! [`ActionBuf::finish_record`]). [`ActionBuf::take`] hands the accumulated bytes over as an
//! [`ActionList`] and leaves the buffer empty.
//!
//! Growth goes through [`Vec`]: running out of memory aborts the process.

use crate::action::{ActionIter, RECORD_HEADER_LEN};
use crate::wire::WireScalar;

/// Alignment, in octets, of every record and of a whole action list.
pub const ALIGN: usize = 8;

/// Round `len` up to the next multiple of [`ALIGN`].
#[must_use]
pub const fn align_up(len: usize) -> usize {
    len.div_ceil(ALIGN) * ALIGN
}

/// Growable buffer of encoded action records.
#[derive(Debug, Default)]
pub struct ActionBuf {
    data: Vec<u8>,
}

impl ActionBuf {
    /// Initial capacity used by [`ActionBuf::new`].
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create an empty buffer with [`Self::DEFAULT_CAPACITY`] octets reserved.
    #[must_use]
    pub fn new() -> ActionBuf {
        ActionBuf::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with `capacity` octets reserved.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> ActionBuf {
        ActionBuf {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of octets accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True iff nothing has been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The accumulated octets.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append raw octets; returns the offset they start at.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);
        offset
    }

    /// Append a scalar in network byte order; returns its offset.
    pub fn put<T: WireScalar>(&mut self, value: T) -> usize {
        self.append(&value.to_wire())
    }

    /// Append `n` zero octets; returns their offset.
    pub fn put_zeros(&mut self, n: usize) -> usize {
        let offset = self.data.len();
        self.data.resize(offset + n, 0);
        offset
    }

    /// Overwrite a scalar previously written at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the scalar would extend past the end of the buffer.
    pub fn patch<T: WireScalar>(&mut self, offset: usize, value: T) {
        value.write_wire(&mut self.data[offset..offset + T::SIZE]);
    }

    /// Write a record header (`type`, `raw`, zero length); returns the record offset.
    pub fn start_record(&mut self, type_code: u8, raw: u8) -> usize {
        let start = self.append(&[type_code, raw]);
        self.put(0u16);
        start
    }

    /// Pad the record starting at `start` to [`ALIGN`] and patch its length field.
    ///
    /// # Panics
    ///
    /// Panics if `start` does not point at a header written by [`Self::start_record`].
    pub fn finish_record(&mut self, start: usize) {
        assert!(
            start + RECORD_HEADER_LEN <= self.data.len(),
            "no record header at offset {start}"
        );
        let len = align_up(self.data.len() - start);
        self.data.resize(start + len, 0);
        let len = u16::try_from(len).unwrap_or_else(|_| unreachable!("record longer than 64k"));
        self.patch(start + 2, len);
    }

    /// Pad the whole buffer to a multiple of [`ALIGN`].
    pub fn finalize_pad(&mut self) {
        let len = align_up(self.data.len());
        self.data.resize(len, 0);
    }

    /// Move the accumulated octets out, leaving the buffer empty.
    ///
    /// Taking again without appending anything yields an empty [`ActionList`].
    pub fn take(&mut self) -> ActionList {
        ActionList {
            bytes: core::mem::take(&mut self.data),
        }
    }
}

/// An encoded, owned action list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionList {
    bytes: Vec<u8>,
}

impl ActionList {
    /// Length of the list in octets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True iff the list holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The encoded records.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Iterate over the records of the list.
    #[must_use]
    pub fn iter(&self) -> ActionIter<'_> {
        ActionIter::new(&self.bytes)
    }
}

impl From<ActionList> for Vec<u8> {
    fn from(list: ActionList) -> Vec<u8> {
        list.bytes
    }
}

impl AsRef<[u8]> for ActionList {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl<'a> IntoIterator for &'a ActionList {
    type Item = <ActionIter<'a> as Iterator>::Item;
    type IntoIter = ActionIter<'a>;

    fn into_iter(self) -> ActionIter<'a> {
        self.iter()
    }
}
