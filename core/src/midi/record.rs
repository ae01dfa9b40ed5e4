//! Layout of a single event inside a [`MidiBuffer`](crate::midi::MidiBuffer) store.
//!
//! Every event is a header followed by its raw bytes:
//!
//! ```text
//! | sample position: i32 | data length: i32 | data: [u8; data length] |
//! ```
//!
//! Both header fields are stored in native endianness.

use std::mem::size_of;

pub type SamplePosition = i32;

pub const HEADER_SIZE: usize = 2 * size_of::<i32>();

#[inline]
fn read_i32(bytes: &[u8]) -> i32 {
  let mut raw = [0u8; 4];
  raw.copy_from_slice(&bytes[..4]);
  i32::from_ne_bytes(raw)
}

#[inline]
pub fn sample_position(record: &[u8]) -> SamplePosition {
  read_i32(record)
}

#[inline]
pub fn data_len(record: &[u8]) -> usize {
  read_i32(&record[4..]) as usize
}

/// Total size of the record starting at the beginning of `record`, header included.
#[inline]
pub fn record_size(record: &[u8]) -> usize {
  HEADER_SIZE + data_len(record)
}

#[inline]
pub fn data(record: &[u8]) -> &[u8] {
  &record[HEADER_SIZE..record_size(record)]
}

/// Writes a header for `len` bytes of data at `sample_position`.
#[inline]
pub fn write_header(out: &mut [u8], sample_position: SamplePosition, len: usize) {
  out[..4].copy_from_slice(&sample_position.to_ne_bytes());
  out[4..HEADER_SIZE].copy_from_slice(&(len as i32).to_ne_bytes());
}

/// Iterates over the byte offsets of every record in `store`.
pub struct Offsets<'a> {
  store: &'a [u8],
  offset: usize,
}

impl<'a> Offsets<'a> {
  pub fn new(store: &'a [u8]) -> Offsets<'a> {
    Offsets { store, offset: 0 }
  }
}

impl<'a> Iterator for Offsets<'a> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    if self.offset < self.store.len() {
      let current = self.offset;
      self.offset += record_size(&self.store[current..]);
      Some(current)
    } else {
      None
    }
  }
}
