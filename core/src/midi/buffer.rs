use std::mem;

use log::trace;

use crate::config::Midi as MidiConfig;
use crate::midi::decoder::{Decoder, EventError, MAX_EVENT_SIZE};
use crate::midi::encoder::Encoder;
use crate::midi::messages::Message;
use crate::midi::reader::{Event, Reader};
use crate::midi::record::{self, Offsets, SamplePosition, HEADER_SIZE};
use crate::pool::Pool;

/// A sequence of MIDI events time-stamped with sample positions.
///
/// Events are stored back to back in a single byte vector and are always kept
/// sorted by their sample position. Events that share a position keep the
/// order in which they were added.
///
/// To read the events back use a [`Reader`], see [`MidiBuffer::iter`].
#[derive(Debug, Clone)]
pub struct MidiBuffer {
  data: Vec<u8>,
  last_offset: Option<usize>,
  max_event_size: usize,
}

impl MidiBuffer {
  pub fn new() -> MidiBuffer {
    MidiBuffer::with_capacity(0)
  }

  /// Creates an empty buffer with room for `capacity` bytes of events, headers included.
  pub fn with_capacity(capacity: usize) -> MidiBuffer {
    MidiBuffer {
      data: Vec::with_capacity(capacity),
      last_offset: None,
      max_event_size: MAX_EVENT_SIZE,
    }
  }

  pub fn with_event(message: &Message, sample_position: SamplePosition) -> MidiBuffer {
    let mut buffer = MidiBuffer::new();
    buffer.add_event(message, sample_position);
    buffer
  }

  pub fn from_config(config: &MidiConfig) -> MidiBuffer {
    let mut buffer = MidiBuffer::with_capacity(config.buffer_pool.item_capacity);
    buffer.set_max_event_size(config.max_event_size);
    buffer
  }

  pub fn max_event_size(&self) -> usize {
    self.max_event_size
  }

  /// Limits the size of the events accepted from now on. It can not go over [`MAX_EVENT_SIZE`].
  pub fn set_max_event_size(&mut self, max_event_size: usize) {
    self.max_event_size = max_event_size.min(MAX_EVENT_SIZE);
  }

  /// Makes sure that at least `size` bytes can be stored without reallocating.
  pub fn ensure_size(&mut self, size: usize) {
    let additional = size.saturating_sub(self.data.len());
    self.data.reserve(additional);
  }

  /// Raw view of the events store.
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  pub fn clear(&mut self) {
    self.data.clear();
    self.last_offset = None;
  }

  /// Removes all the events with `start <= sample position < start + num_samples`.
  pub fn clear_range(&mut self, start: SamplePosition, num_samples: i32) {
    if num_samples <= 0 {
      return;
    }

    let start_offset = self.find_event_at_or_after(start);
    let end_offset = match start.checked_add(num_samples) {
      Some(end) => self.find_event_at_or_after(end),
      None => self.data.len(),
    };

    if start_offset < end_offset {
      let removed_tail = end_offset == self.data.len();
      self.data.drain(start_offset..end_offset);
      self.last_offset = if removed_tail {
        Offsets::new(&self.data).last()
      } else {
        self.last_offset.map(|last| last - (end_offset - start_offset))
      };
    }
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Counts the events in the buffer.
  ///
  /// This walks through every event, prefer [`MidiBuffer::is_empty`] when possible.
  pub fn num_events(&self) -> usize {
    Offsets::new(&self.data).count()
  }

  /// Adds a message at `sample_position`, after any other event at the same position.
  pub fn add_event(&mut self, message: &Message, sample_position: SamplePosition) {
    if let Message::Unknown(data) = message {
      self.add_raw_event(data, sample_position);
      return;
    }

    let size = Encoder::data_size(message);
    if size > self.max_event_size {
      trace!(
        "Dropping MIDI message at {}: {} bytes is over the limit of {}",
        sample_position,
        size,
        self.max_event_size
      );
      return;
    }

    let offset = self.find_event_after(sample_position);
    let out = self.insert_space(offset, sample_position, size);
    Encoder::encode(message, out);
  }

  /// Adds the first event found in `data` at `sample_position`.
  ///
  /// Only the bytes that belong to the event are stored, so `data` can be longer
  /// than the event itself. Data that does not start with a valid event is ignored.
  pub fn add_raw_event(&mut self, data: &[u8], sample_position: SamplePosition) {
    if let Err(err) = self.try_add_raw_event(data, sample_position) {
      trace!("Dropping MIDI event at {}: {}", sample_position, err);
    }
  }

  /// Same as [`MidiBuffer::add_raw_event`] but reports the number of bytes stored
  /// or why nothing was.
  pub fn try_add_raw_event(
    &mut self,
    data: &[u8],
    sample_position: SamplePosition,
  ) -> Result<usize, EventError> {
    let size = Decoder::event_size(data, self.max_event_size)?;
    self.insert_record(sample_position, &data[..size]);
    Ok(size)
  }

  /// Copies the events from `other` with `start_sample <= sample position < start_sample + num_samples`,
  /// moving them by `sample_delta`.
  ///
  /// A negative `num_samples`, or a range reaching past the last representable
  /// position, takes every event from `start_sample` onwards.
  pub fn add_events(
    &mut self,
    other: &MidiBuffer,
    start_sample: SamplePosition,
    num_samples: i32,
    sample_delta: i32,
  ) {
    let end = if num_samples < 0 {
      None
    } else {
      start_sample.checked_add(num_samples)
    };

    let mut reader = other.iter();
    reader.set_next_sample_position(start_sample);

    for Event {
      sample_position,
      data,
    } in reader
    {
      if end.map_or(false, |end| sample_position >= end) {
        break;
      }
      self.insert_record(sample_position.saturating_add(sample_delta), data);
    }
  }

  /// Sample position of the first event, or 0 when empty.
  pub fn first_event_time(&self) -> SamplePosition {
    if self.data.is_empty() {
      0
    } else {
      record::sample_position(&self.data)
    }
  }

  /// Sample position of the last event, or 0 when empty.
  pub fn last_event_time(&self) -> SamplePosition {
    self
      .last_offset
      .map_or(0, |offset| record::sample_position(&self.data[offset..]))
  }

  /// Exchanges the events of both buffers without copying them.
  pub fn swap(&mut self, other: &mut MidiBuffer) {
    mem::swap(self, other);
  }

  pub fn iter(&self) -> Reader<'_> {
    Reader::new(self)
  }

  /// Offset of the first event at `sample_position` or later.
  pub(crate) fn find_event_at_or_after(&self, sample_position: SamplePosition) -> usize {
    Offsets::new(&self.data)
      .find(|offset| record::sample_position(&self.data[*offset..]) >= sample_position)
      .unwrap_or_else(|| self.data.len())
  }

  /// Offset of the first event later than `sample_position`.
  fn find_event_after(&self, sample_position: SamplePosition) -> usize {
    if self.is_empty() || self.last_event_time() <= sample_position {
      return self.data.len();
    }

    Offsets::new(&self.data)
      .find(|offset| record::sample_position(&self.data[*offset..]) > sample_position)
      .unwrap_or_else(|| self.data.len())
  }

  fn insert_record(&mut self, sample_position: SamplePosition, data: &[u8]) {
    let offset = self.find_event_after(sample_position);
    self
      .insert_space(offset, sample_position, data.len())
      .copy_from_slice(data);
  }

  /// Opens room for a record at `offset`, writes its header and returns its data slice.
  fn insert_space(
    &mut self,
    offset: usize,
    sample_position: SamplePosition,
    len: usize,
  ) -> &mut [u8] {
    let size = HEADER_SIZE + len;
    let old_len = self.data.len();

    self.data.resize(old_len + size, 0);
    self.data.copy_within(offset..old_len, offset + size);

    self.last_offset = if offset == old_len {
      Some(offset)
    } else {
      self.last_offset.map(|last| last + size)
    };

    let record = &mut self.data[offset..offset + size];
    record::write_header(record, sample_position, len);
    &mut record[HEADER_SIZE..]
  }
}

impl Default for MidiBuffer {
  fn default() -> MidiBuffer {
    MidiBuffer::new()
  }
}

impl PartialEq for MidiBuffer {
  fn eq(&self, other: &MidiBuffer) -> bool {
    self.data == other.data
  }
}

impl Eq for MidiBuffer {}

impl<'a> IntoIterator for &'a MidiBuffer {
  type Item = Event<'a>;
  type IntoIter = Reader<'a>;

  fn into_iter(self) -> Reader<'a> {
    self.iter()
  }
}

/// A pool of buffers sized by the configuration. Buffers are cleared when released.
pub fn new_buffer_pool(config: &MidiConfig) -> Pool<MidiBuffer> {
  let item_config = config.clone();
  let allocator = Box::new(move || Box::new(MidiBuffer::from_config(&item_config)));
  let reset = Box::new(|buffer: &mut MidiBuffer| buffer.clear());
  Pool::new(config.buffer_pool.pool_capacity, allocator, reset)
}
