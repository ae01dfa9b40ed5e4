use crate::midi::buffer::MidiBuffer;
use crate::midi::decoder::Decoder;
use crate::midi::messages::Message;
use crate::midi::record::{self, SamplePosition};

/// An event borrowed from a [`MidiBuffer`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Event<'a> {
  pub sample_position: SamplePosition,
  pub data: &'a [u8],
}

impl<'a> Event<'a> {
  pub fn message(&self) -> Message {
    Decoder::decode(self.data)
  }
}

/// Single pass cursor over the events of a [`MidiBuffer`].
///
/// The buffer stays borrowed for as long as the reader is alive, so it can not be
/// modified in the middle of a traversal.
pub struct Reader<'a> {
  buffer: &'a MidiBuffer,
  offset: usize,
}

impl<'a> Reader<'a> {
  pub fn new(buffer: &'a MidiBuffer) -> Reader<'a> {
    Reader { buffer, offset: 0 }
  }

  /// Moves the cursor so that the next event is the first one at `sample_position` or later.
  ///
  /// The search always starts from the beginning of the buffer, so it can go backwards too.
  pub fn set_next_sample_position(&mut self, sample_position: SamplePosition) {
    self.offset = self.buffer.find_event_at_or_after(sample_position);
  }

  /// Returns the raw bytes of the next event together with its sample position.
  pub fn next_raw(&mut self) -> Option<(&'a [u8], SamplePosition)> {
    self
      .next()
      .map(|event| (event.data, event.sample_position))
  }

  /// Returns a decoded copy of the next event together with its sample position.
  pub fn next_message(&mut self) -> Option<(Message, SamplePosition)> {
    self
      .next()
      .map(|event| (event.message(), event.sample_position))
  }
}

impl<'a> Iterator for Reader<'a> {
  type Item = Event<'a>;

  fn next(&mut self) -> Option<Event<'a>> {
    let buffer: &'a MidiBuffer = self.buffer;
    let store = buffer.data();
    if self.offset < store.len() {
      let current = &store[self.offset..];
      self.offset += record::record_size(current);
      Some(Event {
        sample_position: record::sample_position(current),
        data: record::data(current),
      })
    } else {
      None
    }
  }
}
