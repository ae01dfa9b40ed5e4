use failure::Fail;

use crate::midi::encoder::{SYSEX_END, SYSEX_START};
use crate::midi::messages::Message;
use crate::midi::types::{U14, U4, U7};

/// Upper bound for the payload of a single event.
pub const MAX_EVENT_SIZE: usize = 0xffff;

#[derive(Debug, Fail, PartialEq, Eq, Clone, Copy)]
pub enum EventError {
  #[fail(display = "No data for the event")]
  Empty,

  #[fail(display = "Expected a status byte but found {:#04x}", byte)]
  NotAStatusByte { byte: u8 },

  #[fail(display = "Undefined status byte {:#04x}", status)]
  Undefined { status: u8 },

  #[fail(display = "Expected {} bytes but only {} are available", expected, available)]
  Truncated { expected: usize, available: usize },

  #[fail(display = "Unexpected status byte {:#04x} at offset {}", byte, offset)]
  InvalidData { byte: u8, offset: usize },

  #[fail(display = "System exclusive message without an end byte")]
  UnterminatedSysEx,

  #[fail(display = "Event longer than the maximum of {} bytes", max_size)]
  TooLong { max_size: usize },
}

#[inline]
fn is_data(byte: u8) -> bool {
  byte & 0b1000_0000 == 0
}

/// Number of bytes, status included, for a message with a fixed size.
fn fixed_size(status: u8) -> Option<usize> {
  match (status >> 4) & 0x0f {
    0b1000 | 0b1001 | 0b1010 | 0b1011 | 0b1110 => Some(3),
    0b1100 | 0b1101 => Some(2),
    0b1111 => match status & 0x0f {
      0b0001 | 0b0011 => Some(2),
      0b0010 => Some(3),
      0b0110 | 0b1000 | 0b1010 | 0b1011 | 0b1100 | 0b1110 | 0b1111 => Some(1),
      _ => None,
    },
    _ => None,
  }
}

/// Parses raw MIDI bytes holding a single message.
pub struct Decoder;

impl Decoder {
  /// Finds how many bytes of `data` belong to its first event.
  ///
  /// The result can be shorter than `data`, in which case the trailing bytes are
  /// not part of the event. No event is ever longer than `max_size`.
  ///
  /// Incomplete events are rejected rather than cut down to the available bytes:
  /// a short message must carry all of its data bytes and a system exclusive
  /// message must contain its end byte within `data` and `max_size`.
  pub fn event_size(data: &[u8], max_size: usize) -> Result<usize, EventError> {
    let status = *data.first().ok_or(EventError::Empty)?;
    if is_data(status) {
      return Err(EventError::NotAStatusByte { byte: status });
    }

    let size = if status == SYSEX_START {
      Self::sysex_size(data, max_size)?
    } else {
      let size = fixed_size(status).ok_or(EventError::Undefined { status })?;
      if data.len() < size {
        return Err(EventError::Truncated {
          expected: size,
          available: data.len(),
        });
      }
      Self::check_data(&data[..size])?;
      size
    };

    if size > max_size {
      Err(EventError::TooLong { max_size })
    } else {
      Ok(size)
    }
  }

  fn sysex_size(data: &[u8], max_size: usize) -> Result<usize, EventError> {
    let limit = data.len().min(max_size.max(1));
    for (offset, byte) in data.iter().enumerate().take(limit).skip(1) {
      match *byte {
        SYSEX_END => return Ok(offset + 1),
        byte if !is_data(byte) => return Err(EventError::InvalidData { byte, offset }),
        _ => {}
      }
    }

    if data.len() > limit {
      Err(EventError::TooLong { max_size })
    } else {
      Err(EventError::UnterminatedSysEx)
    }
  }

  fn check_data(event: &[u8]) -> Result<(), EventError> {
    match event.iter().skip(1).position(|byte| !is_data(*byte)) {
      Some(index) => Err(EventError::InvalidData {
        byte: event[index + 1],
        offset: index + 1,
      }),
      None => Ok(()),
    }
  }

  /// Decodes one complete event.
  ///
  /// Anything that is not a well formed message comes back as [`Message::Unknown`].
  pub fn decode(data: &[u8]) -> Message {
    match Self::event_size(data, MAX_EVENT_SIZE) {
      Ok(size) if size == data.len() => Self::decode_event(data),
      _ => Message::Unknown(data.to_vec()),
    }
  }

  fn decode_event(data: &[u8]) -> Message {
    let status = data[0];
    let channel: U4 = status & 0x0f;
    let d1: U7 = data.get(1).cloned().unwrap_or(0);
    let d2: U7 = data.get(2).cloned().unwrap_or(0);

    match (status >> 4) & 0x0f {
      0b1000 => Message::NoteOff {
        channel,
        key: d1,
        velocity: d2,
      },
      0b1001 => Message::NoteOn {
        channel,
        key: d1,
        velocity: d2,
      },
      0b1010 => Message::PolyphonicKeyPressure {
        channel,
        key: d1,
        value: d2,
      },
      0b1011 => Self::decode_control_change(data, channel, d1, d2),
      0b1100 => Message::ProgramChange { channel, value: d1 },
      0b1101 => Message::ChannelPressure { channel, value: d1 },
      0b1110 => Message::PitchBend {
        channel,
        value: u14(d1, d2),
      },
      _ => match status {
        SYSEX_START => Message::SysEx {
          data: data[1..data.len() - 1].to_vec(),
        },
        0xf1 => Message::MTCQuarterFrame {
          msg_type: (d1 >> 4) & 0x07,
          value: d1 & 0x0f,
        },
        0xf2 => Message::SongPositionPointer { beats: u14(d1, d2) },
        0xf3 => Message::SongSelect { song: d1 },
        0xf6 => Message::TuneRequest,
        0xf8 => Message::TimingClock,
        0xfa => Message::Start,
        0xfb => Message::Continue,
        0xfc => Message::Stop,
        0xfe => Message::ActiveSensing,
        0xff => Message::SystemReset,
        _ => Message::Unknown(data.to_vec()),
      },
    }
  }

  fn decode_control_change(data: &[u8], channel: U4, controller: U7, value: U7) -> Message {
    match (controller, value) {
      (120, 0) => Message::AllSoundOff { channel },
      (121, _) => Message::ResetAllControllers { channel },
      (122, 0) => Message::LocalControlOff { channel },
      (122, 127) => Message::LocalControlOn { channel },
      (123, 0) => Message::AllNotesOff { channel },
      (124, 0) => Message::OmniModeOff { channel },
      (125, 0) => Message::OmniModeOn { channel },
      (126, num_channels) => Message::MonoModeOn {
        channel,
        num_channels,
      },
      (127, 0) => Message::PolyModeOn { channel },
      (120..=127, _) => Message::Unknown(data.to_vec()),
      _ => Message::ControlChange {
        channel,
        controller,
        value,
      },
    }
  }
}

#[inline]
fn u14(lsb: U7, msb: U7) -> U14 {
  (U14::from(msb) << 7) | U14::from(lsb)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn event_size_of_short_messages() {
    assert_eq!(Decoder::event_size(&[0x90, 60, 100], MAX_EVENT_SIZE), Ok(3));
    assert_eq!(Decoder::event_size(&[0xc2, 5], MAX_EVENT_SIZE), Ok(2));
    assert_eq!(Decoder::event_size(&[0xf8], MAX_EVENT_SIZE), Ok(1));
    assert_eq!(Decoder::event_size(&[0xf2, 1, 2], MAX_EVENT_SIZE), Ok(3));
  }

  #[test]
  fn event_size_ignores_trailing_bytes() {
    assert_eq!(Decoder::event_size(&[0x90, 60, 100, 0x80], MAX_EVENT_SIZE), Ok(3));
    assert_eq!(Decoder::event_size(&[0xfa, 1, 2], MAX_EVENT_SIZE), Ok(1));
  }

  #[test]
  fn event_size_rejects_malformed_data() {
    assert_eq!(Decoder::event_size(&[], MAX_EVENT_SIZE), Err(EventError::Empty));
    assert_eq!(
      Decoder::event_size(&[0x40, 1], MAX_EVENT_SIZE),
      Err(EventError::NotAStatusByte { byte: 0x40 })
    );
    assert_eq!(
      Decoder::event_size(&[0x90, 60], MAX_EVENT_SIZE),
      Err(EventError::Truncated {
        expected: 3,
        available: 2
      })
    );
    assert_eq!(
      Decoder::event_size(&[0x90, 60, 0x80], MAX_EVENT_SIZE),
      Err(EventError::InvalidData {
        byte: 0x80,
        offset: 2
      })
    );
  }

  #[test]
  fn event_size_rejects_undefined_status() {
    for status in &[0xf4u8, 0xf5, 0xf7, 0xf9, 0xfd] {
      assert_eq!(
        Decoder::event_size(&[*status], MAX_EVENT_SIZE),
        Err(EventError::Undefined { status: *status })
      );
    }
  }

  #[test]
  fn event_size_of_sysex() {
    let data = [SYSEX_START, 1, 2, 3, SYSEX_END, 0x90];
    assert_eq!(Decoder::event_size(&data, MAX_EVENT_SIZE), Ok(5));
    assert_eq!(
      Decoder::event_size(&[SYSEX_START, 1, 2], MAX_EVENT_SIZE),
      Err(EventError::UnterminatedSysEx)
    );
    assert_eq!(
      Decoder::event_size(&[SYSEX_START, 1, 0x90, SYSEX_END], MAX_EVENT_SIZE),
      Err(EventError::InvalidData {
        byte: 0x90,
        offset: 2
      })
    );
  }

  #[test]
  fn event_size_is_capped() {
    let data = [SYSEX_START, 1, 2, 3, 4, SYSEX_END];
    assert_eq!(Decoder::event_size(&data, 6), Ok(6));
    assert_eq!(
      Decoder::event_size(&data, 4),
      Err(EventError::TooLong { max_size: 4 })
    );
    assert_eq!(
      Decoder::event_size(&[0x90, 60, 100], 2),
      Err(EventError::TooLong { max_size: 2 })
    );
  }

  #[test]
  fn decode_channel_voice() {
    assert_eq!(
      Decoder::decode(&[0b1000_0101, 64, 127]),
      Message::NoteOff {
        channel: 0b0101,
        key: 64,
        velocity: 127
      }
    );
    assert_eq!(
      Decoder::decode(&[0b1011_0101, 64, 127]),
      Message::ControlChange {
        channel: 0b0101,
        controller: 64,
        value: 127
      }
    );
    assert_eq!(
      Decoder::decode(&[0b1101_0101, 0b0_1010101]),
      Message::ChannelPressure {
        channel: 0b0101,
        value: 0b0_1010101
      }
    );
    assert_eq!(
      Decoder::decode(&[0b1110_0101, 0b0_1010101, 0b0_0101010]),
      Message::PitchBend {
        channel: 0b0101,
        value: 0b0_01010101010101
      }
    );
  }

  #[test]
  fn decode_channel_mode() {
    assert_eq!(
      Decoder::decode(&[0xb1, 123, 0]),
      Message::AllNotesOff { channel: 1 }
    );
    assert_eq!(
      Decoder::decode(&[0xb1, 126, 4]),
      Message::MonoModeOn {
        channel: 1,
        num_channels: 4
      }
    );
    assert_eq!(
      Decoder::decode(&[0xb1, 123, 5]),
      Message::Unknown(vec![0xb1, 123, 5])
    );
  }

  #[test]
  fn decode_system() {
    assert_eq!(
      Decoder::decode(&[0b1111_0001, 0b0_101_1010]),
      Message::MTCQuarterFrame {
        msg_type: 0b101,
        value: 0b1010
      }
    );
    assert_eq!(
      Decoder::decode(&[0b1111_0010, 0b0_0101010, 0b0_1010101]),
      Message::SongPositionPointer {
        beats: 0b10101010101010
      }
    );
    assert_eq!(Decoder::decode(&[0xfc]), Message::Stop);
    assert_eq!(
      Decoder::decode(&[SYSEX_START, 1, 2, 3, SYSEX_END]),
      Message::SysEx {
        data: vec![1, 2, 3]
      }
    );
  }

  #[test]
  fn decode_malformed_as_unknown() {
    assert_eq!(Decoder::decode(&[0x90, 60]), Message::Unknown(vec![0x90, 60]));
    assert_eq!(
      Decoder::decode(&[0xf8, 0xf8]),
      Message::Unknown(vec![0xf8, 0xf8])
    );
    assert_eq!(Decoder::decode(&[0xf4]), Message::Unknown(vec![0xf4]));
  }
}
