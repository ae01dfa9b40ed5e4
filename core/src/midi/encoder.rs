use super::messages::Message;
use super::types::{U14, U3, U4, U7};

pub const SYSEX_START: u8 = 0b1111_0000;
pub const SYSEX_END: u8 = 0b1111_0111;

#[inline]
fn u3(d: U3) -> u8 {
  d & 0x07
}

#[inline]
fn u4(d: U4) -> u8 {
  d & 0x0f
}

#[inline]
fn u7(d: U7) -> u8 {
  d & 0x7f
}

#[inline]
fn u14_lsb(d: U14) -> u8 {
  (d & 0x7f) as u8
}

#[inline]
fn u14_msb(d: U14) -> u8 {
  ((d >> 7) & 0x7f) as u8
}

#[inline]
fn status_and_channel(status: U4, channel: U4) -> u8 {
  (status << 4) | u4(channel)
}

#[inline]
fn channel_mode(channel: U4, controller: U7, value: U7) -> [u8; 3] {
  [status_and_channel(0b1011, channel), controller, u7(value)]
}

#[inline]
fn put(out: &mut [u8], bytes: &[u8]) -> usize {
  out[..bytes.len()].copy_from_slice(bytes);
  bytes.len()
}

/// Serialises messages into their MIDI 1.0 wire representation.
pub struct Encoder;

impl Encoder {
  /// Number of bytes that [`Encoder::encode`] will write for `msg`.
  pub fn data_size(msg: &Message) -> usize {
    match msg {
      Message::ProgramChange { .. }
      | Message::ChannelPressure { .. }
      | Message::MTCQuarterFrame { .. }
      | Message::SongSelect { .. } => 2,

      Message::TuneRequest
      | Message::TimingClock
      | Message::Start
      | Message::Continue
      | Message::Stop
      | Message::ActiveSensing
      | Message::SystemReset => 1,

      Message::SysEx { data } => Self::sysex_data_size(data),
      Message::Unknown(data) => data.len(),

      _ => 3,
    }
  }

  /// Writes `msg` at the beginning of `out` and returns the number of bytes written.
  ///
  /// `out` must be at least [`Encoder::data_size`] bytes long.
  pub fn encode(msg: &Message, out: &mut [u8]) -> usize {
    match msg {
      Message::NoteOff {
        channel,
        key,
        velocity,
      } => put(out, &[status_and_channel(0b1000, *channel), u7(*key), u7(*velocity)]),
      Message::NoteOn {
        channel,
        key,
        velocity,
      } => put(out, &[status_and_channel(0b1001, *channel), u7(*key), u7(*velocity)]),
      Message::PolyphonicKeyPressure {
        channel,
        key,
        value,
      } => put(out, &[status_and_channel(0b1010, *channel), u7(*key), u7(*value)]),
      Message::ControlChange {
        channel,
        controller,
        value,
      } => put(out, &[status_and_channel(0b1011, *channel), u7(*controller), u7(*value)]),
      Message::ProgramChange { channel, value } => {
        put(out, &[status_and_channel(0b1100, *channel), u7(*value)])
      }
      Message::ChannelPressure { channel, value } => {
        put(out, &[status_and_channel(0b1101, *channel), u7(*value)])
      }
      Message::PitchBend { channel, value } => put(out, &[
        status_and_channel(0b1110, *channel),
        u14_lsb(*value),
        u14_msb(*value),
      ]),

      Message::AllSoundOff { channel } => put(out, &channel_mode(*channel, 120, 0)),
      Message::ResetAllControllers { channel } => put(out, &channel_mode(*channel, 121, 0)),
      Message::LocalControlOff { channel } => put(out, &channel_mode(*channel, 122, 0)),
      Message::LocalControlOn { channel } => put(out, &channel_mode(*channel, 122, 127)),
      Message::AllNotesOff { channel } => put(out, &channel_mode(*channel, 123, 0)),
      Message::OmniModeOff { channel } => put(out, &channel_mode(*channel, 124, 0)),
      Message::OmniModeOn { channel } => put(out, &channel_mode(*channel, 125, 0)),
      Message::MonoModeOn {
        channel,
        num_channels,
      } => put(out, &channel_mode(*channel, 126, *num_channels)),
      Message::PolyModeOn { channel } => put(out, &channel_mode(*channel, 127, 0)),

      Message::MTCQuarterFrame { msg_type, value } => {
        put(out, &[0b1111_0001, (u3(*msg_type) << 4) | u4(*value)])
      }
      Message::SongPositionPointer { beats } => {
        put(out, &[0b1111_0010, u14_lsb(*beats), u14_msb(*beats)])
      }
      Message::SongSelect { song } => put(out, &[0b1111_0011, u7(*song)]),
      Message::TuneRequest => put(out, &[0b1111_0110]),
      Message::TimingClock => put(out, &[0b1111_1000]),
      Message::Start => put(out, &[0b1111_1010]),
      Message::Continue => put(out, &[0b1111_1011]),
      Message::Stop => put(out, &[0b1111_1100]),
      Message::ActiveSensing => put(out, &[0b1111_1110]),
      Message::SystemReset => put(out, &[0b1111_1111]),

      Message::SysEx { data } => Self::sysex_encode(data, out),
      Message::Unknown(data) => put(out, data),
    }
  }

  pub fn sysex_data_size(data: &[U7]) -> usize {
    data.len() + 2
  }

  pub fn sysex_encode(data: &[U7], out: &mut [u8]) -> usize {
    let end = data.len() + 1;
    out[0] = SYSEX_START;
    for (dst, src) in out[1..end].iter_mut().zip(data) {
      *dst = u7(*src);
    }
    out[end] = SYSEX_END;
    end + 1
  }
}
